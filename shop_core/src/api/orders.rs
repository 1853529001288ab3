use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{
    CreateOrderRequest, OrderDetail, OrderPage, OrderQuery, OrderSummary, RefundRequest, Result,
};

pub struct OrdersApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> OrdersApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &OrderQuery) -> Result<OrderPage> {
        let descriptor = RequestDescriptor::get("/orders")
            .authenticated()
            .query(query)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn get(&self, order_id: &str) -> Result<OrderDetail> {
        let path = format!("/orders/{}", segment(order_id)?);
        self.gateway
            .fetch(RequestDescriptor::get(path).authenticated())
            .await
    }

    pub async fn create(&self, request: &CreateOrderRequest) -> Result<OrderSummary> {
        let descriptor = RequestDescriptor::post("/orders")
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn cancel(&self, order_id: &str) -> Result<()> {
        let path = format!("/orders/{}/cancel", segment(order_id)?);
        self.gateway
            .execute(RequestDescriptor::put(path).authenticated())
            .await
    }

    pub async fn refund(&self, order_id: &str, request: &RefundRequest) -> Result<()> {
        let path = format!("/orders/{}/refund", segment(order_id)?);
        let descriptor = RequestDescriptor::post(path)
            .authenticated()
            .json(request)?;
        self.gateway.execute(descriptor).await
    }

    pub async fn remind_ship(&self, order_id: &str) -> Result<()> {
        let path = format!("/orders/{}/remind-ship", segment(order_id)?);
        self.gateway
            .execute(RequestDescriptor::post(path).authenticated())
            .await
    }
}
