use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{Address, AddressRequest, Result};

pub struct AddressesApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> AddressesApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Address>> {
        self.gateway
            .fetch(RequestDescriptor::get("/users/me/addresses").authenticated())
            .await
    }

    pub async fn create(&self, request: &AddressRequest) -> Result<Address> {
        let descriptor = RequestDescriptor::post("/users/me/addresses")
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn update(&self, address_id: &str, request: &AddressRequest) -> Result<Address> {
        let path = format!("/users/me/addresses/{}", segment(address_id)?);
        let descriptor = RequestDescriptor::put(path)
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn delete(&self, address_id: &str) -> Result<()> {
        let path = format!("/users/me/addresses/{}", segment(address_id)?);
        self.gateway
            .execute(RequestDescriptor::delete(path).authenticated())
            .await
    }
}
