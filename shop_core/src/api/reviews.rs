use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{CreateReviewRequest, Result, Review, ReviewPage, ReviewQuery, UpdateReviewRequest};

pub struct ReviewsApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> ReviewsApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, product_id: &str, query: &ReviewQuery) -> Result<ReviewPage> {
        let path = format!("/products/{}/reviews", segment(product_id)?);
        let descriptor = RequestDescriptor::get(path).query(query)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn get(&self, product_id: &str, review_id: &str) -> Result<Review> {
        self.gateway
            .fetch(RequestDescriptor::get(review_path(product_id, review_id)?))
            .await
    }

    pub async fn create(&self, product_id: &str, request: &CreateReviewRequest) -> Result<Review> {
        let path = format!("/products/{}/reviews", segment(product_id)?);
        let descriptor = RequestDescriptor::post(path)
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    /// Partial update; only the author may edit
    pub async fn update(
        &self,
        product_id: &str,
        review_id: &str,
        request: &UpdateReviewRequest,
    ) -> Result<Review> {
        let descriptor = RequestDescriptor::patch(review_path(product_id, review_id)?)
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn delete(&self, product_id: &str, review_id: &str) -> Result<()> {
        let path = review_path(product_id, review_id)?;
        self.gateway
            .execute(RequestDescriptor::delete(path).authenticated())
            .await
    }
}

fn review_path(product_id: &str, review_id: &str) -> Result<String> {
    Ok(format!(
        "/products/{}/reviews/{}",
        segment(product_id)?,
        segment(review_id)?
    ))
}
