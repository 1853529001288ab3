use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{
    ApiError, Category, CreateProductRequest, ProductDetail, ProductPage, ProductQuery, Result,
};
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Storage paths embed the upload date as `/YYYY/MM/DD/`
static DATED_PATH: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/").ok());

pub struct ProductsApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> ProductsApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
        self.gateway
            .fetch(RequestDescriptor::get("/products").query(query)?)
            .await
    }

    /// Publish a product
    ///
    /// Blank image URLs are dropped. If none remain the request is rejected
    /// locally without reaching the backend.
    pub async fn create(&self, request: &CreateProductRequest) -> Result<ProductDetail> {
        let mut request = request.clone();
        request.image_urls = clean_image_urls(&request.image_urls)?;

        for url in &request.image_urls {
            warn_if_future_dated(url);
        }

        let descriptor = RequestDescriptor::post("/products")
            .authenticated()
            .json(&request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn get(&self, product_id: &str) -> Result<ProductDetail> {
        let path = format!("/products/{}", segment(product_id)?);
        self.gateway.fetch(RequestDescriptor::get(path)).await
    }

    pub async fn update(
        &self,
        product_id: &str,
        request: &CreateProductRequest,
    ) -> Result<ProductDetail> {
        let path = format!("/products/{}", segment(product_id)?);
        let descriptor = RequestDescriptor::put(path)
            .authenticated()
            .json(request)?;
        self.gateway.fetch(descriptor).await
    }

    pub async fn delete(&self, product_id: &str) -> Result<()> {
        let path = format!("/products/{}", segment(product_id)?);
        self.gateway
            .execute(RequestDescriptor::delete(path).authenticated())
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.gateway
            .fetch(RequestDescriptor::get("/categories"))
            .await
    }
}

fn clean_image_urls(urls: &[String]) -> Result<Vec<String>> {
    let cleaned: Vec<String> = urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        return Err(ApiError::bad_request("at least one product image is required").into());
    }
    Ok(cleaned)
}

/// A date in the future usually means the uploading device's clock is off
fn warn_if_future_dated(url: &str) {
    let Some(captures) = DATED_PATH.as_ref().and_then(|re| re.captures(url)) else {
        return;
    };
    let year: i32 = match captures[1].parse() {
        Ok(year) => year,
        Err(_) => return,
    };
    if year > Utc::now().year() {
        tracing::warn!("Image URL is dated in the future ({}): {}", year, url);
    }
}
