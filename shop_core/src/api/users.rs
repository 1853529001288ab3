use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{AddFavoriteRequest, Result, UpdateProfileRequest, UserProfile};

pub struct UsersApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> UsersApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Fetch the current profile and refresh the cached copy
    pub async fn me(&self) -> Result<UserProfile> {
        let profile: UserProfile = self
            .gateway
            .fetch(RequestDescriptor::get("/users/me").authenticated())
            .await?;
        self.cache(&profile)?;
        Ok(profile)
    }

    /// Update nickname and/or avatar
    ///
    /// The cached profile is refreshed with what the backend returns.
    pub async fn update_me(&self, request: &UpdateProfileRequest) -> Result<UserProfile> {
        let descriptor = RequestDescriptor::post("/users/me")
            .authenticated()
            .json(request)?;
        let profile: UserProfile = self.gateway.fetch(descriptor).await?;
        self.cache(&profile)?;
        Ok(profile)
    }

    fn cache(&self, profile: &UserProfile) -> Result<()> {
        match self.gateway.session().get_token() {
            Some(token) => self.gateway.session().save_session(&token, profile),
            None => Ok(()),
        }
    }

    pub async fn add_favorite(&self, product_id: &str) -> Result<()> {
        let descriptor = RequestDescriptor::post("/users/me/favorites")
            .authenticated()
            .json(&AddFavoriteRequest {
                product_id: product_id.to_string(),
            })?;
        self.gateway.execute(descriptor).await
    }

    pub async fn remove_favorite(&self, product_id: &str) -> Result<()> {
        let path = format!("/users/me/favorites/{}", segment(product_id)?);
        self.gateway
            .execute(RequestDescriptor::delete(path).authenticated())
            .await
    }
}
