//! Composition root: wires config, session, transport and gateway together.

use crate::api::{
    AddressesApi, AuthApi, FilesApi, NotificationsApi, OrdersApi, ProductsApi, ReviewsApi,
    UsersApi,
};
use crate::config::Config;
use crate::gateway::Gateway;
use crate::mock::MockLayer;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::transport::{HttpTransport, Transport};
use crate::{ApiError, Result, UserProfile};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ShopClient {
    gateway: Gateway,
    login_lock: Mutex<()>,
    profile_max_age: chrono::Duration,
}

impl ShopClient {
    /// Build a client for the configured environment
    ///
    /// In development with mocking enabled, requests are answered by the mock
    /// layer and anything it has no rule for goes to the real backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let session = SessionStore::new(config.session_path(), config.session.upload_history_limit);
        let http: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);

        let transport: Arc<dyn Transport> = if config.mock_active() {
            Arc::new(MockLayer::with_defaults(&config.mock)?.with_fallback(http))
        } else {
            http
        };

        tracing::debug!(
            "Client for {:?} at {} (mock: {})",
            config.environment,
            config.api_settings().base_url,
            config.mock_active()
        );
        Ok(Self::with_transport(config, transport, session))
    }

    /// Build a client over an arbitrary transport
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
        session: SessionStore,
    ) -> Self {
        Self {
            gateway: Gateway::new(transport, session, config.api_settings()),
            login_lock: Mutex::new(()),
            profile_max_age: config.profile_max_age(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.gateway = self.gateway.with_notifier(notifier);
        self
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    /// Profile of the signed-in user, refetched when the cached copy is stale
    ///
    /// Returns `None` when logged out. If the refetch cannot reach the
    /// backend the cached profile is returned as is.
    pub async fn current_profile(&self) -> Result<Option<UserProfile>> {
        let session = self.session();
        if !session.is_authenticated() {
            return Ok(None);
        }
        if !session.profile_is_stale(self.profile_max_age) {
            return Ok(session.profile());
        }

        tracing::debug!("Cached profile is stale, refetching");
        match self.users().me().await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if matches!(e.api(), Some(ApiError::Network(_))) => {
                tracing::warn!("Profile refresh failed, using cached copy: {}", e);
                Ok(session.profile())
            }
            Err(e) => Err(e),
        }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.gateway, &self.login_lock)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.gateway)
    }

    pub fn addresses(&self) -> AddressesApi<'_> {
        AddressesApi::new(&self.gateway)
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(&self.gateway)
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi::new(&self.gateway)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(&self.gateway)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(&self.gateway)
    }

    pub fn files(&self) -> FilesApi<'_> {
        FilesApi::new(&self.gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataConfig, MockConfig};
    use crate::session::Session;
    use crate::transport::{MockTransport, RawResponse, TransportError};
    use crate::{CreateOrderRequest, ProductQuery};
    use chrono::Utc;

    fn dev_config(dir: &tempfile::TempDir) -> Config {
        Config {
            mock: MockConfig {
                enabled: true,
                delay_min_ms: 0,
                delay_max_ms: 0,
                seed: Some(3),
            },
            data: DataConfig {
                data_dir: dir.path().to_path_buf(),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_login_then_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = ShopClient::from_config(&dev_config(&temp_dir)).unwrap();

        let request = CreateOrderRequest {
            product_id: "p1".into(),
            quantity: 1,
            address_id: None,
            phone_number: None,
        };
        let err = client.orders().create(&request).await.unwrap_err();
        assert_eq!(err.api(), Some(&ApiError::AuthFailure));

        let login = client.auth().login("abc123").await.unwrap();
        assert_eq!(client.session().get_token(), Some(login.token.clone()));
        assert!(temp_dir.path().join("session.json").exists());

        let order = client.orders().create(&request).await.unwrap();
        assert_eq!(order.quantity, 1);
    }

    #[tokio::test]
    async fn test_mock_products_are_paged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = ShopClient::from_config(&dev_config(&temp_dir)).unwrap();

        let query = ProductQuery {
            page: Some(1),
            size: Some(10),
            ..Default::default()
        };
        let page = client.products().list(&query).await.unwrap();
        assert!(page.items.len() <= 10);
        assert!(page.total_pages >= 1);

        let categories = client.products().categories().await.unwrap();
        assert!(categories.len() >= 8);
    }

    #[tokio::test]
    async fn test_concurrent_logins_leave_one_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = ShopClient::from_config(&dev_config(&temp_dir)).unwrap();

        let auth_a = client.auth();
        let auth_b = client.auth();
        let (a, b) = tokio::join!(auth_a.login("first"), auth_b.login("second"));
        let tokens = [a.unwrap().token, b.unwrap().token];

        let stored = client.session().get_token().unwrap();
        assert!(tokens.contains(&stored));
    }

    #[test]
    fn test_session_lives_under_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = ShopClient::from_config(&dev_config(&temp_dir)).unwrap();
        assert_eq!(client.session().path(), temp_dir.path().join("session.json"));
    }

    fn cached_profile() -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            nickname: "Old name".into(),
            avatar_url: String::new(),
            join_date: None,
        }
    }

    fn session_saved_days_ago(dir: &tempfile::TempDir, days: i64) -> SessionStore {
        let store = SessionStore::new(dir.path().join("session.json"), 20);
        let session = Session {
            token: Some("t1".into()),
            user_id: Some("u1".into()),
            profile: Some(cached_profile()),
            saved_at: Some(Utc::now() - chrono::Duration::days(days)),
            recent_uploads: Vec::new(),
        };
        std::fs::write(store.path(), serde_json::to_string(&session).unwrap()).unwrap();
        store
    }

    fn profile_response() -> std::result::Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status: 200,
            body: br#"{"userId":"u1","nickname":"New name","avatarUrl":""}"#.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_stale_profile_is_refetched_and_cached() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = session_saved_days_ago(&temp_dir, 8);
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.path == "/users/me")
            .times(1)
            .returning(|_| profile_response());

        let client = ShopClient::with_transport(&Config::default(), Arc::new(transport), store);
        let profile = client.current_profile().await.unwrap().unwrap();

        assert_eq!(profile.nickname, "New name");
        assert_eq!(client.session().profile().unwrap().nickname, "New name");
        assert!(!client.session().profile_is_stale(chrono::Duration::days(7)));
    }

    #[tokio::test]
    async fn test_fresh_profile_served_from_cache() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = session_saved_days_ago(&temp_dir, 1);
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = ShopClient::with_transport(&Config::default(), Arc::new(transport), store);
        let profile = client.current_profile().await.unwrap().unwrap();
        assert_eq!(profile.nickname, "Old name");
    }

    #[tokio::test]
    async fn test_unreachable_backend_falls_back_to_stale_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = session_saved_days_ago(&temp_dir, 8);
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Err(TransportError::new("connection refused")));

        let client = ShopClient::with_transport(&Config::default(), Arc::new(transport), store);
        let profile = client.current_profile().await.unwrap().unwrap();
        assert_eq!(profile.nickname, "Old name");
    }

    #[tokio::test]
    async fn test_logged_out_has_no_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport.expect_execute().never();
        let store = SessionStore::new(temp_dir.path().join("session.json"), 20);

        let client = ShopClient::with_transport(&Config::default(), Arc::new(transport), store);
        assert!(client.current_profile().await.unwrap().is_none());
    }
}
