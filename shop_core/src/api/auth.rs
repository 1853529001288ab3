use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{LoginRequest, LoginResponse, Result};
use tokio::sync::Mutex;

pub struct AuthApi<'a> {
    gateway: &'a Gateway,
    login_lock: &'a Mutex<()>,
}

impl<'a> AuthApi<'a> {
    pub fn new(gateway: &'a Gateway, login_lock: &'a Mutex<()>) -> Self {
        Self {
            gateway,
            login_lock,
        }
    }

    /// Exchange a login code for a session and persist it
    ///
    /// Logins are serialised; when two race, the later one's session is the
    /// one left on disk. Nothing is stored unless the backend accepts the code.
    pub async fn login(&self, code: &str) -> Result<LoginResponse> {
        let _guard = self.login_lock.lock().await;

        let request = RequestDescriptor::post("/auth/login").json(&LoginRequest {
            code: code.to_string(),
        })?;
        let response: LoginResponse = self.gateway.fetch(request).await?;

        self.gateway
            .session()
            .save_session(&response.token, &response.user)?;
        tracing::info!("Logged in as {}", response.user.user_id);
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.gateway.session().clear_session()?;
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{gateway, respond};
    use crate::transport::{MockTransport, TransportBody};
    use crate::{ApiError, Error};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_persists_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.path == "/auth/login"
                    && req.header("Authorization").is_none()
                    && req.body == TransportBody::Json(json!({"code": "abc123"}))
            })
            .times(1)
            .returning(|_| {
                respond(
                    200,
                    r#"{"token":"t1","user":{"userId":"u1","nickname":"Mei","avatarUrl":"a.png"}}"#,
                )
            });

        let gateway = gateway(&temp_dir, transport, None);
        let lock = Mutex::new(());
        let response = AuthApi::new(&gateway, &lock).login("abc123").await.unwrap();

        assert_eq!(response.token, "t1");
        assert_eq!(gateway.session().get_token(), Some("t1".to_string()));
        assert_eq!(gateway.session().profile().unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_rejected_login_stores_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| respond(400, r#"{"message":"invalid code"}"#));

        let gateway = gateway(&temp_dir, transport, None);
        let lock = Mutex::new(());
        let err = AuthApi::new(&gateway, &lock).login("bad").await.unwrap_err();

        assert_eq!(err.api(), Some(&ApiError::bad_request("invalid code")));
        assert!(!gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_response_missing_token_is_decode_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| respond(200, r#"{"user":null}"#));

        let gateway = gateway(&temp_dir, transport, None);
        let lock = Mutex::new(());
        let result = AuthApi::new(&gateway, &lock).login("abc123").await;

        assert!(matches!(result, Err(Error::Decode(_))));
        assert!(!gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let gateway = gateway(&temp_dir, transport, Some("t1"));
        let lock = Mutex::new(());
        AuthApi::new(&gateway, &lock).logout().unwrap();

        assert_eq!(gateway.session().get_token(), None);
    }
}
