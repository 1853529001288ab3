//! Typed wrappers over the backend endpoints.
//!
//! Each wrapper borrows the [`Gateway`](crate::gateway::Gateway) and maps one
//! endpoint to one method. Wrappers add no error taxonomy of their own: the
//! gateway outcome comes back as [`Error::Api`](crate::Error::Api).

pub mod addresses;
pub mod auth;
pub mod files;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

pub use addresses::AddressesApi;
pub use auth::AuthApi;
pub use files::FilesApi;
pub use notifications::NotificationsApi;
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use reviews::ReviewsApi;
pub use users::UsersApi;

use crate::{ApiError, Result};
use std::borrow::Cow;

/// Percent-encode an id for use as one path segment
///
/// Empty ids and dot segments would change which resource is addressed, so
/// they are rejected before any request is built.
pub(crate) fn segment(id: &str) -> Result<Cow<'_, str>> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ApiError::bad_request(format!("invalid id: '{}'", id)).into());
    }
    Ok(urlencoding::encode(id))
}


#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::ApiSettings;
    use crate::gateway::Gateway;
    use crate::session::SessionStore;
    use crate::transport::{RawResponse, Transport, TransportError};
    use crate::UserProfile;
    use std::sync::Arc;
    use std::time::Duration;

    pub fn profile() -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            nickname: "Mei".into(),
            avatar_url: "https://img/u1.png".into(),
            join_date: None,
        }
    }

    pub fn gateway(
        dir: &tempfile::TempDir,
        transport: impl Transport + 'static,
        token: Option<&str>,
    ) -> Gateway {
        let store = SessionStore::new(dir.path().join("session.json"), 5);
        if let Some(token) = token {
            store.save_session(token, &profile()).unwrap();
        }
        let settings = ApiSettings {
            base_url: "http://shop.test".into(),
            timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(30),
        };
        Gateway::new(Arc::new(transport), store, settings)
    }

    pub fn respond(status: u16, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        })
    }
}
