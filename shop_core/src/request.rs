//! Request descriptors handed to the gateway.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// HTTP methods used by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Repeating the call has the same effect as making it once
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Method::Post | Method::Patch)
    }

    /// Safe for a caller to retry without an idempotency key
    pub fn is_safe(self) -> bool {
        self == Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Multipart file submission
#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm {
    pub file_path: PathBuf,
    pub field_name: String,
    /// Extra text fields sent alongside the file
    pub fields: Vec<(String, String)>,
}

/// Request body
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    Json(Value),
    Upload(UploadForm),
}

/// One outgoing call, built per request and consumed by the gateway
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
    pub requires_auth: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::None,
            requires_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Fail fast without a token
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Serialize `params` into query pairs; `None` fields are skipped
    pub fn query<T: Serialize>(mut self, params: &T) -> Result<Self> {
        self.query.extend(query_pairs(params)?);
        Ok(self)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.payload = Payload::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn upload(mut self, form: UploadForm) -> Self {
        self.payload = Payload::Upload(form);
        self
    }
}

/// Flatten a serializable struct into `key=value` pairs
fn query_pairs<T: Serialize>(params: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params)?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::Other(format!(
                "query parameters must serialize to an object, got {}",
                other
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => continue,
            Value::String(s) => pairs.push((key, s)),
            Value::Bool(_) | Value::Number(_) => pairs.push((key, value.to_string())),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => pairs.push((key.clone(), s)),
                        other => pairs.push((key.clone(), other.to_string())),
                    }
                }
            }
            Value::Object(_) => {
                return Err(Error::Other(format!(
                    "nested query parameter '{}' is not supported",
                    key
                )))
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NotificationKind, NotificationQuery, ProductQuery};

    #[test]
    fn test_query_skips_absent_fields() {
        let request = RequestDescriptor::get("/products")
            .query(&ProductQuery {
                query: Some("lamp".into()),
                category_id: None,
                page: Some(1),
                size: Some(10),
            })
            .unwrap();

        assert!(request.query.contains(&("query".into(), "lamp".into())));
        assert!(request.query.contains(&("page".into(), "1".into())));
        assert!(request.query.contains(&("size".into(), "10".into())));
        assert!(!request.query.iter().any(|(k, _)| k == "categoryId"));
    }

    #[test]
    fn test_query_uses_wire_names() {
        let request = RequestDescriptor::get("/notifications")
            .query(&NotificationQuery {
                kind: Some(NotificationKind::System),
                page: None,
                size: None,
            })
            .unwrap();
        assert_eq!(request.query, vec![("type".to_string(), "system".to_string())]);
    }

    #[test]
    fn test_scalar_query_rejected() {
        assert!(RequestDescriptor::get("/x").query(&42).is_err());
    }

    #[test]
    fn test_builders_default_to_public() {
        let request = RequestDescriptor::delete("/orders/1");
        assert_eq!(request.method, Method::Delete);
        assert!(!request.requires_auth);
        assert!(request.authenticated().requires_auth);
    }

    #[test]
    fn test_method_retry_semantics() {
        assert!(Method::Get.is_safe());
        assert!(!Method::Delete.is_safe());
        assert!(Method::Put.is_idempotent());
        assert!(!Method::Post.is_idempotent());
    }
}
