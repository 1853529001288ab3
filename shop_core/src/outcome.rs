//! Mapping of HTTP status codes to gateway outcomes.
//!
//! This is the one place status codes are interpreted; every domain call
//! goes through [`map_status`].

use crate::{ApiError, ValidationKind};
use serde_json::Value;

/// Successful response body
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// 204, or a success with nothing in it
    Empty,
    Json(Value),
}

impl Body {
    pub fn into_value(self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Json(value) => value,
        }
    }
}

/// Result of a single gateway call
pub type Outcome = std::result::Result<Body, ApiError>;

/// Fields checked, in order, for a human-readable error message
const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "errorMessage"];

/// Interpret a received response
pub fn map_status(status: u16, body: &[u8]) -> Outcome {
    match status {
        204 => Ok(Body::Empty),
        200..=299 => Ok(parse_body(body)),
        401 => Err(ApiError::AuthFailure),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::Validation {
            kind: ValidationKind::BadRequest,
            message: extract_message(body).unwrap_or_else(|| "bad request".into()),
        }),
        403 => Err(ApiError::Validation {
            kind: ValidationKind::Forbidden,
            message: extract_message(body)
                .unwrap_or_else(|| "permission denied: not the resource owner".into()),
        }),
        _ => Err(ApiError::Server {
            status,
            message: extract_message(body).unwrap_or_else(|| format!("HTTP {}", status)),
        }),
    }
}

fn parse_body(body: &[u8]) -> Body {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Body::Empty;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Body::Json(value),
        Err(_) => Body::Json(Value::String(
            String::from_utf8_lossy(body).trim().to_string(),
        )),
    }
}

/// Best-effort error text from a response body
///
/// For a JSON object the first non-empty string among `message`, `error`
/// and `errorMessage` wins; otherwise the whole object is stringified.
/// Returns `None` for an empty body.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => return Some(text.to_string()),
    };

    match value {
        Value::Object(ref map) => {
            let named = MESSAGE_FIELDS
                .iter()
                .filter_map(|field| map.get(*field))
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty());
            Some(named.map(str::to_string).unwrap_or_else(|| value.to_string()))
        }
        Value::String(s) if !s.is_empty() => Some(s),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}
