//! Development mock layer.
//!
//! A [`MockLayer`] is a [`Transport`] that answers requests matching a
//! registered method and path pattern with synthesized responses instead of
//! touching the network. Rules are consulted in registration order and the
//! first match wins; anything unmatched falls through to the fallback
//! transport.

pub mod fixtures;

use crate::config::MockConfig;
use crate::request::Method;
use crate::transport::{RawResponse, Transport, TransportBody, TransportError, TransportRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// What a handler gets to look at
#[derive(Clone, Debug)]
pub struct MockRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    /// JSON body, if one was sent
    pub body: Option<Value>,
    /// Text fields of a multipart upload
    pub form_fields: HashMap<String, String>,
    pub authorization: Option<String>,
}

impl MockRequest {
    fn from_transport(request: &TransportRequest) -> Self {
        let (body, form_fields) = match request.body {
            TransportBody::None => (None, HashMap::new()),
            TransportBody::Json(ref value) => (Some(value.clone()), HashMap::new()),
            TransportBody::Multipart(ref form) => (None, form.fields.iter().cloned().collect()),
        };
        Self {
            method: request.method,
            path: request.path.clone(),
            query: request.query.iter().cloned().collect(),
            body,
            form_fields,
            authorization: request.header("Authorization").map(str::to_string),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Parse a numeric query parameter, falling back on absence or garbage
    pub fn query_u32(&self, name: &str, default: u32) -> u32 {
        self.query_param(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn body_str(&self, field: &str) -> Option<&str> {
        self.body.as_ref()?.get(field)?.as_str()
    }

    /// Last path segment, e.g. the id in `/products/{id}`
    pub fn last_segment(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

/// Synthesized response; failures use ordinary status codes so they go
/// through the same outcome mapping as real ones
#[derive(Clone, Debug, PartialEq)]
pub struct MockReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub fn created(body: Value) -> Self {
        Self::status(201, body)
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn into_raw(self) -> Result<RawResponse> {
        let body = match self.body {
            Some(value) => serde_json::to_vec(&value)?,
            None => Vec::new(),
        };
        Ok(RawResponse {
            status: self.status,
            body,
        })
    }
}

pub type MockHandler = Arc<dyn Fn(&MockRequest) -> MockReply + Send + Sync>;

pub struct MockRule {
    pub method: Method,
    pub pattern: Regex,
    pub handler: MockHandler,
}

impl MockRule {
    fn matches(&self, method: Method, path: &str) -> bool {
        self.method == method && self.pattern.is_match(path)
    }
}

/// Ordered rule list
#[derive(Default)]
pub struct MockRegistry {
    rules: Vec<MockRule>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; `pattern` is a regex matched against the request path
    /// (query string excluded)
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(&MockRequest) -> MockReply + Send + Sync + 'static,
    {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid mock pattern '{}': {}", pattern, e)))?;
        self.rules.push(MockRule {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// First rule matching method and path
    pub fn find(&self, method: Method, path: &str) -> Option<&MockRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Transport that answers from the registry
pub struct MockLayer {
    registry: MockRegistry,
    fallback: Option<Arc<dyn Transport>>,
    delay_ms: (u64, u64),
}

impl MockLayer {
    pub fn new(registry: MockRegistry, config: &MockConfig) -> Self {
        Self {
            registry,
            fallback: None,
            delay_ms: (config.delay_min_ms, config.delay_max_ms.max(config.delay_min_ms)),
        }
    }

    /// Registry pre-filled with the default fixture handlers
    pub fn with_defaults(config: &MockConfig) -> Result<Self> {
        let mut registry = MockRegistry::new();
        fixtures::register_defaults(&mut registry, config.seed)?;
        tracing::info!("Mock layer active with {} rules", registry.len());
        Ok(Self::new(registry, config))
    }

    /// Transport used for requests no rule matches
    pub fn with_fallback(mut self, fallback: Arc<dyn Transport>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }

    fn delay(&self) -> Duration {
        let (min, max) = self.delay_ms;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[async_trait]
impl Transport for MockLayer {
    async fn execute(&self, request: TransportRequest) -> std::result::Result<RawResponse, TransportError> {
        let reply = match self.registry.find(request.method, &request.path) {
            Some(rule) => {
                tracing::debug!("mock: {} {} intercepted", request.method, request.path);
                (rule.handler)(&MockRequest::from_transport(&request))
            }
            None => {
                return match self.fallback {
                    Some(ref fallback) => {
                        tracing::debug!("mock: {} {} passed through", request.method, request.path);
                        fallback.execute(request).await
                    }
                    None => Err(TransportError::new(format!(
                        "no mock rule for {} {}",
                        request.method, request.path
                    ))),
                };
            }
        };

        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        reply
            .into_raw()
            .map_err(|e| TransportError::new(format!("mock reply could not be encoded: {}", e)))
    }
}
