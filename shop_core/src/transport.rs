//! Transport abstraction under the gateway.
//!
//! The gateway decides what to send; a [`Transport`] only moves bytes. The
//! reqwest-backed [`HttpTransport`] talks to the real backend, the mock layer
//! answers locally. Which one is used is decided once, at start-up.

use crate::request::{Method, UploadForm};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Body as the transport sees it
#[derive(Clone, Debug, PartialEq)]
pub enum TransportBody {
    None,
    Json(Value),
    Multipart(UploadForm),
}

/// Fully resolved outgoing request
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    /// Base URL joined with `path`
    pub url: String,
    /// Path relative to the base URL, used for mock matching
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: TransportBody,
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A response that made it back, whatever its status
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// No response was received
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            TransportBody::None => builder,
            TransportBody::Json(ref value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::new(format!("failed to encode body: {}", e)))?;
                builder.body(bytes)
            }
            TransportBody::Multipart(ref form) => builder.multipart(build_form(form).await?),
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

async fn build_form(upload: &UploadForm) -> Result<Form, TransportError> {
    let bytes = tokio::fs::read(&upload.file_path).await.map_err(|e| {
        TransportError::new(format!(
            "failed to read {}: {}",
            upload.file_path.display(),
            e
        ))
    })?;
    let file_name = upload
        .file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());

    let mut form = Form::new().part(
        upload.field_name.clone(),
        Part::bytes(bytes).file_name(file_name),
    );
    for (name, value) in &upload.fields {
        form = form.text(name.clone(), value.clone());
    }
    Ok(form)
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else {
        TransportError::new(error.to_string())
    }
}
