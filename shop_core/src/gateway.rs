//! Request gateway: URL construction, header injection and outcome mapping.
//!
//! Every backend call goes through [`Gateway::send`], which produces exactly
//! one [`Outcome`]. The gateway never retries.

use crate::config::ApiSettings;
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::outcome::{map_status, Body, Outcome};
use crate::request::{Payload, RequestDescriptor};
use crate::session::SessionStore;
use crate::transport::{Transport, TransportBody, TransportRequest};
use crate::{ApiError, Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    settings: ApiSettings,
    notifier: Arc<dyn Notifier>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore, settings: ApiSettings) -> Self {
        Self {
            transport,
            session,
            settings,
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Perform one call
    pub async fn send(&self, request: RequestDescriptor) -> Outcome {
        let token = self.session.get_token();

        if request.requires_auth && token.is_none() {
            tracing::debug!(
                "{} {} needs a session but none is stored",
                request.method,
                request.path
            );
            self.notifier.notify(Notice::LoginRequired);
            return Err(ApiError::AuthFailure);
        }

        let transport_request = self.build(request, token.as_deref())?;
        let method = transport_request.method;
        let path = transport_request.path.clone();
        let timeout = transport_request.timeout;

        // Applied here so every transport, the mock layer included, is bounded
        let raw = match tokio::time::timeout(timeout, self.transport.execute(transport_request)).await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) if e.timed_out => {
                tracing::warn!("{} {} timed out: {}", method, path, e);
                return Err(timed_out(timeout));
            }
            Ok(Err(e)) => {
                tracing::warn!("{} {} failed without a response: {}", method, path, e);
                return Err(ApiError::Network(e.message));
            }
            Err(_) => {
                tracing::warn!("{} {} timed out after {:?}", method, path, timeout);
                return Err(timed_out(timeout));
            }
        };

        tracing::debug!("{} {} -> {}", method, path, raw.status);
        let outcome = map_status(raw.status, &raw.body);

        match outcome {
            Err(ApiError::AuthFailure) if token.is_some() => {
                tracing::warn!("{} {} rejected the session token", method, path);
                self.notifier.notify(Notice::SessionExpired);
            }
            Err(ApiError::AuthFailure) => {
                tracing::warn!("{} {} requires authentication", method, path);
                self.notifier.notify(Notice::LoginRequired);
            }
            Err(ref e) => tracing::warn!("{} {} failed: {}", method, path, e),
            Ok(_) => {}
        }
        outcome
    }

    /// Perform a call and decode its body
    pub async fn fetch<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let path = request.path.clone();
        let body = self.send(request).await?;
        serde_json::from_value(body.into_value())
            .map_err(|e| Error::Decode(format!("{}: {}", path, e)))
    }

    /// Perform a call whose body is irrelevant
    pub async fn execute(&self, request: RequestDescriptor) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }

    fn build(
        &self,
        request: RequestDescriptor,
        token: Option<&str>,
    ) -> std::result::Result<TransportRequest, ApiError> {
        let mut headers = Vec::new();

        // Attached whenever we have one, not only when the endpoint demands it
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let mut timeout = self.settings.timeout;
        let body = match request.payload {
            Payload::None => TransportBody::None,
            Payload::Json(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                TransportBody::Json(value)
            }
            Payload::Upload(form) => {
                if !form.file_path.is_file() {
                    return Err(ApiError::bad_request(format!(
                        "file does not exist: {}",
                        form.file_path.display()
                    )));
                }
                // multipart boundary header is set by the transport
                timeout = self.settings.upload_timeout;
                TransportBody::Multipart(form)
            }
        };

        Ok(TransportRequest {
            method: request.method,
            url: join_url(&self.settings.base_url, &request.path),
            path: request.path,
            query: request.query,
            headers,
            body,
            timeout,
        })
    }
}

fn timed_out(timeout: std::time::Duration) -> ApiError {
    ApiError::Network(format!("request timed out after {} ms", timeout.as_millis()))
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
