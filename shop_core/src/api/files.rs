use crate::gateway::Gateway;
use crate::request::{RequestDescriptor, UploadForm};
use crate::{Result, UploadResponse};
use serde_json::Value;
use std::path::Path;

/// Multipart field carrying the file bytes
const FILE_FIELD: &str = "file";

pub struct FilesApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> FilesApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Upload an image and remember its URL
    ///
    /// `metadata` is sent as a JSON text field next to the file. A missing
    /// file fails locally with a validation error.
    pub async fn upload_image(
        &self,
        file_path: &Path,
        metadata: Option<&Value>,
    ) -> Result<UploadResponse> {
        let mut fields = Vec::new();
        if let Some(metadata) = metadata {
            fields.push(("metadata".to_string(), serde_json::to_string(metadata)?));
        }

        let descriptor = RequestDescriptor::post("/files/upload")
            .authenticated()
            .upload(UploadForm {
                file_path: file_path.to_path_buf(),
                field_name: FILE_FIELD.to_string(),
                fields,
            });
        let response: UploadResponse = self.gateway.fetch(descriptor).await?;

        // The upload itself succeeded; a history write failure is not fatal
        if let Err(e) = self.gateway.session().record_upload(&response.url) {
            tracing::warn!("Failed to record upload {}: {}", response.url, e);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{gateway, respond};
    use crate::transport::{MockTransport, TransportBody};
    use crate::{ApiError, ValidationKind};
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_fails_before_transport() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let gateway = gateway(&temp_dir, transport, Some("t1"));
        let err = FilesApi::new(&gateway)
            .upload_image(&temp_dir.path().join("nope.jpg"), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err.api(),
            Some(ApiError::Validation {
                kind: ValidationKind::BadRequest,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_upload_records_url_in_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("photo.jpg");
        std::fs::write(&file_path, b"jpeg bytes").unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| match &req.body {
                TransportBody::Multipart(form) => {
                    form.field_name == "file"
                        && form.fields
                            == vec![("metadata".to_string(), r#"{"kind":"avatar"}"#.to_string())]
                }
                _ => false,
            })
            .times(1)
            .returning(|_| respond(200, r#"{"url":"https://cdn/photo.jpg"}"#));

        let gateway = gateway(&temp_dir, transport, Some("t1"));
        let response = FilesApi::new(&gateway)
            .upload_image(&file_path, Some(&json!({"kind": "avatar"})))
            .await
            .unwrap();

        assert_eq!(response.url, "https://cdn/photo.jpg");
        assert_eq!(
            gateway.session().recent_uploads(),
            vec!["https://cdn/photo.jpg".to_string()]
        );
    }
}
