//! HTTP upload transport.
//!
//! One multipart POST per item against `POST {base}/api/v1/files/upload`,
//! with the form fields the server reads: `file`, optional `tags`, and
//! `is_public` (sent as the literal "true" only when set).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::models::UploadResponse;
use crate::{api_prefix, ApiClient};
use uplift_core::{SelectionItem, Transport, TransportError, UploadMetadata, UploadedRecord};

/// [`Transport`] backed by the file API.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ApiClient,
}

impl HttpTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload(
        &self,
        item: &SelectionItem,
        metadata: &UploadMetadata,
    ) -> Result<UploadedRecord, TransportError> {
        let part = Part::bytes(item.payload.to_vec())
            .file_name(item.name.clone())
            .mime_str(&item.mime_type)
            .map_err(|e| TransportError::Request(format!("invalid mime type: {}", e)))?;

        let mut form = Form::new().part("file", part);
        if let Some(tags) = metadata.tags.as_deref().filter(|t| !t.is_empty()) {
            form = form.text("tags", tags.to_string());
        }
        if metadata.is_public {
            form = form.text("is_public", "true");
        }

        let response = self
            .client
            .post_multipart_raw(&format!("{}/files/upload", api_prefix()), form)
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(%status, name = %item.name, "upload rejected");
            return Err(TransportError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(UploadedRecord {
            id: body.file.id,
            name: body.file.original_name,
            size_bytes: body.file.file_size,
            url: body.file.url,
        })
    }
}
