//! Shared HTTP client for the Uplift file API.
//!
//! Provides a minimal client with configurable auth (Bearer token or
//! X-API-Key), generic GET/multipart-POST helpers, and domain methods
//! (file listing). The CLI uses this client directly; batch uploads go
//! through [`transport::HttpTransport`].

pub mod models;
pub mod transport;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// API version prefix (e.g. "/api/v1"). Set UPLIFT_API_VERSION to match the server.
pub fn api_prefix() -> String {
    let version = std::env::var("UPLIFT_API_VERSION").unwrap_or_else(|_| "v1".to_string());
    format!("/api/{}", version)
}

/// HTTP client for the Uplift file API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: UPLIFT_API_URL (or API_URL), UPLIFT_TOKEN
    /// (or UPLIFT_API_KEY). Uses Bearer auth, which is what the server's
    /// session tokens expect; set an X-API-Key client explicitly if needed.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("UPLIFT_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let token = std::env::var("UPLIFT_TOKEN")
            .or_else(|_| std::env::var("UPLIFT_API_KEY"))
            .context("Missing token. Set UPLIFT_TOKEN or UPLIFT_API_KEY")?;

        Self::new(base_url, Auth::Bearer(token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        request = self.apply_auth(request);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// POST multipart form. Returns the raw response so callers can map
    /// status and body errors themselves.
    pub async fn post_multipart_raw(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> reqwest::Result<reqwest::Response> {
        let url = self.build_url(path);
        let request = self.client.post(&url).multipart(form);
        let request = self.apply_auth(request);
        request.send().await
    }

    /// List stored file records.
    pub async fn list_files(&self) -> Result<Vec<models::FileRecord>> {
        let response: models::FileListResponse =
            self.get(&format!("{}/files", api_prefix()), &[]).await?;
        Ok(response.files)
    }
}

// Re-export domain response types for convenience.
pub use models::{FileListResponse, FileRecord, UploadResponse};
pub use transport::HttpTransport;
