//! Response types for the file API.
//!
//! Field names match the server's JSON for `file_objects` rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored file record as the server returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Server-assigned UUID string.
    pub id: String,
    pub original_name: String,
    pub storage_path: String,
    #[serde(default)]
    pub content_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub md5_hash: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub uploaded_by: String,
    /// Public URL, present only for files in public buckets.
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of `POST /files/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub file: FileRecord,
}

/// Response of `GET /files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_decodes_server_shape() {
        let json = r#"{
            "message": "File uploaded successfully",
            "file": {
                "id": "3f1f9b1e-5a8e-4a2a-9b1a-1c2d3e4f5a6b",
                "original_name": "photo.png",
                "storage_path": "uploads/2026/08/photo.png",
                "content_type": "image/png",
                "file_size": 2048,
                "md5_hash": "d41d8cd98f00b204e9800998ecf8427e",
                "is_public": true,
                "tags": "screenshots,2026",
                "uploaded_by": "42",
                "created_at": "2026-08-25T10:00:00Z",
                "updated_at": "2026-08-25T10:00:00Z"
            }
        }"#;

        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.file.original_name, "photo.png");
        assert_eq!(response.file.file_size, 2048);
        assert!(response.file.is_public);
        assert!(response.file.url.is_none());
    }

    #[test]
    fn file_list_tolerates_missing_fields() {
        let json = r#"{"files": [{
            "id": "a",
            "original_name": "doc.pdf",
            "storage_path": "uploads/doc.pdf",
            "file_size": 10
        }]}"#;

        let response: FileListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].content_type, "");
        assert!(response.files[0].created_at.is_none());
    }
}
