//! Selection items and per-batch metadata.

use bytes::Bytes;

/// One file picked for upload.
///
/// Immutable once added to a batch. Identity is the item's index in the
/// selection: stable for the lifetime of one run, but removing an item
/// before the run starts shifts the indices of later items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Original filename, as the backend should store it. Duplicates are
    /// allowed within one batch.
    pub name: String,
    pub size_bytes: u64,
    /// MIME type sent with the upload, e.g. `image/png`.
    pub mime_type: String,
    /// File content. `Bytes` so cloning an item into a failure record is a
    /// refcount bump, not a copy.
    pub payload: Bytes,
}

impl SelectionItem {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, payload: Bytes) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            payload,
        }
    }
}

/// Metadata shared by every item in a batch (not per-item).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMetadata {
    /// Optional comma-separated tags, passed through to the backend as-is.
    pub tags: Option<String>,
    pub is_public: bool,
}

/// Per-item upload status, strictly ordered:
/// Pending → Uploading → Succeeded | Failed. Terminal states never
/// transition again. Items skipped by cancellation stay Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Uploading,
    Succeeded,
    Failed,
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Succeeded | ItemState::Failed)
    }
}
