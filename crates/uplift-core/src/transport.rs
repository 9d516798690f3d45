//! Transport and progress abstraction traits
//!
//! The coordinator talks to the outside world only through these two
//! traits. Implementations are injected at construction time, never looked
//! up dynamically mid-run.

use crate::error::TransportError;
use crate::item::{SelectionItem, UploadMetadata};
use async_trait::async_trait;

/// What the backend stored for one uploaded item.
///
/// A minimal view: transports backed by richer APIs keep their full
/// response type to themselves and project it down to this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedRecord {
    /// Backend-assigned identifier (opaque to the coordinator).
    pub id: String,
    pub name: String,
    pub size_bytes: u64,
    /// Public URL, when the backend exposes one.
    pub url: Option<String>,
}

/// Uploads a single item.
///
/// Typically backed by an HTTP multipart POST to a REST endpoint; the wire
/// format is the implementation's business. Each call may fail
/// independently; a per-call timeout should surface as
/// [`TransportError::Timeout`] like any other failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload(
        &self,
        item: &SelectionItem,
        metadata: &UploadMetadata,
    ) -> Result<UploadedRecord, TransportError>;
}

/// Receives progress and completion notifications for one batch run.
///
/// Typically backed by a progress bar and a notification widget. The
/// coordinator calls `on_progress` once per attempted item (success or
/// failure) and `on_complete` exactly once per run, including cancelled
/// runs.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// `percent` is `round(100 * completed / total)`: non-decreasing across
    /// calls and exactly 100 after the last item.
    async fn on_progress(&self, completed: usize, total: usize, percent: u32);

    async fn on_complete(&self, outcome: &crate::batch::BatchOutcome);
}

/// Sink that drops all notifications. For hosts that only want the
/// returned outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

#[async_trait]
impl ProgressSink for NullProgressSink {
    async fn on_progress(&self, _completed: usize, _total: usize, _percent: u32) {}

    async fn on_complete(&self, _outcome: &crate::batch::BatchOutcome) {}
}
