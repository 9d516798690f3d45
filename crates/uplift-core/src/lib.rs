//! Uplift Core Library
//!
//! Batch upload orchestration: a coordinator that runs an ordered list of
//! selected files through a one-at-a-time upload pipeline, reporting
//! progress after each attempt and never aborting the batch because one
//! item failed.
//!
//! The coordinator owns no I/O. The actual network upload and the
//! progress display are injected as [`Transport`] and [`ProgressSink`]
//! trait objects, resolved once at construction. Each coordinator instance
//! is independent; hosts may run several concurrently without any shared
//! state between them.

pub mod batch;
pub mod error;
pub mod item;
pub mod transport;

// Re-export commonly used types
pub use batch::{BatchOutcome, BatchState, BatchUploadCoordinator, FailedUpload};
pub use error::{BatchError, BatchResult, TransportError};
pub use item::{ItemState, SelectionItem, UploadMetadata};
pub use transport::{NullProgressSink, ProgressSink, Transport, UploadedRecord};
