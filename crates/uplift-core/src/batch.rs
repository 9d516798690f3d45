//! The batch upload coordinator.
//!
//! One coordinator instance runs one batch: items are appended while idle,
//! `start` freezes the selection and uploads the items strictly in order,
//! one at a time, folding per-item failures into the outcome instead of
//! aborting. A batch is single-use; construct a new one to retry.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{BatchError, BatchResult, TransportError};
use crate::item::{ItemState, SelectionItem, UploadMetadata};
use crate::transport::{ProgressSink, Transport};

/// Batch lifecycle: Idle → Running → Completed | Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// One item that failed to upload, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub item: SelectionItem,
    pub error: TransportError,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success_count: u32,
    pub fail_count: u32,
    /// Failures in the order they were attempted, with enough detail
    /// (item name + error) to identify which files need retrying.
    pub failures: Vec<FailedUpload>,
    /// True when the run was stopped by the cancellation token before all
    /// items were attempted.
    pub cancelled: bool,
}

/// Runs an ordered selection of items through a one-at-a-time upload
/// pipeline against an injected [`Transport`], reporting to an injected
/// [`ProgressSink`].
///
/// There is exactly one suspend point per item (the transport call); the
/// coordinator spawns no tasks and holds no shared state, so independent
/// instances may run concurrently without coordination.
pub struct BatchUploadCoordinator {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ProgressSink>,
    items: Vec<SelectionItem>,
    item_states: Vec<ItemState>,
    state: BatchState,
    cancel: CancellationToken,
}

/// Progress percentage after `completed` of `total` items, rounded half-up.
/// Monotone in `completed` and exactly 100 when `completed == total`.
fn progress_percent(completed: usize, total: usize) -> u32 {
    debug_assert!(total > 0 && completed <= total);
    ((completed * 100 + total / 2) / total) as u32
}

impl BatchUploadCoordinator {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            transport,
            sink,
            items: Vec::new(),
            item_states: Vec::new(),
            state: BatchState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Per-item states, parallel to the selection. Hosts use this to render
    /// per-file status; after a cancelled run, skipped items are Pending.
    pub fn item_states(&self) -> &[ItemState] {
        &self.item_states
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Token handle for cooperative cancellation. Cancelling it lets the
    /// in-flight upload finish but starts no further items.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Append an item to the end of the selection. Duplicates by name are
    /// allowed. Fails once a run has started.
    pub fn add_item(&mut self, item: SelectionItem) -> BatchResult<()> {
        if self.state != BatchState::Idle {
            return Err(BatchError::InvalidState(
                "cannot add items after the batch has started",
            ));
        }
        self.items.push(item);
        self.item_states.push(ItemState::Pending);
        Ok(())
    }

    /// Remove the item at `index`, shifting later items down by one. The
    /// selection is left unmodified on error.
    pub fn remove_item(&mut self, index: usize) -> BatchResult<SelectionItem> {
        if self.state != BatchState::Idle {
            return Err(BatchError::InvalidState(
                "cannot remove items after the batch has started",
            ));
        }
        if index >= self.items.len() {
            return Err(BatchError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.item_states.remove(index);
        Ok(self.items.remove(index))
    }

    /// Run the batch: upload every item in selection order, one at a time.
    ///
    /// Transport failures are captured per item and never abort the run;
    /// the returned outcome carries the success/fail tally and the ordered
    /// failure list. The sink receives one progress call per attempted
    /// item and the final outcome as a summary event.
    ///
    /// Errors only on misuse: [`BatchError::EmptyBatch`] if nothing is
    /// selected (no transport or sink call is made), or
    /// [`BatchError::InvalidState`] if the batch already ran.
    #[tracing::instrument(skip_all, fields(total = self.items.len()))]
    pub async fn start(&mut self, metadata: UploadMetadata) -> BatchResult<BatchOutcome> {
        match self.state {
            BatchState::Idle => {}
            BatchState::Running => {
                return Err(BatchError::InvalidState("batch is already running"))
            }
            BatchState::Completed | BatchState::Cancelled => {
                return Err(BatchError::InvalidState(
                    "batch already ran; construct a new batch to retry",
                ))
            }
        }
        if self.items.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        self.state = BatchState::Running;
        let total = self.items.len();
        let mut outcome = BatchOutcome::default();

        for index in 0..total {
            if self.cancel.is_cancelled() {
                tracing::info!(completed = index, total, "batch cancelled");
                outcome.cancelled = true;
                break;
            }

            let item = &self.items[index];
            self.item_states[index] = ItemState::Uploading;
            tracing::debug!(index, name = %item.name, size = item.size_bytes, "uploading item");

            match self.transport.upload(item, &metadata).await {
                Ok(record) => {
                    self.item_states[index] = ItemState::Succeeded;
                    outcome.success_count += 1;
                    tracing::debug!(index, id = %record.id, "item uploaded");
                }
                Err(error) => {
                    self.item_states[index] = ItemState::Failed;
                    outcome.fail_count += 1;
                    tracing::warn!(index, name = %item.name, %error, "item upload failed");
                    outcome.failures.push(FailedUpload {
                        item: item.clone(),
                        error,
                    });
                }
            }

            let completed = index + 1;
            self.sink
                .on_progress(completed, total, progress_percent(completed, total))
                .await;
        }

        self.state = if outcome.cancelled {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        };
        self.sink.on_complete(&outcome).await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UploadedRecord;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Transport scripted by item name: names in `fail_with` fail, the
    /// rest succeed. Records every call. Optionally cancels a token after
    /// the Nth call to exercise cancellation deterministically.
    #[derive(Default)]
    struct ScriptedTransport {
        fail_with: Vec<(String, TransportError)>,
        calls: Mutex<Vec<String>>,
        cancel_after: Mutex<Option<(usize, CancellationToken)>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn upload(
            &self,
            item: &SelectionItem,
            _metadata: &UploadMetadata,
        ) -> Result<UploadedRecord, TransportError> {
            let call_count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(item.name.clone());
                calls.len()
            };
            if let Some((after, token)) = self.cancel_after.lock().unwrap().as_ref() {
                if call_count == *after {
                    token.cancel();
                }
            }
            if let Some((_, error)) = self.fail_with.iter().find(|(n, _)| n == &item.name) {
                return Err(error.clone());
            }
            Ok(UploadedRecord {
                id: format!("id-{}", call_count),
                name: item.name.clone(),
                size_bytes: item.size_bytes,
                url: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        progress: Mutex<Vec<(usize, usize, u32)>>,
        completions: Mutex<Vec<BatchOutcome>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn on_progress(&self, completed: usize, total: usize, percent: u32) {
            self.progress.lock().unwrap().push((completed, total, percent));
        }

        async fn on_complete(&self, outcome: &BatchOutcome) {
            self.completions.lock().unwrap().push(outcome.clone());
        }
    }

    fn item(name: &str) -> SelectionItem {
        SelectionItem::new(name, "application/octet-stream", Bytes::from_static(b"data"))
    }

    fn coordinator(
        transport: ScriptedTransport,
    ) -> (BatchUploadCoordinator, Arc<ScriptedTransport>, Arc<RecordingSink>) {
        let transport = Arc::new(transport);
        let sink = Arc::new(RecordingSink::default());
        let coordinator =
            BatchUploadCoordinator::new(transport.clone() as Arc<dyn Transport>, sink.clone());
        (coordinator, transport, sink)
    }

    #[test]
    fn percent_rounds_and_ends_at_100() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(1, 1), 100);
        assert_eq!(progress_percent(1, 7), 14);
        assert_eq!(progress_percent(7, 7), 100);
        for total in 1..=50 {
            let mut last = 0;
            for completed in 1..=total {
                let p = progress_percent(completed, total);
                assert!(p >= last, "percent must be non-decreasing");
                last = p;
            }
            assert_eq!(last, 100);
        }
    }

    #[tokio::test]
    async fn all_items_succeed() {
        let (mut batch, transport, sink) = coordinator(ScriptedTransport::default());
        for name in ["a.png", "b.pdf", "c.zip", "d.txt"] {
            batch.add_item(item(name)).unwrap();
        }

        let outcome = batch.start(UploadMetadata::default()).await.unwrap();

        assert_eq!(outcome.success_count, 4);
        assert_eq!(outcome.fail_count, 0);
        assert!(outcome.failures.is_empty());
        assert!(!outcome.cancelled);
        assert_eq!(batch.state(), BatchState::Completed);
        assert!(batch
            .item_states()
            .iter()
            .all(|s| *s == ItemState::Succeeded));
        // Uploads happen strictly in selection order.
        assert_eq!(
            *transport.calls.lock().unwrap(),
            vec!["a.png", "b.pdf", "c.zip", "d.txt"]
        );
        assert_eq!(sink.progress.lock().unwrap().last().unwrap().2, 100);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let transport = ScriptedTransport {
            fail_with: vec![(
                "fileB.pdf".to_string(),
                TransportError::Status {
                    code: 507,
                    message: "quota exceeded".to_string(),
                },
            )],
            ..Default::default()
        };
        let (mut batch, _, sink) = coordinator(transport);
        batch.add_item(item("fileA.png")).unwrap();
        batch.add_item(item("fileB.pdf")).unwrap();
        batch.add_item(item("fileC.zip")).unwrap();

        let outcome = batch.start(UploadMetadata::default()).await.unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.fail_count, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].item.name, "fileB.pdf");
        assert_eq!(
            outcome.failures[0].error,
            TransportError::Status {
                code: 507,
                message: "quota exceeded".to_string()
            }
        );
        // The item after the failure still reached a terminal state.
        assert_eq!(
            batch.item_states(),
            &[ItemState::Succeeded, ItemState::Failed, ItemState::Succeeded]
        );
        assert_eq!(
            *sink.progress.lock().unwrap(),
            vec![(1, 3, 33), (2, 3, 67), (3, 3, 100)]
        );
        let completions = sink.completions.lock().unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0], outcome);
    }

    #[tokio::test]
    async fn empty_batch_rejected_with_no_side_effects() {
        let (mut batch, transport, sink) = coordinator(ScriptedTransport::default());

        let err = batch.start(UploadMetadata::default()).await.unwrap_err();

        assert_eq!(err, BatchError::EmptyBatch);
        assert_eq!(batch.state(), BatchState::Idle);
        assert!(transport.calls.lock().unwrap().is_empty());
        assert!(sink.progress.lock().unwrap().is_empty());
        assert!(sink.completions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutation_rejected_after_start() {
        let (mut batch, _, _) = coordinator(ScriptedTransport::default());
        batch.add_item(item("a.png")).unwrap();
        batch.start(UploadMetadata::default()).await.unwrap();

        assert!(matches!(
            batch.add_item(item("b.png")),
            Err(BatchError::InvalidState(_))
        ));
        assert!(matches!(
            batch.remove_item(0),
            Err(BatchError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn completed_batch_cannot_restart() {
        let (mut batch, transport, _) = coordinator(ScriptedTransport::default());
        batch.add_item(item("a.png")).unwrap();
        batch.start(UploadMetadata::default()).await.unwrap();

        let err = batch.start(UploadMetadata::default()).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidState(_)));
        // No second round of uploads.
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn remove_item_shifts_and_validates() {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::default());
        let sink = Arc::new(RecordingSink::default());
        let mut batch = BatchUploadCoordinator::new(transport, sink);
        batch.add_item(item("a")).unwrap();
        batch.add_item(item("b")).unwrap();
        batch.add_item(item("c")).unwrap();

        let err = batch.remove_item(3).unwrap_err();
        assert_eq!(err, BatchError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(batch.len(), 3);

        let removed = batch.remove_item(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(batch.len(), 2);
        // Index 1 now addresses what used to be index 2.
        let removed = batch.remove_item(1).unwrap();
        assert_eq!(removed.name, "c");
    }

    #[tokio::test]
    async fn cancel_skips_remaining_items() {
        let (mut batch, transport, sink) = coordinator(ScriptedTransport::default());
        for name in ["a.png", "b.png", "c.png"] {
            batch.add_item(item(name)).unwrap();
        }
        // Cancel fires while the first upload is in flight; that upload is
        // allowed to finish.
        *transport.cancel_after.lock().unwrap() = Some((1, batch.cancel_token()));

        let outcome = batch.start(UploadMetadata::default()).await.unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.fail_count, 0);
        assert_eq!(batch.state(), BatchState::Cancelled);
        assert_eq!(
            batch.item_states(),
            &[ItemState::Succeeded, ItemState::Pending, ItemState::Pending]
        );
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
        // Summary still delivered so a UI sink can tear down.
        assert_eq!(sink.completions.lock().unwrap().len(), 1);
    }
}
