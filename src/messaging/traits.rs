//! Messaging trait abstractions

use crate::messaging::error::MessagingResult;
use crate::messaging::events::IndexJob;
use async_trait::async_trait;

/// Fire-and-forget job scheduling boundary.
///
/// The caller's contract ends at a successful enqueue; delivery semantics
/// (at-least-once) and retry policy are owned by the implementation.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Enqueue a single index job
    async fn enqueue(&self, job: IndexJob) -> MessagingResult<()>;
}
