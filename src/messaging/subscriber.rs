//! Maps record-change events onto index jobs

use crate::messaging::error::MessagingResult;
use crate::messaging::events::{AnnotationAction, AnnotationEvent, IndexJob};
use crate::messaging::traits::JobDispatcher;

/// Handle a record-change event by enqueueing exactly one index job:
/// create/update become an add job, delete becomes a delete job. Returns
/// once the job is enqueued; index consistency is not awaited.
pub async fn subscribe_annotation_event(
    event: &AnnotationEvent,
    dispatcher: &dyn JobDispatcher,
) -> MessagingResult<()> {
    let job = match event.action {
        AnnotationAction::Create | AnnotationAction::Update => IndexJob::AddAnnotation {
            annotation_id: event.annotation_id.clone(),
        },
        AnnotationAction::Delete => IndexJob::DeleteAnnotation {
            annotation_id: event.annotation_id.clone(),
        },
    };

    tracing::debug!(
        annotation_id = %event.annotation_id,
        action = event.action_name(),
        job = job.job_name(),
        "Dispatching index job"
    );
    dispatcher.enqueue(job).await
}
