//! Record-change events and asynchronous index job dispatch
//!
//! Primary-store mutations surface here as [`AnnotationEvent`]s. The
//! subscriber maps each event to exactly one [`IndexJob`] and hands it to a
//! [`JobDispatcher`] — a fire-and-forget boundary whose contract ends at
//! successful enqueue. Delivery and retry guarantees belong to the dispatch
//! backend; the jobs themselves are idempotent, so at-least-once delivery is
//! safe.

mod channel;
mod error;
mod events;
mod subscriber;
mod traits;

pub use channel::{ChannelDispatcher, IndexWorker};
pub use error::{MessagingError, MessagingResult};
pub use events::{AnnotationAction, AnnotationEvent, IndexJob, MessageEnvelope, MessageMetadata};
pub use subscriber::subscribe_annotation_event;
pub use traits::JobDispatcher;
