//! Event and job types for index synchronization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to an annotation in the primary store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationAction {
    Create,
    Update,
    Delete,
}

/// A record-change notification from the primary store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    /// Id of the annotation that changed
    pub annotation_id: String,

    /// The mutation that occurred
    pub action: AnnotationAction,
}

impl AnnotationEvent {
    pub fn new(annotation_id: impl Into<String>, action: AnnotationAction) -> Self {
        Self {
            annotation_id: annotation_id.into(),
            action,
        }
    }

    /// Get the action as a string
    pub fn action_name(&self) -> &'static str {
        match self.action {
            AnnotationAction::Create => "create",
            AnnotationAction::Update => "update",
            AnnotationAction::Delete => "delete",
        }
    }
}

/// An asynchronous index mutation to be executed by a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexJob {
    /// Fetch the annotation from the primary store and upsert it
    AddAnnotation { annotation_id: String },

    /// Remove the annotation's document from the index
    DeleteAnnotation { annotation_id: String },
}

impl IndexJob {
    /// Get the annotation id from either job type
    pub fn annotation_id(&self) -> &str {
        match self {
            IndexJob::AddAnnotation { annotation_id }
            | IndexJob::DeleteAnnotation { annotation_id } => annotation_id,
        }
    }

    /// Get the job name as a string
    pub fn job_name(&self) -> &'static str {
        match self {
            IndexJob::AddAnnotation { .. } => "add_annotation",
            IndexJob::DeleteAnnotation { .. } => "delete_annotation",
        }
    }
}

/// Message metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Message ID
    pub message_id: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Source service
    pub source: String,
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source: "annosearch".to_string(),
        }
    }
}

/// Message envelope wrapping a payload with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    /// Message metadata
    pub metadata: MessageMetadata,

    /// Message payload
    pub payload: T,
}

impl<T> MessageEnvelope<T> {
    /// Create a new message envelope
    pub fn new(payload: T) -> Self {
        Self {
            metadata: MessageMetadata::default(),
            payload,
        }
    }
}
