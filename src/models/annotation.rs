//! Annotation record as stored in the primary, authoritative data store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may see an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to everyone
    Public,
    /// Visible to the creator only
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Opaque identifier assigned by the primary store
    pub id: String,

    /// Target URI the annotation is anchored to
    pub uri: String,

    /// Annotation body text
    pub text: String,

    /// Tags
    pub tags: Vec<String>,

    /// Group the annotation was made in
    pub group: String,

    /// Creator identity (e.g. "acct:jane@example.com")
    pub user: String,

    /// Id of the annotated parent annotation; present marks this a reply
    pub parent: Option<String>,

    /// Visibility of the annotation
    pub visibility: Visibility,

    /// Created timestamp
    pub created: DateTime<Utc>,

    /// Updated timestamp
    pub updated: DateTime<Utc>,
}

impl Annotation {
    /// Create a new public, top-level annotation
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        text: impl Into<String>,
        group: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            uri: uri.into(),
            text: text.into(),
            tags: Vec::new(),
            group: group.into(),
            user: user.into(),
            parent: None,
            visibility: Visibility::Public,
            created: now,
            updated: now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether this annotation is a reply to another annotation
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }
}
