//! Search document structures and the annotation index schema

use crate::models::{Annotation, Visibility};
use crate::search::error::{SearchError, SearchResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument;

    /// Get document ID
    fn document_id(&self) -> String;
}

/// Denormalized projection of an [`Annotation`] held in the search index.
/// One document per annotation id, overwritten on update, removed on delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Annotation ID
    pub id: String,

    /// Target URI
    pub uri: String,

    /// Annotation body text
    pub text: String,

    /// Tags
    pub tags: Vec<String>,

    /// Group
    pub group: String,

    /// Creator identity
    pub user: String,

    /// Visibility
    pub visibility: Visibility,

    /// Parent annotation id; present marks this document a reply
    pub parent: Option<String>,

    /// Created timestamp
    pub created: DateTime<Utc>,

    /// Updated timestamp
    pub updated: DateTime<Utc>,
}

impl From<&Annotation> for AnnotationDocument {
    fn from(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            uri: annotation.uri.clone(),
            text: annotation.text.clone(),
            tags: annotation.tags.clone(),
            group: annotation.group.clone(),
            user: annotation.user.clone(),
            visibility: annotation.visibility,
            parent: annotation.parent.clone(),
            created: annotation.created,
            updated: annotation.updated,
        }
    }
}

impl From<Annotation> for AnnotationDocument {
    fn from(annotation: Annotation) -> Self {
        Self::from(&annotation)
    }
}

impl SearchDocument for AnnotationDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument {
        let mut doc = TantivyDocument::new();

        if let Ok(field) = schema.get_field("id") {
            doc.add_text(field, &self.id);
        }

        if let Ok(field) = schema.get_field("uri") {
            doc.add_text(field, &self.uri);
        }

        if let Ok(field) = schema.get_field("text") {
            doc.add_text(field, &self.text);
        }

        // Tags (multi-valued)
        if let Ok(field) = schema.get_field("tags") {
            for tag in &self.tags {
                doc.add_text(field, tag);
            }
        }

        if let Ok(field) = schema.get_field("group") {
            doc.add_text(field, &self.group);
        }

        if let Ok(field) = schema.get_field("user") {
            doc.add_text(field, &self.user);
        }

        if let Ok(field) = schema.get_field("visibility") {
            doc.add_text(field, self.visibility.as_str());
        }

        // The parent field is only written for replies; the is_reply marker
        // is always written so top-level-only queries can match on it.
        if let Some(ref parent) = self.parent {
            if let Ok(field) = schema.get_field("parent") {
                doc.add_text(field, parent);
            }
        }
        if let Ok(field) = schema.get_field("is_reply") {
            doc.add_text(field, if self.parent.is_some() { "true" } else { "false" });
        }

        if let Ok(field) = schema.get_field("created") {
            doc.add_date(
                field,
                tantivy::DateTime::from_timestamp_secs(self.created.timestamp()),
            );
        }

        if let Ok(field) = schema.get_field("updated") {
            doc.add_date(
                field,
                tantivy::DateTime::from_timestamp_secs(self.updated.timestamp()),
            );
        }

        doc
    }

    fn document_id(&self) -> String {
        self.id.clone()
    }
}

impl AnnotationDocument {
    /// Rebuild a document from its stored Tantivy representation
    pub fn from_tantivy_doc(schema: &Schema, doc: &TantivyDocument) -> SearchResult<Self> {
        let id = get_text(schema, doc, "id")?
            .ok_or_else(|| SearchError::Schema("document missing id".to_string()))?;

        let visibility = get_text(schema, doc, "visibility")?
            .and_then(|v| Visibility::parse(&v))
            // An unreadable visibility value must fail closed
            .unwrap_or(Visibility::Private);

        Ok(Self {
            id,
            uri: get_text(schema, doc, "uri")?.unwrap_or_default(),
            text: get_text(schema, doc, "text")?.unwrap_or_default(),
            tags: get_all_text(schema, doc, "tags")?,
            group: get_text(schema, doc, "group")?.unwrap_or_default(),
            user: get_text(schema, doc, "user")?.unwrap_or_default(),
            visibility,
            parent: get_text(schema, doc, "parent")?,
            created: get_date(schema, doc, "created")?,
            updated: get_date(schema, doc, "updated")?,
        })
    }
}

fn get_text(schema: &Schema, doc: &TantivyDocument, name: &str) -> SearchResult<Option<String>> {
    let field = schema
        .get_field(name)
        .map_err(|e| SearchError::Schema(e.to_string()))?;
    Ok(doc
        .get_first(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string()))
}

fn get_all_text(schema: &Schema, doc: &TantivyDocument, name: &str) -> SearchResult<Vec<String>> {
    let field = schema
        .get_field(name)
        .map_err(|e| SearchError::Schema(e.to_string()))?;
    Ok(doc
        .get_all(field)
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect())
}

fn get_date(schema: &Schema, doc: &TantivyDocument, name: &str) -> SearchResult<DateTime<Utc>> {
    let field = schema
        .get_field(name)
        .map_err(|e| SearchError::Schema(e.to_string()))?;
    Ok(doc
        .get_first(field)
        .and_then(|v| v.as_datetime())
        .and_then(|dt| DateTime::from_timestamp(dt.into_timestamp_secs(), 0))
        .unwrap_or_default())
}

/// Build the search schema for annotations
pub fn build_annotation_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // ID - stored, indexed as a whole string
    schema_builder.add_text_field("id", STRING | STORED);

    // Target URI - exact match for URI filtering
    schema_builder.add_text_field("uri", STRING | STORED);

    // Body text - full-text indexed, stored
    schema_builder.add_text_field("text", TEXT | STORED);

    // Tags - multi-valued, full-text indexed
    schema_builder.add_text_field("tags", TEXT | STORED);

    // Group - exact match
    schema_builder.add_text_field("group", STRING | STORED);

    // Creator identity - exact match for access control
    schema_builder.add_text_field("user", STRING | STORED);

    // Visibility ("public"/"private") - exact match for access control
    schema_builder.add_text_field("visibility", STRING | STORED);

    // Parent annotation id, only present on replies
    schema_builder.add_text_field("parent", STRING | STORED);

    // Derived marker ("true"/"false") for the top-level-only constraint
    schema_builder.add_text_field("is_reply", STRING);

    // Timestamps - fast fields for sorting
    schema_builder.add_date_field("created", INDEXED | STORED | FAST);
    schema_builder.add_date_field("updated", INDEXED | STORED | FAST);

    schema_builder.build()
}
