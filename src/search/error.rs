//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInit(String),

    /// Invalid pagination or sort parameters, rejected before any backend call
    #[error("Invalid search parameters: {0}")]
    InvalidParams(String),

    /// Query parsing failed
    #[error("Query parsing failed: {0}")]
    QueryParsing(String),

    /// Index backend unreachable or failed
    #[error("Search backend error: {0}")]
    Backend(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::Backend(err.to_string())
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        SearchError::QueryParsing(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidParams(msg) => AppError::Validation(msg),
            SearchError::QueryParsing(msg) => AppError::Validation(msg),
            SearchError::Io(err) => AppError::Internal(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
