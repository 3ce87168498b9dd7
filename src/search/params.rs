//! Search request parameters and per-request context

use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};

/// Sort order for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Field to sort by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchSort {
    Relevance,
    Created(SortOrder),
    Updated(SortOrder),
}

impl Default for SearchSort {
    fn default() -> Self {
        Self::Updated(SortOrder::Descending)
    }
}

/// Identity on whose behalf a search runs
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Authenticated user identity, if any
    pub userid: Option<String>,
}

impl RequestContext {
    /// Context for an unauthenticated request
    pub fn anonymous() -> Self {
        Self { userid: None }
    }

    /// Context for an authenticated request
    pub fn for_user(userid: impl Into<String>) -> Self {
        Self {
            userid: Some(userid.into()),
        }
    }
}

/// Parameters a caller passes into a search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text search terms
    pub query: Option<String>,

    /// Restrict to annotations on any of these URIs
    pub uris: Vec<String>,

    /// Restrict to annotations in this group
    pub group: Option<String>,

    /// Match annotations carrying these tags
    pub tags: Vec<String>,

    /// Offset for pagination
    pub offset: usize,

    /// Number of results to return
    pub limit: usize,

    /// Sorting criteria
    pub sort: SearchSort,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            uris: Vec::new(),
            group: None,
            tags: Vec::new(),
            offset: 0,
            limit: 20,
            sort: SearchSort::default(),
        }
    }
}

impl SearchParams {
    /// Create parameters with defaults (limit 20, newest-updated first)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set free-text search terms
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Restrict to a single URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uris.push(uri.into());
        self
    }

    /// Restrict to a set of URIs
    pub fn with_uris(mut self, uris: Vec<impl Into<String>>) -> Self {
        self.uris = uris.into_iter().map(|u| u.into()).collect();
        self
    }

    /// Restrict to a group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Match a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set offset
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set sorting
    pub fn with_sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    /// Reject malformed pagination values before any backend call is made
    pub fn validate(&self, config: &SearchConfig) -> SearchResult<()> {
        if self.limit == 0 {
            return Err(SearchError::InvalidParams(
                "limit must be greater than zero".to_string(),
            ));
        }
        if self.limit > config.max_results {
            return Err(SearchError::InvalidParams(format!(
                "limit {} exceeds the maximum of {}",
                self.limit, config.max_results
            )));
        }
        if self.offset > config.max_offset {
            return Err(SearchError::InvalidParams(format!(
                "offset {} exceeds the maximum of {}",
                self.offset, config.max_offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SearchParams::new();
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 0);
        assert_eq!(params.sort, SearchSort::Updated(SortOrder::Descending));
        assert!(params.uris.is_empty());
    }

    #[test]
    fn test_builder_style() {
        let params = SearchParams::new()
            .with_query("climate")
            .with_uri("https://example.com")
            .with_group("biology")
            .with_tag("peer-review")
            .with_limit(50)
            .with_offset(10);

        assert_eq!(params.query.as_deref(), Some("climate"));
        assert_eq!(params.uris, vec!["https://example.com"]);
        assert_eq!(params.group.as_deref(), Some("biology"));
        assert_eq!(params.tags, vec!["peer-review"]);
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 10);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = SearchConfig::default();
        let params = SearchParams::new().with_limit(0);
        assert!(matches!(
            params.validate(&config),
            Err(SearchError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_limit_and_offset() {
        let config = SearchConfig::default();

        let params = SearchParams::new().with_limit(config.max_results + 1);
        assert!(matches!(
            params.validate(&config),
            Err(SearchError::InvalidParams(_))
        ));

        let params = SearchParams::new().with_offset(config.max_offset + 1);
        assert!(matches!(
            params.validate(&config),
            Err(SearchError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_accepts_bounds() {
        let config = SearchConfig::default();
        let params = SearchParams::new()
            .with_limit(config.max_results)
            .with_offset(config.max_offset);
        assert!(params.validate(&config).is_ok());
    }
}
