//! Main search service implementation

use crate::search::config::SearchConfig;
use crate::search::document::AnnotationDocument;
use crate::search::error::SearchResult;
use crate::search::index::{IndexManager, IndexStats};
use crate::search::params::{RequestContext, SearchParams};
use crate::search::query::{
    AnyMatcher, AuthFilter, Builder, GroupFilter, RepliesMatcher, SearchExtensions, TagsMatcher,
    TopLevelAnnotationsFilter, UriFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options controlling a single search call
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Include the requester's own private annotations alongside public ones
    pub private: bool,

    /// Return top-level annotations in `rows` and collect their replies into
    /// a separate `replies` list with a second query
    pub separate_replies: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            private: true,
            separate_replies: false,
        }
    }
}

impl SearchOptions {
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn with_separate_replies(mut self, separate_replies: bool) -> Self {
        self.separate_replies = separate_replies;
        self
    }
}

/// Search response with results and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching annotations, in the requested sort order
    pub rows: Vec<AnnotationDocument>,

    /// Total number of matches server-side (may exceed `rows.len()`)
    pub total: usize,

    /// Replies to the annotations in `rows`, when separate replies were
    /// requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<AnnotationDocument>>,

    /// The reply set exceeded the fixed reply page size and was cut off;
    /// reply pagination is not supported
    #[serde(default)]
    pub replies_truncated: bool,
}

/// Main search service
pub struct SearchService {
    /// Index manager
    index_manager: Arc<IndexManager>,

    /// Configuration
    config: SearchConfig,

    /// Extra filter/matcher factories applied after the built-ins
    extensions: SearchExtensions,
}

impl SearchService {
    /// Create a new search service with no extensions
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        Self::with_extensions(config, SearchExtensions::default()).await
    }

    /// Create a new search service with registered extension factories
    pub async fn with_extensions(
        config: SearchConfig,
        extensions: SearchExtensions,
    ) -> SearchResult<Self> {
        let index_manager = Arc::new(IndexManager::new(config.clone()).await?);

        Ok(Self {
            index_manager,
            config,
            extensions,
        })
    }

    /// The index manager backing this service, for wiring up index writers
    pub fn index_manager(&self) -> Arc<IndexManager> {
        Arc::clone(&self.index_manager)
    }

    /// Search for annotations.
    ///
    /// With `separate_replies`, phase one fetches top-level annotations only
    /// and a second query collects every reply to them, with the visibility
    /// rules reapplied through a fresh builder. The reply fetch uses one
    /// fixed page; overflow is reported through `replies_truncated` rather
    /// than failing the call.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        params: &SearchParams,
        options: SearchOptions,
    ) -> SearchResult<SearchResponse> {
        params.validate(&self.config)?;

        let mut builder = self.default_builder(ctx, options.private);
        if options.separate_replies {
            builder.append_filter(TopLevelAnnotationsFilter);
        }

        let query = builder.build(params);
        let (rows, total) = self.index_manager.search(&query).await?;

        if !options.separate_replies {
            return Ok(SearchResponse {
                rows,
                total,
                replies: None,
                replies_truncated: false,
            });
        }

        let parent_ids: Vec<String> = rows.iter().map(|doc| doc.id.clone()).collect();
        let mut reply_builder = self.default_builder(ctx, options.private);
        reply_builder.append_matcher(RepliesMatcher::new(parent_ids));

        let reply_params = SearchParams {
            limit: self.config.reply_page_size,
            ..SearchParams::default()
        };
        let reply_query = reply_builder.build(&reply_params);
        let (reply_rows, reply_total) = self.index_manager.search(&reply_query).await?;

        let replies_truncated = reply_total > reply_rows.len();
        if replies_truncated {
            tracing::warn!(
                reply_total,
                page_size = self.config.reply_page_size,
                "The number of replies exceeded the reply page size; the reply \
                 set is truncated and reply pagination is not supported"
            );
        }

        Ok(SearchResponse {
            rows,
            total,
            replies: Some(reply_rows),
            replies_truncated,
        })
    }

    /// Assemble the default builder: auth, uri and group filters, registered
    /// extension filters, then the free-text and tags matchers and registered
    /// extension matchers, all in that fixed order
    fn default_builder(&self, ctx: &RequestContext, private: bool) -> Builder {
        let mut builder = Builder::new();

        builder.append_filter(AuthFilter::new(ctx.userid.clone(), private));
        builder.append_filter(UriFilter);
        builder.append_filter(GroupFilter);
        for factory in self.extensions.filters() {
            builder.append_boxed_filter(factory(ctx));
        }

        builder.append_matcher(AnyMatcher);
        builder.append_matcher(TagsMatcher);
        for factory in self.extensions.matchers() {
            builder.append_boxed_matcher(factory(ctx));
        }

        builder
    }

    /// Get index statistics
    pub async fn stats(&self) -> SearchResult<IndexStats> {
        self.index_manager.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Annotation, Visibility};
    use crate::search::document::AnnotationDocument;
    use crate::search::error::SearchError;
    use tempfile::TempDir;

    async fn create_test_service() -> (SearchService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        (SearchService::new(config).await.unwrap(), temp_dir)
    }

    async fn index_annotation(service: &SearchService, annotation: &Annotation) {
        service
            .index_manager()
            .upsert_document(&AnnotationDocument::from(annotation))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_creation() {
        let (service, _dir) = create_test_service().await;
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_documents, 0);
    }

    #[tokio::test]
    async fn test_index_and_search() {
        let (service, _dir) = create_test_service().await;

        let annotation = Annotation::new(
            "ann-1",
            "https://example.com/article",
            "the methodology section is thin",
            "__world__",
            "acct:jane@example.com",
        );
        index_annotation(&service, &annotation).await;

        let results = service
            .search(
                &RequestContext::anonymous(),
                &SearchParams::new().with_query("methodology"),
                SearchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(results.total, 1);
        assert_eq!(results.rows[0].id, "ann-1");
        assert!(results.replies.is_none());
    }

    #[tokio::test]
    async fn test_private_annotations_hidden_from_other_users() {
        let (service, _dir) = create_test_service().await;

        let private = Annotation::new(
            "ann-private",
            "https://example.com/article",
            "my private note",
            "__world__",
            "acct:jane@example.com",
        )
        .with_visibility(Visibility::Private);
        index_annotation(&service, &private).await;

        let as_other = service
            .search(
                &RequestContext::for_user("acct:bob@example.com"),
                &SearchParams::new(),
                SearchOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(as_other.total, 0);

        let as_owner = service
            .search(
                &RequestContext::for_user("acct:jane@example.com"),
                &SearchParams::new(),
                SearchOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(as_owner.total, 1);
    }

    #[tokio::test]
    async fn test_invalid_params_fail_fast() {
        let (service, _dir) = create_test_service().await;

        let result = service
            .search(
                &RequestContext::anonymous(),
                &SearchParams::new().with_limit(0),
                SearchOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(SearchError::InvalidParams(_))));
    }
}
