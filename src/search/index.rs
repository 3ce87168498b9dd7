//! Search index management: document writes and structured query execution

use crate::search::config::SearchConfig;
use crate::search::document::{build_annotation_schema, AnnotationDocument, SearchDocument};
use crate::search::error::{SearchError, SearchResult};
use crate::search::params::{SearchSort, SortOrder};
use crate::search::query::{Clause, Query};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, EmptyQuery, Occur, Query as TantivyQuery, QueryParser, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Schema};
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Index size in bytes
    pub index_size_bytes: u64,
}

/// Manages the Tantivy index holding annotation documents.
///
/// All writes are idempotent and keyed by annotation id: an upsert replaces
/// any existing document with the same id, and deleting an id that is not
/// indexed is a no-op. This is what makes retried jobs and a concurrent full
/// reindex safe.
pub struct IndexManager {
    /// The Tantivy index
    index: Index,

    /// The schema
    schema: Schema,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader
    reader: IndexReader,

    /// Configuration
    config: SearchConfig,
}

impl IndexManager {
    /// Open the index at the configured path, creating it if absent
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            SearchError::IndexInit(format!("Failed to create index directory: {}", e))
        })?;

        let schema = build_annotation_schema();

        let index = if Self::index_exists(&config.index_path) {
            Index::open_in_dir(&config.index_path).map_err(|e| {
                SearchError::IndexInit(format!("Failed to open existing index: {}", e))
            })?
        } else {
            Index::create_in_dir(&config.index_path, schema.clone()).map_err(|e| {
                SearchError::IndexInit(format!("Failed to create new index: {}", e))
            })?
        };

        let writer = index
            .writer(config.writer_heap_size)
            .map_err(|e| SearchError::IndexInit(format!("Failed to create writer: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInit(format!("Failed to create reader: {}", e)))?;

        Ok(Self {
            index,
            schema,
            writer: Arc::new(RwLock::new(writer)),
            reader,
            config,
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn field(&self, name: &str) -> SearchResult<Field> {
        self.schema
            .get_field(name)
            .map_err(|e| SearchError::Schema(e.to_string()))
    }

    /// Insert or replace the document with this id
    pub async fn upsert_document(&self, document: &AnnotationDocument) -> SearchResult<()> {
        let tantivy_doc = document.to_tantivy_doc(&self.schema);
        let id_field = self.field("id")?;

        let mut writer = self.writer.write().await;

        // Delete any existing document with the same id first
        writer.delete_term(Term::from_field_text(id_field, &document.document_id()));
        writer
            .add_document(tantivy_doc)
            .map_err(|e| SearchError::Backend(format!("Failed to add document: {}", e)))?;

        if self.config.realtime_indexing {
            self.commit_locked(&mut writer)?;
        }

        Ok(())
    }

    /// Remove the document with this id. Unknown ids are not an error.
    pub async fn delete_document(&self, document_id: &str) -> SearchResult<()> {
        let id_field = self.field("id")?;

        let mut writer = self.writer.write().await;
        writer.delete_term(Term::from_field_text(id_field, document_id));

        if self.config.realtime_indexing {
            self.commit_locked(&mut writer)?;
        }

        Ok(())
    }

    /// Commit pending changes and make them visible to searches
    pub async fn commit(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        self.commit_locked(&mut writer)
    }

    fn commit_locked(&self, writer: &mut IndexWriter) -> SearchResult<()> {
        writer
            .commit()
            .map_err(|e| SearchError::Backend(format!("Failed to commit: {}", e)))?;
        self.reader
            .reload()
            .map_err(|e| SearchError::Backend(format!("Failed to reload reader: {}", e)))?;
        Ok(())
    }

    /// Clear the entire index (test/setup tooling)
    pub async fn clear(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer
            .delete_all_documents()
            .map_err(|e| SearchError::Backend(format!("Failed to clear index: {}", e)))?;
        self.commit_locked(&mut writer)
    }

    /// Execute a structured query, returning the requested page of documents
    /// and the total server-side match count
    pub async fn search(&self, query: &Query) -> SearchResult<(Vec<AnnotationDocument>, usize)> {
        let tantivy_query = self.lower_query(query)?;
        let searcher = self.reader.searcher();

        let total = searcher
            .search(&*tantivy_query, &Count)
            .map_err(|e| SearchError::Backend(format!("Count failed: {}", e)))?;

        let addresses = self.collect_page(&searcher, &*tantivy_query, query)?;

        let mut rows = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| SearchError::Backend(format!("Failed to retrieve doc: {}", e)))?;
            rows.push(AnnotationDocument::from_tantivy_doc(&self.schema, &doc)?);
        }

        Ok((rows, total))
    }

    fn collect_page(
        &self,
        searcher: &tantivy::Searcher,
        tantivy_query: &dyn TantivyQuery,
        query: &Query,
    ) -> SearchResult<Vec<DocAddress>> {
        let collector = TopDocs::with_limit(query.limit).and_offset(query.offset);
        let map_err = |e: tantivy::TantivyError| {
            SearchError::Backend(format!("Search execution failed: {}", e))
        };

        let addresses = match &query.sort {
            SearchSort::Relevance => searcher
                .search(tantivy_query, &collector)
                .map_err(map_err)?
                .into_iter()
                .map(|(_score, address)| address)
                .collect(),
            SearchSort::Created(order) => searcher
                .search(
                    tantivy_query,
                    &collector.order_by_fast_field::<tantivy::DateTime>("created", lower_order(order)),
                )
                .map_err(map_err)?
                .into_iter()
                .map(|(_value, address)| address)
                .collect(),
            SearchSort::Updated(order) => searcher
                .search(
                    tantivy_query,
                    &collector.order_by_fast_field::<tantivy::DateTime>("updated", lower_order(order)),
                )
                .map_err(map_err)?
                .into_iter()
                .map(|(_value, address)| address)
                .collect(),
        };

        Ok(addresses)
    }

    /// Lower a structured query into a Tantivy query tree: filters are
    /// AND-combined, the matcher group is OR-combined and conjoined with the
    /// filters.
    fn lower_query(&self, query: &Query) -> SearchResult<Box<dyn TantivyQuery>> {
        let mut subqueries: Vec<(Occur, Box<dyn TantivyQuery>)> = Vec::new();

        for clause in &query.filters {
            subqueries.push((Occur::Must, self.lower_clause(clause)?));
        }

        if !query.matchers.is_empty() {
            let group = query
                .matchers
                .iter()
                .map(|clause| Ok((Occur::Should, self.lower_clause(clause)?)))
                .collect::<SearchResult<Vec<_>>>()?;
            subqueries.push((Occur::Must, Box::new(BooleanQuery::new(group))));
        }

        if subqueries.is_empty() {
            Ok(Box::new(AllQuery))
        } else {
            Ok(Box::new(BooleanQuery::new(subqueries)))
        }
    }

    fn lower_clause(&self, clause: &Clause) -> SearchResult<Box<dyn TantivyQuery>> {
        match clause {
            Clause::Term { field, value } => Ok(Box::new(TermQuery::new(
                Term::from_field_text(self.field(field)?, value),
                IndexRecordOption::Basic,
            ))),
            Clause::AnyTerm { field, values } => {
                self.any_term_query(self.field(field)?, values.iter())
            }
            Clause::FullText { query } => {
                let parser = QueryParser::for_index(
                    &self.index,
                    vec![self.field("text")?, self.field("tags")?],
                );
                Ok(parser.parse_query(query)?)
            }
            Clause::FieldText { field, query } => {
                let parser = QueryParser::for_index(&self.index, vec![self.field(field)?]);
                Ok(parser.parse_query(query)?)
            }
            Clause::TopLevelOnly => Ok(Box::new(TermQuery::new(
                Term::from_field_text(self.field("is_reply")?, "false"),
                IndexRecordOption::Basic,
            ))),
            Clause::ParentIn { ids } => self.any_term_query(self.field("parent")?, ids.iter()),
            Clause::AnyOf { clauses } => {
                let subqueries = clauses
                    .iter()
                    .map(|clause| Ok((Occur::Should, self.lower_clause(clause)?)))
                    .collect::<SearchResult<Vec<_>>>()?;
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }
        }
    }

    fn any_term_query<'a>(
        &self,
        field: Field,
        values: impl Iterator<Item = &'a String>,
    ) -> SearchResult<Box<dyn TantivyQuery>> {
        let subqueries: Vec<(Occur, Box<dyn TantivyQuery>)> = values
            .map(|value| {
                (
                    Occur::Should,
                    Box::new(TermQuery::new(
                        Term::from_field_text(field, value),
                        IndexRecordOption::Basic,
                    )) as Box<dyn TantivyQuery>,
                )
            })
            .collect();

        // No candidate values must match nothing, not everything
        if subqueries.is_empty() {
            return Ok(Box::new(EmptyQuery));
        }
        Ok(Box::new(BooleanQuery::new(subqueries)))
    }

    /// Get index statistics
    pub async fn stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        let index_size_bytes = std::fs::read_dir(&self.config.index_path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents: searcher.num_docs(),
            num_segments: searcher.segment_readers().len(),
            index_size_bytes,
        })
    }
}

fn lower_order(order: &SortOrder) -> Order {
    match order {
        SortOrder::Ascending => Order::Asc,
        SortOrder::Descending => Order::Desc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Annotation;
    use tempfile::TempDir;

    async fn create_test_manager() -> (IndexManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        (IndexManager::new(config).await.unwrap(), temp_dir)
    }

    fn test_document(id: &str) -> AnnotationDocument {
        AnnotationDocument::from(Annotation::new(
            id,
            "https://example.com/article",
            "an observation",
            "__world__",
            "acct:jane@example.com",
        ))
    }

    #[tokio::test]
    async fn test_index_creation() {
        let (manager, _dir) = create_test_manager().await;
        let stats = manager.stats().await.unwrap();
        assert_eq!(stats.total_documents, 0);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (manager, _dir) = create_test_manager().await;

        let mut document = test_document("ann-1");
        manager.upsert_document(&document).await.unwrap();

        document.text = "revised observation".to_string();
        manager.upsert_document(&document).await.unwrap();

        let stats = manager.stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);

        let query = Query {
            filters: vec![],
            matchers: vec![],
            offset: 0,
            limit: 10,
            sort: SearchSort::default(),
        };
        let (rows, total) = manager.search(&query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].text, "revised observation");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let (manager, _dir) = create_test_manager().await;
        manager.delete_document("never-indexed").await.unwrap();
        assert_eq!(manager.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_term_clause_search() {
        let (manager, _dir) = create_test_manager().await;
        manager.upsert_document(&test_document("ann-1")).await.unwrap();

        let mut other = test_document("ann-2");
        other.group = "biology".to_string();
        manager.upsert_document(&other).await.unwrap();

        let query = Query {
            filters: vec![Clause::Term {
                field: "group".to_string(),
                value: "biology".to_string(),
            }],
            matchers: vec![],
            offset: 0,
            limit: 10,
            sort: SearchSort::default(),
        };
        let (rows, total) = manager.search(&query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "ann-2");
    }

    #[tokio::test]
    async fn test_empty_parent_in_matches_nothing() {
        let (manager, _dir) = create_test_manager().await;
        manager.upsert_document(&test_document("ann-1")).await.unwrap();

        let query = Query {
            filters: vec![],
            matchers: vec![Clause::ParentIn { ids: vec![] }],
            offset: 0,
            limit: 10,
            sort: SearchSort::default(),
        };
        let (rows, total) = manager.search(&query).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }
}
