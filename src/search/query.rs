//! Query building: structured clauses, filter/matcher primitives, and the
//! builder that composes them
//!
//! Filters contribute conjunctive (AND) constraints, matchers contribute
//! disjunctive (OR) constraints; the matcher group as a whole is conjoined
//! with the filter group. Clause order follows append order so that built
//! queries are reproducible.

use crate::search::params::{RequestContext, SearchParams, SearchSort};
use serde::Serialize;
use std::sync::Arc;

/// One structured clause contributed by a filter or matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Exact value on a keyword field
    Term { field: String, value: String },

    /// Any of the given values on a keyword field
    AnyTerm { field: String, values: Vec<String> },

    /// Free-text match across all indexed text fields
    FullText { query: String },

    /// Free-text match against a single field
    FieldText { field: String, query: String },

    /// Only documents without a parent reference
    TopLevelOnly,

    /// Documents whose parent reference is one of the given ids
    ParentIn { ids: Vec<String> },

    /// At least one of the nested clauses holds
    AnyOf { clauses: Vec<Clause> },
}

impl Clause {
    fn term(field: &str, value: impl Into<String>) -> Self {
        Clause::Term {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// The structured query document rendered by [`Builder::build`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Conjunctive constraints, in append order
    pub filters: Vec<Clause>,

    /// Disjunctive constraints, in append order
    pub matchers: Vec<Clause>,

    /// Offset for pagination
    pub offset: usize,

    /// Number of results to return
    pub limit: usize,

    /// Sorting criteria
    pub sort: SearchSort,
}

/// A query fragment contributes at most one clause to a query under
/// construction. Fragments needing per-request context (identity, seeded
/// parent ids) receive it at construction time, not at contribute time.
pub trait QueryFragment: Send + Sync {
    /// Produce this fragment's clause for the given request parameters.
    /// `None` means the fragment has nothing to contribute.
    fn clause(&self, params: &SearchParams) -> Option<Clause>;
}

/// Restricts results to documents visible to the requesting identity.
///
/// With `private` set and an authenticated identity, the requester's own
/// private documents are included alongside public ones; otherwise only
/// public documents match. Another identity's private documents never match.
pub struct AuthFilter {
    userid: Option<String>,
    private: bool,
}

impl AuthFilter {
    pub fn new(userid: Option<String>, private: bool) -> Self {
        Self { userid, private }
    }
}

impl QueryFragment for AuthFilter {
    fn clause(&self, _params: &SearchParams) -> Option<Clause> {
        match (&self.userid, self.private) {
            (Some(userid), true) => Some(Clause::AnyOf {
                clauses: vec![
                    Clause::term("visibility", "public"),
                    Clause::term("user", userid.clone()),
                ],
            }),
            _ => Some(Clause::term("visibility", "public")),
        }
    }
}

/// Restricts results to documents targeting any of the requested URIs
pub struct UriFilter;

impl QueryFragment for UriFilter {
    fn clause(&self, params: &SearchParams) -> Option<Clause> {
        if params.uris.is_empty() {
            return None;
        }
        Some(Clause::AnyTerm {
            field: "uri".to_string(),
            values: params.uris.clone(),
        })
    }
}

/// Restricts results to documents in the requested group
pub struct GroupFilter;

impl QueryFragment for GroupFilter {
    fn clause(&self, params: &SearchParams) -> Option<Clause> {
        params
            .group
            .as_ref()
            .map(|group| Clause::term("group", group.clone()))
    }
}

/// Excludes replies, leaving only top-level annotations
pub struct TopLevelAnnotationsFilter;

impl QueryFragment for TopLevelAnnotationsFilter {
    fn clause(&self, _params: &SearchParams) -> Option<Clause> {
        Some(Clause::TopLevelOnly)
    }
}

/// Free-text match across all indexed text fields
pub struct AnyMatcher;

impl QueryFragment for AnyMatcher {
    fn clause(&self, params: &SearchParams) -> Option<Clause> {
        match params.query.as_deref() {
            Some(query) if !query.trim().is_empty() => Some(Clause::FullText {
                query: query.to_string(),
            }),
            _ => None,
        }
    }
}

/// Match against the tags field
pub struct TagsMatcher;

impl QueryFragment for TagsMatcher {
    fn clause(&self, params: &SearchParams) -> Option<Clause> {
        if params.tags.is_empty() {
            return None;
        }
        Some(Clause::FieldText {
            field: "tags".to_string(),
            query: params.tags.join(" "),
        })
    }
}

/// Matches documents replying to any of the seeded parent ids.
///
/// Constructed fresh for each reply fetch with the ids of that request's
/// phase-1 results. Always contributes a clause: with no seeded ids the
/// clause matches nothing, so an empty result page yields no replies rather
/// than every visible document.
pub struct RepliesMatcher {
    parent_ids: Vec<String>,
}

impl RepliesMatcher {
    pub fn new(parent_ids: Vec<String>) -> Self {
        Self { parent_ids }
    }
}

impl QueryFragment for RepliesMatcher {
    fn clause(&self, _params: &SearchParams) -> Option<Clause> {
        Some(Clause::ParentIn {
            ids: self.parent_ids.clone(),
        })
    }
}

/// Builder composing an ordered set of filters and matchers into a [`Query`]
#[derive(Default)]
pub struct Builder {
    filters: Vec<Box<dyn QueryFragment>>,
    matchers: Vec<Box<dyn QueryFragment>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Appending twice contributes twice; callers must not
    /// double-register.
    pub fn append_filter<F: QueryFragment + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    /// Append an already-boxed filter (extension factories produce these)
    pub fn append_boxed_filter(&mut self, filter: Box<dyn QueryFragment>) {
        self.filters.push(filter);
    }

    /// Append a matcher
    pub fn append_matcher<M: QueryFragment + 'static>(&mut self, matcher: M) {
        self.matchers.push(Box::new(matcher));
    }

    /// Append an already-boxed matcher
    pub fn append_boxed_matcher(&mut self, matcher: Box<dyn QueryFragment>) {
        self.matchers.push(matcher);
    }

    /// Render the final structured query: every filter then every matcher is
    /// asked to contribute, in append order. Does not mutate `params` or the
    /// builder, so the same builder may be reused across builds.
    pub fn build(&self, params: &SearchParams) -> Query {
        Query {
            filters: self
                .filters
                .iter()
                .filter_map(|f| f.clause(params))
                .collect(),
            matchers: self
                .matchers
                .iter()
                .filter_map(|m| m.clause(params))
                .collect(),
            offset: params.offset,
            limit: params.limit,
            sort: params.sort.clone(),
        }
    }
}

/// Factory producing a query fragment for a given request
pub type FragmentFactory = Arc<dyn Fn(&RequestContext) -> Box<dyn QueryFragment> + Send + Sync>;

/// Extra filter and matcher factories applied after the built-in primitives,
/// in registration order. Constructed once at startup and passed into the
/// search service.
#[derive(Clone, Default)]
pub struct SearchExtensions {
    filters: Vec<FragmentFactory>,
    matchers: Vec<FragmentFactory>,
}

impl SearchExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_filter<F>(&mut self, factory: F)
    where
        F: Fn(&RequestContext) -> Box<dyn QueryFragment> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(factory));
    }

    pub fn register_matcher<F>(&mut self, factory: F)
    where
        F: Fn(&RequestContext) -> Box<dyn QueryFragment> + Send + Sync + 'static,
    {
        self.matchers.push(Arc::new(factory));
    }

    pub(crate) fn filters(&self) -> &[FragmentFactory] {
        &self.filters
    }

    pub(crate) fn matchers(&self) -> &[FragmentFactory] {
        &self.matchers
    }
}
