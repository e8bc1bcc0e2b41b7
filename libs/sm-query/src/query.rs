//! Query composition.
//!
//! Combines the document type discriminator, the requester's visibility
//! clause, dataset filters, annotation filters and free text into a single
//! AND-combined filter list, plus an optional sort.
//!
//! Clause order is fixed: type, visibility, dataset filters, annotation
//! filters, free text. Order does not change what matches but keeps composed
//! queries comparable.

use crate::auth::Requester;
use crate::clause::Clause;
use crate::error::Result;
use crate::fields;
use crate::filters::{simple_query_filter, AnnotationFilter, DatasetFilter};
use crate::pagination::Page;
use crate::sort::{resolve_sort, OrderBy, SortSpec, SortingOrder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The two document kinds held by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Dataset,
    Annotation,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Annotation => "annotation",
        }
    }
}

/// Sort, filter, pagination and free text arguments of a search request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryArgs {
    pub order_by: Option<OrderBy>,
    pub sorting_order: Option<SortingOrder>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub filter: Option<AnnotationFilter>,
    pub dataset_filter: Option<DatasetFilter>,
    pub simple_query: Option<String>,
}

impl QueryArgs {
    /// Validated paging window.
    pub fn page(&self) -> Result<Page> {
        Page::new(self.offset.unwrap_or(0), self.limit)
    }
}

/// AND-combined filters plus an optional sort.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    must_filters: Vec<Clause>,
    sort: Option<Vec<SortSpec>>,
}

impl ComposedQuery {
    pub fn must_filters(&self) -> &[Clause] {
        &self.must_filters
    }

    pub fn sort(&self) -> Option<&[SortSpec]> {
        self.sort.as_deref()
    }

    /// The `query` section of a request body.
    pub fn query_json(&self) -> Value {
        json!({
            "bool": {
                "filter": self.must_filters.iter().map(Clause::to_json).collect::<Vec<_>>(),
            }
        })
    }

    /// The `sort` section of a request body, if any.
    pub fn sort_json(&self) -> Option<Value> {
        self.sort
            .as_ref()
            .map(|specs| Value::Array(specs.iter().map(SortSpec::to_json).collect()))
    }

    /// Request body with `query` and, when present, `sort`.
    pub fn to_body(&self) -> Value {
        let mut body = json!({ "query": self.query_json() });
        if let Some(sort) = self.sort_json() {
            body["sort"] = sort;
        }
        body
    }
}

/// Builds [`ComposedQuery`] values.
///
/// Holds the configuration the filters depend on; composing is a pure
/// function of that configuration and the call arguments.
#[derive(Debug, Clone, Default)]
pub struct QueryComposer {
    hidden_adducts: Vec<String>,
}

impl QueryComposer {
    pub fn new(hidden_adducts: Vec<String>) -> Self {
        Self { hidden_adducts }
    }

    /// Compose a query restricted to what `requester` may see.
    ///
    /// Fails with `InvalidArgument` when the requested page is above the
    /// ceiling and with `RolesUnavailable` when the requester's project roles
    /// were not resolved.
    pub fn compose(
        &self,
        args: &QueryArgs,
        doc_type: DocType,
        requester: &Requester,
    ) -> Result<ComposedQuery> {
        args.page()?;
        let visibility = requester.visibility_filter()?;
        Ok(self.build(args, doc_type, visibility))
    }

    /// Compose a query WITHOUT the visibility restriction.
    ///
    /// Privileged: only for trusted internal lookups whose result is never
    /// handed to an untrusted caller as-is. Everything else must use
    /// [`QueryComposer::compose`].
    pub fn compose_privileged(&self, args: &QueryArgs, doc_type: DocType) -> Result<ComposedQuery> {
        args.page()?;
        Ok(self.build(args, doc_type, None))
    }

    /// Compose a visibility-restricted query from caller-built clauses.
    ///
    /// Unlike [`QueryComposer::compose`] there is no paging or sort; the
    /// clauses are ANDed after the type and visibility clauses as given.
    pub fn compose_with_clauses(
        &self,
        doc_type: DocType,
        requester: &Requester,
        clauses: Vec<Clause>,
    ) -> Result<ComposedQuery> {
        let visibility = requester.visibility_filter()?;
        Ok(ComposedQuery {
            must_filters: Self::head(doc_type, visibility)
                .into_iter()
                .chain(clauses)
                .collect(),
            sort: None,
        })
    }

    /// Dataset, annotation and free text clauses of `args`, in that order.
    pub fn filter_clauses(&self, args: &QueryArgs) -> Vec<Clause> {
        let mut clauses = Vec::new();
        if let Some(dataset_filter) = &args.dataset_filter {
            clauses.extend(dataset_filter.clauses());
        }
        if let Some(filter) = &args.filter {
            clauses.extend(filter.clauses(&self.hidden_adducts));
        }
        // A blank search box means "no free text constraint".
        if let Some(query) = args.simple_query.as_deref().filter(|q| !q.trim().is_empty()) {
            clauses.push(simple_query_filter(query));
        }
        clauses
    }

    fn head(doc_type: DocType, visibility: Option<Clause>) -> Vec<Clause> {
        let mut head = vec![Clause::term(fields::DOC_TYPE, doc_type.as_str())];
        head.extend(visibility);
        head
    }

    fn build(
        &self,
        args: &QueryArgs,
        doc_type: DocType,
        visibility: Option<Clause>,
    ) -> ComposedQuery {
        let mut must_filters = Self::head(doc_type, visibility);
        must_filters.extend(self.filter_clauses(args));

        let sort = args
            .order_by
            .map(|order_by| resolve_sort(order_by, args.sorting_order))
            .filter(|specs| !specs.is_empty());

        ComposedQuery { must_filters, sort }
    }
}
