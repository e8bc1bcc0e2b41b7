//! Search service
//!
//! Entry points for the transport layer. Each operation:
//! - resolves the requester through the request context (roles memoized)
//! - composes a visibility-restricted query
//! - runs it through the gateway and decodes the result

use crate::error::Result;
use crate::gateway::SearchGateway;
use crate::index::{Hit, IndexClient};
use crate::roles::RequestContext;
use sm_query::aggregation::{
    build_aggregation, decode_grouped_counts, decode_value_counts, field_counts_aggregation,
    per_dataset_aggregation, ungrouped_count, FIELD_COUNTS_AGG, PER_DATASET_AGG,
};
use sm_query::{
    AnnotationFilter, Clause, ComposedQuery, DatasetFilter, DocType, FlattenedCount,
    GroupingField, Page, QueryArgs, QueryComposer,
};
use std::collections::BTreeMap;

pub struct SearchService<C> {
    gateway: SearchGateway<C>,
    composer: QueryComposer,
    default_limit: u64,
}

impl<C: IndexClient> SearchService<C> {
    pub fn new(gateway: SearchGateway<C>, composer: QueryComposer, default_limit: u64) -> Self {
        Self {
            gateway,
            composer,
            default_limit,
        }
    }

    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    /// Matching documents, one page.
    pub async fn search(
        &self,
        args: &QueryArgs,
        doc_type: DocType,
        ctx: &RequestContext,
    ) -> Result<Vec<Hit>> {
        // Reject a bad page before resolving roles or touching the index.
        let mut page = args.page()?;
        let requester = ctx.requester().await?;
        let query = self.composer.compose(args, doc_type, &requester)?;

        page.limit = Some(page.limit.unwrap_or(self.default_limit));
        tracing::debug!(doc_type = doc_type.as_str(), "search");
        self.gateway.search(&query, page).await
    }

    /// Number of matching documents.
    pub async fn count(
        &self,
        args: &QueryArgs,
        doc_type: DocType,
        ctx: &RequestContext,
    ) -> Result<u64> {
        let requester = ctx.requester().await?;
        let query = self.composer.compose(args, doc_type, &requester)?;
        tracing::debug!(doc_type = doc_type.as_str(), "count");
        self.gateway.count(&query).await
    }

    /// Matching documents counted per combination of `fields` values.
    ///
    /// With no fields this is a plain count returned as a single row with
    /// no field values.
    pub async fn count_grouped(
        &self,
        args: &QueryArgs,
        doc_type: DocType,
        fields: &[GroupingField],
        ctx: &RequestContext,
    ) -> Result<Vec<FlattenedCount>> {
        let Some(aggs) = build_aggregation(fields) else {
            return Ok(ungrouped_count(self.count(args, doc_type, ctx).await?));
        };

        let requester = ctx.requester().await?;
        let query = self.composer.compose(args, doc_type, &requester)?;
        tracing::debug!(doc_type = doc_type.as_str(), ?fields, "count_grouped");
        let aggregations = self.gateway.aggregate(&query, aggs).await?;
        Ok(decode_grouped_counts(fields, &aggregations)?)
    }

    /// Matching annotations counted per dataset id.
    pub async fn count_per_dataset(
        &self,
        args: &QueryArgs,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, u64>> {
        let requester = ctx.requester().await?;
        let query = self
            .composer
            .compose(args, DocType::Annotation, &requester)?;
        tracing::debug!("count_per_dataset");
        let aggregations = self
            .gateway
            .aggregate(&query, per_dataset_aggregation())
            .await?;
        Ok(decode_value_counts(&aggregations, PER_DATASET_AGG)?)
    }

    /// Value -> count for one field over visible documents matching
    /// `extra_filters`.
    pub async fn filter_value_counts(
        &self,
        field: GroupingField,
        extra_filters: Vec<Clause>,
        doc_type: DocType,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, u64>> {
        let requester = ctx.requester().await?;
        let query = self
            .composer
            .compose_with_clauses(doc_type, &requester, extra_filters)?;
        tracing::debug!(doc_type = doc_type.as_str(), %field, "filter_value_counts");
        let aggregations = self
            .gateway
            .aggregate(&query, field_counts_aggregation(field))
            .await?;
        Ok(decode_value_counts(&aggregations, FIELD_COUNTS_AGG)?)
    }

    /// The annotation with this id, if the requester may see it.
    pub async fn annotation_by_id(&self, id: &str, ctx: &RequestContext) -> Result<Option<Hit>> {
        if id.is_empty() {
            return Ok(None);
        }
        let args = QueryArgs {
            filter: Some(AnnotationFilter::by_id(id)),
            ..QueryArgs::default()
        };
        let requester = ctx.requester().await?;
        let query = self
            .composer
            .compose(&args, DocType::Annotation, &requester)?;
        self.first_hit(query).await
    }

    /// The dataset with this id, if the requester may see it.
    pub async fn dataset_by_id(&self, id: &str, ctx: &RequestContext) -> Result<Option<Hit>> {
        if id.is_empty() {
            return Ok(None);
        }
        let requester = ctx.requester().await?;
        let query = self
            .composer
            .compose(&Self::dataset_id_args(id), DocType::Dataset, &requester)?;
        self.first_hit(query).await
    }

    /// The dataset with this id, ignoring visibility.
    ///
    /// Privileged: for internal lookups (e.g. resolving a dataset owner
    /// before an authorization decision). Never return the result to an
    /// untrusted caller unchecked.
    pub async fn dataset_by_id_privileged(&self, id: &str) -> Result<Option<Hit>> {
        if id.is_empty() {
            return Ok(None);
        }
        let query = self
            .composer
            .compose_privileged(&Self::dataset_id_args(id), DocType::Dataset)?;
        tracing::debug!(dataset_id = id, "privileged dataset lookup");
        self.first_hit(query).await
    }

    fn dataset_id_args(id: &str) -> QueryArgs {
        QueryArgs {
            dataset_filter: Some(DatasetFilter::by_id(id)),
            ..QueryArgs::default()
        }
    }

    async fn first_hit(&self, query: ComposedQuery) -> Result<Option<Hit>> {
        let hits = self.gateway.search(&query, Page::first()).await?;
        Ok(hits.into_iter().next())
    }
}
