use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use rustflix_core::filter::FilterSpec;
use rustflix_core::model::CatalogEntry;
use rustflix_core::types::SortMode;

use crate::store::{CatalogStore, ScalarConditions, StoreError};

/// Default number of entries returned by [`Catalog::suggestions`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 6;

/// One page of query results plus the totals for the fully filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage {
    pub entries: Vec<CatalogEntry>,
    pub total: i64,
    pub pages: i64,
}

/// The catalog query engine.
///
/// Scalar filters (search/type/year) are delegated to the store; genre and
/// country membership, ordering, and pagination happen here, over the full
/// candidate set, so `total` and `pages` are computed before any slicing.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    suggestion_limit: usize,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Select, order, and paginate the entries matching `spec`.
    pub async fn query(&self, spec: &FilterSpec) -> Result<QueryPage, StoreError> {
        let cond = ScalarConditions::from(spec);
        let mut entries = self.store.list_where(&cond).await?;

        // Array-field filters apply before pagination and before `total`.
        if let Some(genre) = &spec.genre {
            entries.retain(|e| list_contains(&e.genres, genre));
        }
        if let Some(country) = &spec.country {
            entries.retain(|e| list_contains(&e.countries, country));
        }

        let total = entries.len() as i64;
        sort_entries(&mut entries, spec.sort);

        let offset = spec.offset().max(0) as usize;
        let page: Vec<CatalogEntry> = entries
            .into_iter()
            .skip(offset)
            .take(spec.limit as usize)
            .collect();

        Ok(QueryPage {
            entries: page,
            total,
            pages: page_count(total, spec.limit),
        })
    }

    /// The entry promoted to the home-page hero slot: `featured = true`,
    /// highest rating when several are flagged.
    pub async fn featured(&self) -> Result<Option<CatalogEntry>, StoreError> {
        let mut entries = self.store.list_where(&ScalarConditions::default()).await?;
        entries.retain(|e| e.featured);
        sort_entries(&mut entries, SortMode::Rating);
        Ok(entries.into_iter().next())
    }

    /// Top entries by rating, irrespective of filters.
    pub async fn suggestions(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut entries = self.store.list_where(&ScalarConditions::default()).await?;
        sort_entries(&mut entries, SortMode::Rating);
        entries.truncate(self.suggestion_limit);
        Ok(entries)
    }
}

/// Case-insensitive membership test for genre/country lists. Uses the same
/// Unicode case folding as the title search.
fn list_contains(values: &[String], wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    values.iter().any(|v| v.to_lowercase() == wanted)
}

/// `pages = ceil(total / limit)`, with 0 pages for an empty result set.
fn page_count(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

/// Total order for each sort mode; ties always break by ascending id.
fn sort_entries(entries: &mut [CatalogEntry], sort: SortMode) {
    match sort {
        SortMode::Latest => {
            entries.sort_by(|a, b| b.year.cmp(&a.year).then(a.id.cmp(&b.id)));
        }
        // `popular` and `rating` are the same ordering by design.
        SortMode::Popular | SortMode::Rating => {
            entries.sort_by(|a, b| cmp_rating_desc(a, b).then(a.id.cmp(&b.id)));
        }
        SortMode::Title => {
            entries.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        }
    }
}

/// Rating descending; entries without a rating sort last.
fn cmp_rating_desc(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    match (a.rating, b.rating) {
        (Some(ra), Some(rb)) => rb.partial_cmp(&ra).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
