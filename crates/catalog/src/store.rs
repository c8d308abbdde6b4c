use async_trait::async_trait;

use rustflix_core::filter::{FilterSpec, TypeFilter, YearFilter};
use rustflix_core::model::{
    CatalogEntry, Episode, NewCatalogEntry, NewEpisode, NewServerSource, ServerSource,
};

/// Storage backend failure, reported to clients as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Backend(String),
}

/// The scalar filter dimensions a backend can evaluate row by row.
///
/// Array-field matching (genre/country), ordering, and pagination are
/// deliberately *not* part of this contract; the query engine applies them
/// over the returned set so `total` and `pages` always reflect the fully
/// filtered catalog regardless of backend capabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarConditions {
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
    pub kind: TypeFilter,
    pub year: Option<YearFilter>,
}

impl From<&FilterSpec> for ScalarConditions {
    fn from(spec: &FilterSpec) -> Self {
        Self {
            search: spec.search.clone(),
            kind: spec.kind,
            year: spec.year,
        }
    }
}

impl ScalarConditions {
    /// Reference predicate for the scalar contract. Backends that evaluate
    /// conditions natively (SQL) must agree with this.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(needle) = &self.search {
            if !entry
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if !self.kind.matches(entry.kind) {
            return false;
        }
        if let Some(year) = self.year {
            if !year.matches(entry.year) {
                return false;
            }
        }
        true
    }
}

/// Durable table of catalog entries plus their episodes and servers.
///
/// Implementations must return listings in ascending id order; the engine
/// relies on that for deterministic tie-breaking.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_where(&self, cond: &ScalarConditions) -> Result<Vec<CatalogEntry>, StoreError>;
    async fn get(&self, id: i64) -> Result<Option<CatalogEntry>, StoreError>;
    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, StoreError>;
    /// Full-record replace; last write wins. `None` when the id is unknown.
    async fn replace(
        &self,
        id: i64,
        entry: NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, StoreError>;
    /// Delete an entry, cascading to its episodes and servers.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Episodes ordered by (season, episode).
    async fn episodes_for(&self, movie_id: i64) -> Result<Vec<Episode>, StoreError>;
    async fn insert_episode(
        &self,
        movie_id: i64,
        episode: NewEpisode,
    ) -> Result<Episode, StoreError>;

    /// Servers ordered by id.
    async fn servers_for(&self, movie_id: i64) -> Result<Vec<ServerSource>, StoreError>;
    async fn insert_server(
        &self,
        movie_id: i64,
        server: NewServerSource,
    ) -> Result<ServerSource, StoreError>;
    async fn update_server(
        &self,
        id: i64,
        server: NewServerSource,
    ) -> Result<Option<ServerSource>, StoreError>;
    async fn delete_server(&self, id: i64) -> Result<bool, StoreError>;
}
