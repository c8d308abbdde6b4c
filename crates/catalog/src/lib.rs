pub mod engine;
pub mod memory;
pub mod store;

pub use engine::{Catalog, QueryPage, DEFAULT_SUGGESTION_LIMIT};
pub use memory::MemoryStore;
pub use store::{CatalogStore, ScalarConditions, StoreError};
