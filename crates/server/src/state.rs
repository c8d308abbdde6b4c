use rustflix_catalog::Catalog;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}
