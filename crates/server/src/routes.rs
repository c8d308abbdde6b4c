use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use rustflix_catalog::StoreError;
use rustflix_core::error::ApiError;
use rustflix_core::filter::{FilterSpec, RawFilters};
use rustflix_core::model::{
    CatalogEntry, Episode, NewCatalogEntry, NewEpisode, NewServerSource, ServerSource,
};
use rustflix_core::types::MediaKind;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        // Catalog listing + derived queries
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/featured", get(get_featured))
        .route("/movies/suggestions", get(get_suggestions))
        .route(
            "/movies/{id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        // Episodes (TV series only)
        .route(
            "/movies/{id}/episodes",
            get(list_episodes).post(create_episode),
        )
        // Playback servers
        .route(
            "/movies/{id}/servers",
            get(list_servers).post(create_server),
        )
        .route(
            "/servers/{id}",
            axum::routing::put(update_server).delete(delete_server),
        )
}

/// Store failures surface as a generic 500; the detail only goes to the log.
fn store_err(e: StoreError) -> AppError {
    tracing::error!(error = %e, "catalog store failure");
    ApiError::Internal("storage failure".into()).into()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    // Cheap store round-trip as a liveness probe.
    state.catalog.store().get(0).await.map_err(store_err)?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Catalog listing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MoviesResponse {
    movies: Vec<CatalogEntry>,
    total: i64,
    pages: i64,
}

async fn list_movies(
    State(state): State<AppState>,
    Query(raw): Query<RawFilters>,
) -> Result<Json<MoviesResponse>, AppError> {
    let spec = FilterSpec::from_raw(raw)?;
    let page = state.catalog.query(&spec).await.map_err(store_err)?;
    Ok(Json(MoviesResponse {
        movies: page.entries,
        total: page.total,
        pages: page.pages,
    }))
}

async fn get_featured(
    State(state): State<AppState>,
) -> Result<Json<CatalogEntry>, AppError> {
    let entry = state
        .catalog
        .featured()
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("no featured movie".into()))?;
    Ok(Json(entry))
}

async fn get_suggestions(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let entries = state.catalog.suggestions().await.map_err(store_err)?;
    Ok(Json(entries))
}

// ---------------------------------------------------------------------------
// Catalog CRUD
// ---------------------------------------------------------------------------

async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CatalogEntry>, AppError> {
    let entry = state
        .catalog
        .store()
        .get(id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("movie not found".into()))?;
    Ok(Json(entry))
}

async fn create_movie(
    State(state): State<AppState>,
    Json(body): Json<NewCatalogEntry>,
) -> Result<(axum::http::StatusCode, Json<CatalogEntry>), AppError> {
    body.validate()?;
    let entry = state
        .catalog
        .store()
        .insert(body)
        .await
        .map_err(store_err)?;
    tracing::info!(id = entry.id, title = %entry.title, "movie created");
    Ok((axum::http::StatusCode::CREATED, Json(entry)))
}

async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewCatalogEntry>,
) -> Result<Json<CatalogEntry>, AppError> {
    body.validate()?;
    let entry = state
        .catalog
        .store()
        .replace(id, body)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("movie not found".into()))?;
    Ok(Json(entry))
}

async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    let deleted = state.catalog.store().delete(id).await.map_err(store_err)?;
    if !deleted {
        return Err(ApiError::NotFound("movie not found".into()).into());
    }
    tracing::info!(id, "movie deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

/// Episodes only exist on TV series; 404 for unknown ids, 400 for movies.
async fn require_tv_entry(state: &AppState, id: i64) -> Result<CatalogEntry, AppError> {
    let entry = state
        .catalog
        .store()
        .get(id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("movie not found".into()))?;
    if entry.kind != MediaKind::Tv {
        return Err(ApiError::BadRequest("not a TV series".into()).into());
    }
    Ok(entry)
}

async fn list_episodes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Episode>>, AppError> {
    require_tv_entry(&state, id).await?;
    let episodes = state
        .catalog
        .store()
        .episodes_for(id)
        .await
        .map_err(store_err)?;
    Ok(Json(episodes))
}

async fn create_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewEpisode>,
) -> Result<(axum::http::StatusCode, Json<Episode>), AppError> {
    require_tv_entry(&state, id).await?;
    body.validate()?;
    let episode = state
        .catalog
        .store()
        .insert_episode(id, body)
        .await
        .map_err(store_err)?;
    Ok((axum::http::StatusCode::CREATED, Json(episode)))
}

// ---------------------------------------------------------------------------
// Playback servers
// ---------------------------------------------------------------------------

async fn require_entry(state: &AppState, id: i64) -> Result<CatalogEntry, AppError> {
    state
        .catalog
        .store()
        .get(id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("movie not found".into()).into())
}

async fn list_servers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ServerSource>>, AppError> {
    require_entry(&state, id).await?;
    let servers = state
        .catalog
        .store()
        .servers_for(id)
        .await
        .map_err(store_err)?;
    Ok(Json(servers))
}

async fn create_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewServerSource>,
) -> Result<(axum::http::StatusCode, Json<ServerSource>), AppError> {
    require_entry(&state, id).await?;
    body.validate()?;
    let server = state
        .catalog
        .store()
        .insert_server(id, body)
        .await
        .map_err(store_err)?;
    Ok((axum::http::StatusCode::CREATED, Json(server)))
}

async fn update_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewServerSource>,
) -> Result<Json<ServerSource>, AppError> {
    body.validate()?;
    let server = state
        .catalog
        .store()
        .update_server(id, body)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound("server not found".into()))?;
    Ok(Json(server))
}

async fn delete_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    let deleted = state
        .catalog
        .store()
        .delete_server(id)
        .await
        .map_err(store_err)?;
    if !deleted {
        return Err(ApiError::NotFound("server not found".into()).into());
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}
