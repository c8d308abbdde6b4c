use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use rustflix_core::model::{
    CatalogEntry, Episode, NewCatalogEntry, NewEpisode, NewServerSource, ServerSource,
};

use crate::store::{CatalogStore, ScalarConditions, StoreError};

/// In-memory catalog store: process-wide maps with an incrementing id
/// counter. Used in tests and as a zero-setup backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    movies: BTreeMap<i64, CatalogEntry>,
    episodes: BTreeMap<i64, Episode>,
    servers: BTreeMap<i64, ServerSource>,
    next_movie_id: i64,
    next_episode_id: i64,
    next_server_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_where(&self, cond: &ScalarConditions) -> Result<Vec<CatalogEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        // BTreeMap iteration gives ascending id order.
        Ok(inner
            .movies
            .values()
            .filter(|e| cond.matches(e))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<CatalogEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.movies.get(&id).cloned())
    }

    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_movie_id += 1;
        let id = inner.next_movie_id;
        let entry = entry.into_entry(id);
        inner.movies.insert(id, entry.clone());
        Ok(entry)
    }

    async fn replace(
        &self,
        id: i64,
        entry: NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.movies.contains_key(&id) {
            return Ok(None);
        }
        let entry = entry.into_entry(id);
        inner.movies.insert(id, entry.clone());
        Ok(Some(entry))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.movies.remove(&id).is_none() {
            return Ok(false);
        }
        inner.episodes.retain(|_, e| e.movie_id != id);
        inner.servers.retain(|_, s| s.movie_id != id);
        Ok(true)
    }

    async fn episodes_for(&self, movie_id: i64) -> Result<Vec<Episode>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut episodes: Vec<Episode> = inner
            .episodes
            .values()
            .filter(|e| e.movie_id == movie_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|e| (e.season, e.episode));
        Ok(episodes)
    }

    async fn insert_episode(
        &self,
        movie_id: i64,
        episode: NewEpisode,
    ) -> Result<Episode, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_episode_id += 1;
        let id = inner.next_episode_id;
        let episode = Episode {
            id,
            movie_id,
            season: episode.season,
            episode: episode.episode,
            title: episode.title,
            description: episode.description,
            duration: episode.duration,
        };
        inner.episodes.insert(id, episode.clone());
        Ok(episode)
    }

    async fn servers_for(&self, movie_id: i64) -> Result<Vec<ServerSource>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .servers
            .values()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn insert_server(
        &self,
        movie_id: i64,
        server: NewServerSource,
    ) -> Result<ServerSource, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_server_id += 1;
        let id = inner.next_server_id;
        let server = ServerSource {
            id,
            movie_id,
            name: server.name,
            url: server.url,
            kind: server.kind,
            quality: server.quality,
        };
        inner.servers.insert(id, server.clone());
        Ok(server)
    }

    async fn update_server(
        &self,
        id: i64,
        server: NewServerSource,
    ) -> Result<Option<ServerSource>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(existing) = inner.servers.get(&id) else {
            return Ok(None);
        };
        let updated = ServerSource {
            id,
            movie_id: existing.movie_id,
            name: server.name,
            url: server.url,
            kind: server.kind,
            quality: server.quality,
        };
        inner.servers.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_server(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.servers.remove(&id).is_some())
    }
}
