use async_trait::async_trait;
use sqlx::SqlitePool;

use rustflix_catalog::store::{CatalogStore, ScalarConditions, StoreError};
use rustflix_core::filter::{OLDER_CUTOFF, TypeFilter, YearFilter};
use rustflix_core::model::{
    CatalogEntry, Episode, NewCatalogEntry, NewEpisode, NewServerSource, ServerSource,
};
use rustflix_core::types::{MediaKind, SourceKind};

/// SQLite-backed [`CatalogStore`]. Genres and countries are persisted as
/// JSON text columns; kind and year conditions are pushed down into the
/// query, title search runs over the fetched rows.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn json_err(e: serde_json::Error) -> StoreError {
    StoreError::Backend(format!("json column error: {e}"))
}

const MOVIE_COLUMNS: &str = "id, title, description, year, duration, kind, genres, countries, \
     quality, poster, rating, backdrop, play_url, trailer_url, embed_url, featured";

type MovieRow = (
    i64,
    String,
    String,
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
);

fn row_to_entry(r: MovieRow) -> Result<CatalogEntry, StoreError> {
    let kind = MediaKind::parse(&r.5)
        .ok_or_else(|| StoreError::Backend(format!("unknown media kind in row: {}", r.5)))?;
    let genres: Vec<String> = serde_json::from_str(&r.6).map_err(json_err)?;
    let countries: Vec<String> = serde_json::from_str(&r.7).map_err(json_err)?;
    Ok(CatalogEntry {
        id: r.0,
        title: r.1,
        description: r.2,
        year: r.3,
        duration: r.4,
        kind,
        genres,
        countries,
        quality: r.8,
        poster: r.9,
        rating: r.10,
        backdrop: r.11,
        play_url: r.12,
        trailer_url: r.13,
        embed_url: r.14,
        featured: r.15,
    })
}

type EpisodeRow = (i64, i64, i64, i64, String, Option<String>, Option<i64>);

fn row_to_episode(r: EpisodeRow) -> Episode {
    Episode {
        id: r.0,
        movie_id: r.1,
        season: r.2,
        episode: r.3,
        title: r.4,
        description: r.5,
        duration: r.6,
    }
}

type ServerRow = (i64, i64, String, Option<String>, String, String);

fn row_to_server(r: ServerRow) -> Result<ServerSource, StoreError> {
    let kind = SourceKind::parse(&r.4)
        .ok_or_else(|| StoreError::Backend(format!("unknown source kind in row: {}", r.4)))?;
    Ok(ServerSource {
        id: r.0,
        movie_id: r.1,
        name: r.2,
        url: r.3,
        kind,
        quality: r.5,
    })
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn list_where(&self, cond: &ScalarConditions) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut sql = format!("SELECT {MOVIE_COLUMNS} FROM movie");
        let mut clauses: Vec<&str> = Vec::new();

        if cond.kind != TypeFilter::All {
            clauses.push("kind = ?");
        }
        match cond.year {
            Some(YearFilter::Exact(_)) => clauses.push("year = ?"),
            Some(YearFilter::Older) => clauses.push("year < ?"),
            None => {}
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query_as::<_, MovieRow>(&sql);
        match cond.kind {
            TypeFilter::Movie => query = query.bind(MediaKind::Movie.as_str()),
            TypeFilter::Tv => query = query.bind(MediaKind::Tv.as_str()),
            TypeFilter::All => {}
        }
        match cond.year {
            Some(YearFilter::Exact(y)) => query = query.bind(y),
            Some(YearFilter::Older) => query = query.bind(OLDER_CUTOFF),
            None => {}
        }

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        let mut entries: Vec<CatalogEntry> =
            rows.into_iter().map(row_to_entry).collect::<Result<_, _>>()?;
        // SQLite's lower() folds ASCII only; the title search runs here with
        // the reference predicate so non-ASCII titles match case-insensitively.
        if cond.search.is_some() {
            entries.retain(|e| cond.matches(e));
        }
        Ok(entries)
    }

    async fn get(&self, id: i64) -> Result<Option<CatalogEntry>, StoreError> {
        let row: Option<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movie WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(row_to_entry).transpose()
    }

    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, StoreError> {
        let genres = serde_json::to_string(&entry.genres).map_err(json_err)?;
        let countries = serde_json::to_string(&entry.countries).map_err(json_err)?;

        let result = sqlx::query(
            "INSERT INTO movie (title, description, year, duration, kind, genres, countries, \
             quality, poster, rating, backdrop, play_url, trailer_url, embed_url, featured) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.year)
        .bind(entry.duration)
        .bind(entry.kind.as_str())
        .bind(&genres)
        .bind(&countries)
        .bind(&entry.quality)
        .bind(&entry.poster)
        .bind(entry.rating)
        .bind(&entry.backdrop)
        .bind(&entry.play_url)
        .bind(&entry.trailer_url)
        .bind(&entry.embed_url)
        .bind(entry.featured)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(entry.into_entry(result.last_insert_rowid()))
    }

    async fn replace(
        &self,
        id: i64,
        entry: NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let genres = serde_json::to_string(&entry.genres).map_err(json_err)?;
        let countries = serde_json::to_string(&entry.countries).map_err(json_err)?;

        let result = sqlx::query(
            "UPDATE movie SET title = ?, description = ?, year = ?, duration = ?, kind = ?, \
             genres = ?, countries = ?, quality = ?, poster = ?, rating = ?, backdrop = ?, \
             play_url = ?, trailer_url = ?, embed_url = ?, featured = ? WHERE id = ?",
        )
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.year)
        .bind(entry.duration)
        .bind(entry.kind.as_str())
        .bind(&genres)
        .bind(&countries)
        .bind(&entry.quality)
        .bind(&entry.poster)
        .bind(entry.rating)
        .bind(&entry.backdrop)
        .bind(&entry.play_url)
        .bind(&entry.trailer_url)
        .bind(&entry.embed_url)
        .bind(entry.featured)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(entry.into_entry(id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        // Foreign keys are on; episode and server rows cascade.
        let result = sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn episodes_for(&self, movie_id: i64) -> Result<Vec<Episode>, StoreError> {
        let rows: Vec<EpisodeRow> = sqlx::query_as(
            "SELECT id, movie_id, season, episode, title, description, duration \
             FROM episode WHERE movie_id = ? ORDER BY season, episode",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(row_to_episode).collect())
    }

    async fn insert_episode(
        &self,
        movie_id: i64,
        episode: NewEpisode,
    ) -> Result<Episode, StoreError> {
        let result = sqlx::query(
            "INSERT INTO episode (movie_id, season, episode, title, description, duration) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(movie_id)
        .bind(episode.season)
        .bind(episode.episode)
        .bind(&episode.title)
        .bind(&episode.description)
        .bind(episode.duration)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Episode {
            id: result.last_insert_rowid(),
            movie_id,
            season: episode.season,
            episode: episode.episode,
            title: episode.title,
            description: episode.description,
            duration: episode.duration,
        })
    }

    async fn servers_for(&self, movie_id: i64) -> Result<Vec<ServerSource>, StoreError> {
        let rows: Vec<ServerRow> = sqlx::query_as(
            "SELECT id, movie_id, name, url, kind, quality \
             FROM server WHERE movie_id = ? ORDER BY id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(row_to_server).collect()
    }

    async fn insert_server(
        &self,
        movie_id: i64,
        server: NewServerSource,
    ) -> Result<ServerSource, StoreError> {
        let result = sqlx::query(
            "INSERT INTO server (movie_id, name, url, kind, quality) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(movie_id)
        .bind(&server.name)
        .bind(&server.url)
        .bind(server.kind.as_str())
        .bind(&server.quality)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(ServerSource {
            id: result.last_insert_rowid(),
            movie_id,
            name: server.name,
            url: server.url,
            kind: server.kind,
            quality: server.quality,
        })
    }

    async fn update_server(
        &self,
        id: i64,
        server: NewServerSource,
    ) -> Result<Option<ServerSource>, StoreError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT movie_id FROM server WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some((movie_id,)) = existing else {
            return Ok(None);
        };

        sqlx::query("UPDATE server SET name = ?, url = ?, kind = ?, quality = ? WHERE id = ?")
            .bind(&server.name)
            .bind(&server.url)
            .bind(server.kind.as_str())
            .bind(&server.quality)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Some(ServerSource {
            id,
            movie_id,
            name: server.name,
            url: server.url,
            kind: server.kind,
            quality: server.quality,
        }))
    }

    async fn delete_server(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM server WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(title: &str, kind: MediaKind, year: i64) -> NewCatalogEntry {
        NewCatalogEntry {
            title: title.into(),
            description: format!("{title} description"),
            year,
            duration: 120,
            kind,
            genres: vec!["Action".into(), "Sci-Fi".into()],
            countries: vec!["United States".into()],
            quality: "HD".into(),
            poster: "https://example.com/poster.jpg".into(),
            rating: Some(8.0),
            backdrop: None,
            play_url: None,
            trailer_url: None,
            embed_url: None,
            featured: false,
        }
    }

    async fn test_store() -> SqliteStore {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = test_store().await;
        let created = store
            .insert(new_entry("The Matrix", MediaKind::Movie, 1999))
            .await
            .unwrap();
        assert!(created.id >= 1);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.genres, vec!["Action", "Sci-Fi"]);
    }

    #[tokio::test]
    async fn scalar_pushdown_agrees_with_reference_predicate() {
        let store = test_store().await;
        for (title, kind, year) in [
            ("The Matrix", MediaKind::Movie, 1999),
            ("Matrix Resurrections", MediaKind::Movie, 2021),
            ("Dark", MediaKind::Tv, 2017),
            ("AMÉLIE", MediaKind::Movie, 2001),
        ] {
            store.insert(new_entry(title, kind, year)).await.unwrap();
        }

        let conditions = [
            ScalarConditions {
                search: Some("matrix".into()),
                ..Default::default()
            },
            ScalarConditions {
                kind: TypeFilter::Tv,
                ..Default::default()
            },
            ScalarConditions {
                year: Some(YearFilter::Older),
                ..Default::default()
            },
            ScalarConditions {
                search: Some("MATRIX".into()),
                kind: TypeFilter::Movie,
                year: Some(YearFilter::Exact(2021)),
            },
            // Case folding must cover non-ASCII titles too.
            ScalarConditions {
                search: Some("amélie".into()),
                ..Default::default()
            },
        ];

        let all = store.list_where(&ScalarConditions::default()).await.unwrap();
        assert_eq!(all.len(), 4);

        for cond in conditions {
            let rows = store.list_where(&cond).await.unwrap();
            let expected: Vec<&CatalogEntry> = all.iter().filter(|e| cond.matches(e)).collect();
            assert_eq!(
                rows.len(),
                expected.len(),
                "pushdown disagrees for {cond:?}"
            );
            assert!(rows.iter().all(|r| cond.matches(r)));
        }
    }

    #[tokio::test]
    async fn list_is_id_ascending() {
        let store = test_store().await;
        for i in 0..5 {
            store
                .insert(new_entry(&format!("M{i}"), MediaKind::Movie, 2020))
                .await
                .unwrap();
        }
        let rows = store.list_where(&ScalarConditions::default()).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn replace_overwrites_every_field() {
        let store = test_store().await;
        let created = store
            .insert(new_entry("Old Title", MediaKind::Movie, 2000))
            .await
            .unwrap();

        let mut replacement = new_entry("New Title", MediaKind::Tv, 2016);
        replacement.rating = None;
        replacement.featured = true;
        let updated = store
            .replace(created.id, replacement)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New Title");
        assert_eq!(fetched.kind, MediaKind::Tv);
        assert_eq!(fetched.rating, None);
        assert!(fetched.featured);
    }

    #[tokio::test]
    async fn replace_missing_id_returns_none() {
        let store = test_store().await;
        let result = store
            .replace(404, new_entry("X", MediaKind::Movie, 2020))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_episodes_and_servers() {
        let store = test_store().await;
        let show = store
            .insert(new_entry("Breaking Bad", MediaKind::Tv, 2008))
            .await
            .unwrap();
        store
            .insert_episode(
                show.id,
                NewEpisode {
                    season: 1,
                    episode: 1,
                    title: "Pilot".into(),
                    description: Some("Walt cooks.".into()),
                    duration: Some(58),
                },
            )
            .await
            .unwrap();
        store
            .insert_server(
                show.id,
                NewServerSource {
                    name: "Server 1".into(),
                    url: Some("https://cdn.example.com/bb".into()),
                    kind: SourceKind::Direct,
                    quality: "HD".into(),
                },
            )
            .await
            .unwrap();

        assert!(store.delete(show.id).await.unwrap());
        assert!(store.get(show.id).await.unwrap().is_none());
        assert!(store.episodes_for(show.id).await.unwrap().is_empty());
        assert!(store.servers_for(show.id).await.unwrap().is_empty());

        // Deleting again reports not-found.
        assert!(!store.delete(show.id).await.unwrap());
    }

    #[tokio::test]
    async fn server_update_and_delete() {
        let store = test_store().await;
        let movie = store
            .insert(new_entry("Movie", MediaKind::Movie, 2024))
            .await
            .unwrap();
        let server = store
            .insert_server(
                movie.id,
                NewServerSource {
                    name: "Server 1".into(),
                    url: None,
                    kind: SourceKind::Embed,
                    quality: "CAM".into(),
                },
            )
            .await
            .unwrap();
        assert!(!server.is_playable());

        let updated = store
            .update_server(
                server.id,
                NewServerSource {
                    name: "Server 1".into(),
                    url: Some("https://embed.example.com/m".into()),
                    kind: SourceKind::Embed,
                    quality: "HD".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_playable());
        assert_eq!(updated.movie_id, movie.id);

        assert!(store.delete_server(server.id).await.unwrap());
        assert!(store.servers_for(movie.id).await.unwrap().is_empty());
        assert!(
            store
                .update_server(
                    server.id,
                    NewServerSource {
                        name: "gone".into(),
                        url: None,
                        kind: SourceKind::Embed,
                        quality: "HD".into(),
                    },
                )
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
    }
}
