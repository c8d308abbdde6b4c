use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::types::{MediaKind, SourceKind};

/// Earliest year accepted for a catalog entry (the first film dates to 1888).
pub const MIN_YEAR: i64 = 1888;
/// Latest year accepted for a catalog entry.
pub const MAX_YEAR: i64 = 2100;

/// One movie or TV series record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub year: i64,
    /// Runtime in minutes.
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub quality: String,
    pub poster: String,
    pub rating: Option<f64>,
    pub backdrop: Option<String>,
    pub play_url: Option<String>,
    pub trailer_url: Option<String>,
    pub embed_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Insert/replace payload for a catalog entry; the id is store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogEntry {
    pub title: String,
    pub description: String,
    pub year: i64,
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub quality: String,
    pub poster: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub play_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl NewCatalogEntry {
    /// Validate the payload, collecting every field failure.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "must not be empty"));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            errors.push(FieldError::new(
                "year",
                format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
            ));
        }
        if self.duration <= 0 {
            errors.push(FieldError::new("duration", "must be a positive minute count"));
        }
        if self.genres.is_empty() || self.genres.iter().any(|g| g.trim().is_empty()) {
            errors.push(FieldError::new("genres", "must be a non-empty list of genres"));
        }
        if self.countries.is_empty() || self.countries.iter().any(|c| c.trim().is_empty()) {
            errors.push(FieldError::new(
                "countries",
                "must be a non-empty list of countries",
            ));
        }
        if self.quality.trim().is_empty() {
            errors.push(FieldError::new("quality", "must not be empty"));
        }
        if self.poster.trim().is_empty() {
            errors.push(FieldError::new("poster", "must not be empty"));
        }
        if let Some(r) = self.rating {
            if !(0.0..=10.0).contains(&r) {
                errors.push(FieldError::new("rating", "must be between 0 and 10"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }

    pub fn into_entry(self, id: i64) -> CatalogEntry {
        CatalogEntry {
            id,
            title: self.title,
            description: self.description,
            year: self.year,
            duration: self.duration,
            kind: self.kind,
            genres: self.genres,
            countries: self.countries,
            quality: self.quality,
            poster: self.poster,
            rating: self.rating,
            backdrop: self.backdrop,
            play_url: self.play_url,
            trailer_url: self.trailer_url,
            embed_url: self.embed_url,
            featured: self.featured,
        }
    }
}

/// One episode of a TV series entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub movie_id: i64,
    pub season: i64,
    pub episode: i64,
    pub title: String,
    pub description: Option<String>,
    /// Runtime in minutes, when known.
    pub duration: Option<i64>,
}

/// Insert payload for an episode; `movie_id` comes from the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEpisode {
    pub season: i64,
    pub episode: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl NewEpisode {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.season < 1 {
            errors.push(FieldError::new("season", "must be at least 1"));
        }
        if self.episode < 1 {
            errors.push(FieldError::new("episode", "must be at least 1"));
        }
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if let Some(d) = self.duration {
            if d <= 0 {
                errors.push(FieldError::new("duration", "must be a positive minute count"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// An alternate playback source for a catalog entry ("Server 1", "Server 2").
///
/// A server with no URL is configured but not yet usable; consumers present
/// it as disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSource {
    pub id: i64,
    pub movie_id: i64,
    pub name: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub quality: String,
}

impl ServerSource {
    /// Whether consumers can actually select this source.
    pub fn is_playable(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Insert/replace payload for a server source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServerSource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub quality: String,
}

impl NewServerSource {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.quality.trim().is_empty() {
            errors.push(FieldError::new("quality", "must not be empty"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> NewCatalogEntry {
        NewCatalogEntry {
            title: "Gladiator II".into(),
            description: "Lucius enters the Colosseum.".into(),
            year: 2024,
            duration: 148,
            kind: MediaKind::Movie,
            genres: vec!["Action".into(), "Drama".into()],
            countries: vec!["United States".into()],
            quality: "HD".into(),
            poster: "https://example.com/poster.jpg".into(),
            rating: Some(7.1),
            backdrop: None,
            play_url: None,
            trailer_url: None,
            embed_url: None,
            featured: false,
        }
    }

    #[test]
    fn valid_entry_passes() {
        assert!(sample_entry().validate().is_ok());
    }

    #[test]
    fn invalid_entry_reports_every_bad_field() {
        let mut entry = sample_entry();
        entry.title = "  ".into();
        entry.genres = vec![];
        entry.rating = Some(11.0);

        let err = entry.validate().unwrap_err();
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["title", "genres", "rating"]);
    }

    #[test]
    fn episode_requires_positive_season_and_episode() {
        let ep = NewEpisode {
            season: 0,
            episode: 1,
            title: "Pilot".into(),
            description: None,
            duration: Some(47),
        };
        assert!(ep.validate().is_err());
    }

    #[test]
    fn server_without_url_is_not_playable() {
        let server = ServerSource {
            id: 1,
            movie_id: 1,
            name: "Server 1".into(),
            url: None,
            kind: SourceKind::Embed,
            quality: "HD".into(),
        };
        assert!(!server.is_playable());

        let blank = ServerSource {
            url: Some("   ".into()),
            ..server.clone()
        };
        assert!(!blank.is_playable());

        let linked = ServerSource {
            url: Some("https://cdn.example.com/stream.m3u8".into()),
            ..server
        };
        assert!(linked.is_playable());
    }
}
