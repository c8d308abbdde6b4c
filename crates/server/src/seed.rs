use std::sync::Arc;

use rustflix_catalog::{CatalogStore, ScalarConditions, StoreError};
use rustflix_core::model::{NewCatalogEntry, NewEpisode, NewServerSource};
use rustflix_core::types::{MediaKind, SourceKind};
use tracing::info;

fn movie(
    title: &str,
    description: &str,
    year: i64,
    duration: i64,
    rating: f64,
    genres: &[&str],
    poster: &str,
) -> NewCatalogEntry {
    NewCatalogEntry {
        title: title.into(),
        description: description.into(),
        year,
        duration,
        kind: MediaKind::Movie,
        genres: genres.iter().map(|s| s.to_string()).collect(),
        countries: vec!["United States".into()],
        quality: "HD".into(),
        poster: poster.into(),
        rating: Some(rating),
        backdrop: Some(poster.into()),
        play_url: None,
        trailer_url: None,
        embed_url: None,
        featured: false,
    }
}

/// Populate an empty catalog with sample entries. A non-empty catalog is
/// left untouched.
pub async fn run(store: &Arc<dyn CatalogStore>) -> Result<usize, StoreError> {
    let existing = store.list_where(&ScalarConditions::default()).await?;
    if !existing.is_empty() {
        info!(entries = existing.len(), "catalog not empty, skipping seed");
        return Ok(0);
    }

    let mut count = 0;

    let mut featured = movie(
        "Captain America: Brave New World",
        "After meeting with newly elected U.S. President Thaddeus Ross, Sam finds himself \
         in the middle of an international incident.",
        2025,
        119,
        7.2,
        &["Action", "Thriller", "Sci-Fi"],
        "https://image.tmdb.org/t/p/w500/pzIddUEMWhWzfvLI3TwxUG2wGoi.jpg",
    );
    featured.featured = true;
    store.insert(featured).await?;
    count += 1;

    let movies = [
        movie(
            "Gladiator II",
            "Years after witnessing the death of Maximus, Lucius is forced to enter the \
             Colosseum after his home is conquered by the tyrannical Emperors of Rome.",
            2024,
            148,
            7.1,
            &["Action", "Adventure", "Drama"],
            "https://image.tmdb.org/t/p/w500/2cxhvwyEwRlysAmRH4iodkvo0z5.jpg",
        ),
        movie(
            "Red One",
            "After Santa Claus is kidnapped, the North Pole's Head of Security must team up \
             with the world's most infamous bounty hunter to save Christmas.",
            2024,
            123,
            6.9,
            &["Action", "Adventure", "Comedy"],
            "https://image.tmdb.org/t/p/w500/cdqLnri3NEGcmfnqwk2TSIYtddg.jpg",
        ),
        movie(
            "Venom: The Last Dance",
            "Eddie and Venom are on the run, forced into a devastating decision that will \
             bring the curtains down on their last dance.",
            2024,
            109,
            6.2,
            &["Action", "Sci-Fi", "Thriller"],
            "https://image.tmdb.org/t/p/w500/aosm8NMQ3UyoBVpSxyimorCQykC.jpg",
        ),
        movie(
            "Terrifier 3",
            "Art the Clown unleashes chaos on the unsuspecting residents of Miles County on \
             Christmas Eve.",
            2024,
            125,
            6.9,
            &["Horror", "Thriller"],
            "https://image.tmdb.org/t/p/w500/63xYQj1BwRFielxsBDXvHIJyXVm.jpg",
        ),
        // Pre-2016 title so the "Older" year bucket is non-empty.
        movie(
            "Interstellar",
            "A team of explorers travel through a wormhole in space in an attempt to ensure \
             humanity's survival.",
            2014,
            169,
            8.7,
            &["Adventure", "Drama", "Sci-Fi"],
            "https://image.tmdb.org/t/p/w500/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg",
        ),
    ];
    for m in movies {
        store.insert(m).await?;
        count += 1;
    }

    let show = store
        .insert(NewCatalogEntry {
            title: "Breaking Bad".into(),
            description: "A chemistry teacher diagnosed with inoperable lung cancer turns to \
                          manufacturing and selling methamphetamine with a former student."
                .into(),
            year: 2008,
            duration: 49,
            kind: MediaKind::Tv,
            genres: vec!["Crime".into(), "Drama".into(), "Thriller".into()],
            countries: vec!["United States".into()],
            quality: "HD".into(),
            poster: "https://image.tmdb.org/t/p/w500/ggFHVNu6YYI5L9pCfOacjizRGt.jpg".into(),
            rating: Some(9.5),
            backdrop: None,
            play_url: None,
            trailer_url: None,
            embed_url: None,
            featured: false,
        })
        .await?;
    count += 1;

    let episodes = [
        (1, 1, "Pilot", 58),
        (1, 2, "Cat's in the Bag...", 48),
        (2, 1, "Seven Thirty-Seven", 47),
    ];
    for (season, episode, title, duration) in episodes {
        store
            .insert_episode(
                show.id,
                NewEpisode {
                    season,
                    episode,
                    title: title.into(),
                    description: None,
                    duration: Some(duration),
                },
            )
            .await?;
    }

    store
        .insert_server(
            show.id,
            NewServerSource {
                name: "Server 1".into(),
                url: Some("https://embed.example.com/breaking-bad".into()),
                kind: SourceKind::Embed,
                quality: "HD".into(),
            },
        )
        .await?;
    store
        .insert_server(
            show.id,
            NewServerSource {
                name: "Server 2".into(),
                url: None,
                kind: SourceKind::Direct,
                quality: "HD".into(),
            },
        )
        .await?;

    info!(entries = count, "catalog seeded");
    Ok(count)
}
