use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use super::movie::{
    dedup_genres, non_blank, normalize_title, normalize_year, resolve_poster, Movie, MovieKey,
};

// Wire types for the recommendation service's POST /recommend.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub movies: Option<Vec<RawMovie>>,
}

impl RecommendResponse {
    pub fn is_empty(&self) -> bool {
        self.movies.as_ref().map_or(true, |m| m.is_empty())
    }

    /// Normalize into canonical movies, in the order received.
    pub fn into_movies(self, placeholder_poster: &str) -> Vec<Movie> {
        normalize_movies(self.movies.unwrap_or_default(), placeholder_poster)
    }
}

/// A movie as sent by the service. Both upstream shapes are accepted and
/// told apart by their identifier field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMovie {
    Enriched(EnrichedMovie),
    Catalog(CatalogMovie),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

// Catalog search results use capitalized field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl RawMovie {
    pub fn key(&self) -> MovieKey {
        match self {
            RawMovie::Enriched(m) => MovieKey::Id(m.id),
            RawMovie::Catalog(m) => MovieKey::External(m.imdb_id.clone()),
        }
    }

    pub fn into_movie(self, placeholder_poster: &str) -> Movie {
        let key = self.key();
        match self {
            RawMovie::Enriched(m) => {
                let (poster_url, poster_is_placeholder) =
                    resolve_poster(m.poster_url.as_deref(), placeholder_poster);
                Movie {
                    key,
                    title: normalize_title(m.title),
                    year: normalize_year(m.year),
                    poster_url,
                    poster_is_placeholder,
                    overview: non_blank(m.overview),
                    genres: m.genres.map(dedup_genres),
                }
            }
            RawMovie::Catalog(m) => {
                let (poster_url, poster_is_placeholder) =
                    resolve_poster(m.poster.as_deref(), placeholder_poster);
                Movie {
                    key,
                    title: normalize_title(m.title),
                    year: normalize_year(m.year),
                    poster_url,
                    poster_is_placeholder,
                    overview: None,
                    genres: None,
                }
            }
        }
    }
}

/// Normalize a raw result list. Entries repeating an earlier key are
/// dropped so keys stay unique within the set.
pub fn normalize_movies(raw: Vec<RawMovie>, placeholder_poster: &str) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut movies = Vec::with_capacity(raw.len());

    for entry in raw {
        let key = entry.key();
        if !seen.insert(key.clone()) {
            warn!(key = %key, "Dropping movie with duplicate key");
            continue;
        }
        movies.push(entry.into_movie(placeholder_poster));
    }

    movies
}
