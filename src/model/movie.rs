use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Value some catalogs use for "no poster available".
pub const POSTER_UNAVAILABLE: &str = "N/A";

pub const UNTITLED: &str = "Untitled";

/// Render identity of a movie within one result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum MovieKey {
    Id(u64),
    External(String),
}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieKey::Id(id) => write!(f, "{}", id),
            MovieKey::External(id) => f.write_str(id),
        }
    }
}

/// Canonical movie record consumed by the card presenter, independent of
/// which upstream shape it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub key: MovieKey,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub poster_url: String,
    pub poster_is_placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

/// Pick the image source for a raw poster value. Missing, blank and
/// sentinel values resolve to the placeholder. The flag is true when the
/// placeholder was used.
pub fn resolve_poster(raw: Option<&str>, placeholder: &str) -> (String, bool) {
    match raw.map(str::trim) {
        Some(url) if !url.is_empty() && url != POSTER_UNAVAILABLE => (url.to_string(), false),
        _ => (placeholder.to_string(), true),
    }
}

/// Remove blank and repeated genres, keeping first-seen order.
pub fn dedup_genres(genres: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    genres
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .filter(|g| seen.insert(g.clone()))
        .collect()
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn normalize_title(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| UNTITLED.to_string())
}

// The enriched backend fills unknown release years with dashes.
pub(crate) fn normalize_year(value: Option<String>) -> Option<String> {
    non_blank(value).filter(|y| !y.chars().all(|c| c == '-'))
}
