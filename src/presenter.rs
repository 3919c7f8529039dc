use std::fmt;

use crate::config::CardConfig;
use crate::model::{Movie, MovieKey};

const ELLIPSIS: char = '…';
const MIN_WIDTH: usize = 8;
const GRID_GAP: &str = "  ";

/// Self-contained visual unit for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub key: MovieKey,
    pub poster_src: String,
    pub poster_alt: String,
    pub poster_is_placeholder: bool,
    pub title: Vec<String>,
    pub year: Option<String>,
    pub overview: Vec<String>,
    pub genre_tags: Vec<String>,
    width: usize,
}

/// Maps movies to cards. Holds layout settings only.
#[derive(Debug, Clone)]
pub struct MovieCardPresenter {
    title_lines: usize,
    overview_lines: usize,
    width: usize,
}

impl MovieCardPresenter {
    pub fn new(title_lines: usize, overview_lines: usize, width: usize) -> Self {
        Self {
            title_lines: title_lines.max(1),
            overview_lines,
            width: width.max(MIN_WIDTH),
        }
    }

    pub fn from_config(config: &CardConfig) -> Self {
        Self::new(config.title_lines, config.overview_lines, config.width)
    }

    pub fn present(&self, movie: &Movie) -> MovieCard {
        let overview = match &movie.overview {
            Some(text) if self.overview_lines > 0 => clip(text, self.width, self.overview_lines),
            _ => Vec::new(),
        };

        MovieCard {
            key: movie.key.clone(),
            poster_src: movie.poster_url.clone(),
            poster_alt: format!("Poster of {}", movie.title),
            poster_is_placeholder: movie.poster_is_placeholder,
            title: clip(&movie.title, self.width, self.title_lines),
            year: movie.year.clone(),
            overview,
            genre_tags: movie.genres.clone().unwrap_or_default(),
            width: self.width,
        }
    }

    pub fn present_all(&self, movies: &[Movie]) -> Vec<MovieCard> {
        movies.iter().map(|m| self.present(m)).collect()
    }
}

impl MovieCard {
    /// Card body lines, framed, each exactly `width + 4` characters.
    pub fn lines(&self) -> Vec<String> {
        let mut body: Vec<String> = Vec::new();
        body.extend(self.title.iter().cloned());
        if let Some(year) = &self.year {
            body.push(year.clone());
        }

        let poster = if self.poster_is_placeholder {
            "[no poster]".to_string()
        } else {
            self.poster_src.clone()
        };
        body.extend(clip(&poster, self.width, 1));

        if !self.overview.is_empty() {
            body.push(String::new());
            body.extend(self.overview.iter().cloned());
        }

        if !self.genre_tags.is_empty() {
            body.extend(layout_tags(&self.genre_tags, self.width));
        }

        let border = format!("+{}+", "-".repeat(self.width + 2));
        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(border.clone());
        for line in body {
            lines.push(format!("| {:<width$} |", line, width = self.width));
        }
        lines.push(border);
        lines
    }

    pub fn outer_width(&self) -> usize {
        self.width + 4
    }
}

impl fmt::Display for MovieCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Lay cards out in rows of `columns`, in order.
pub fn render_grid(cards: &[MovieCard], columns: usize) -> String {
    let columns = columns.max(1);
    let mut out = String::new();

    for row in cards.chunks(columns) {
        let rendered: Vec<Vec<String>> = row.iter().map(|c| c.lines()).collect();
        let height = rendered.iter().map(|l| l.len()).max().unwrap_or(0);

        for i in 0..height {
            let parts: Vec<String> = row
                .iter()
                .zip(&rendered)
                .map(|(card, lines)| match lines.get(i) {
                    Some(line) => line.clone(),
                    None => " ".repeat(card.outer_width()),
                })
                .collect();
            out.push_str(parts.join(GRID_GAP).trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Lay genre tags out left to right, one tag never spanning two lines
/// unless it alone is wider than a line.
fn layout_tags(tags: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();

    for tag in tags {
        let mut tag: Vec<char> = format!("[{}]", tag).chars().collect();

        if !current.is_empty() && current.len() + 1 + tag.len() > width {
            lines.push(std::mem::take(&mut current).into_iter().collect());
        }
        if !current.is_empty() {
            current.push(' ');
        }

        while tag.len() > width {
            let rest = tag.split_off(width);
            lines.push(tag.into_iter().collect());
            tag = rest;
        }
        current.extend(tag);
    }

    if !current.is_empty() {
        lines.push(current.into_iter().collect());
    }
    lines
}

/// Word-wrap `text` to `width` characters per line.
///
/// Widths are counted in chars, not terminal columns: double-width glyphs
/// (CJK, emoji) make a line wider than the card frame.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Words longer than a line are split hard.
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap and keep at most `max_lines`, marking the cut with an ellipsis.
/// Only the presentation is clipped.
fn clip(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = wrap(text, width);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let mut chars: Vec<char> = last.chars().collect();
        chars.truncate(width - 1);
        while chars.last().is_some_and(|c| c.is_whitespace()) {
            chars.pop();
        }
        chars.push(ELLIPSIS);
        *last = chars.into_iter().collect();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "https://via.placeholder.com/300x450.png?text=No+Image";

    fn minimal_movie() -> Movie {
        Movie {
            key: MovieKey::External("tt0078748".to_string()),
            title: "Alien".to_string(),
            year: Some("1979".to_string()),
            poster_url: PLACEHOLDER.to_string(),
            poster_is_placeholder: true,
            overview: None,
            genres: None,
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("   ", 4).is_empty());
    }

    #[test]
    fn test_clip_marks_cut() {
        assert_eq!(clip("short", 10, 1), vec!["short"]);
        assert_eq!(clip("one two three four", 10, 1), vec!["one two…"]);
        let lines = clip("the quick brown fox jumps over the lazy dog", 10, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(ELLIPSIS));
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_minimal_card() {
        let presenter = MovieCardPresenter::new(1, 3, 20);
        let card = presenter.present(&minimal_movie());

        assert_eq!(card.title, vec!["Alien"]);
        assert_eq!(card.year.as_deref(), Some("1979"));
        assert_eq!(card.poster_src, PLACEHOLDER);
        assert_eq!(card.poster_alt, "Poster of Alien");
        assert!(card.overview.is_empty());
        assert!(card.genre_tags.is_empty());

        let lines = card.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].contains("[no poster]"));
        assert!(lines.iter().all(|l| l.chars().count() == 24));
    }

    #[test]
    fn test_full_card_keeps_movie_intact() {
        let mut movie = minimal_movie();
        movie.title = "Mad Max: Fury Road, the extended title that keeps going".to_string();
        movie.poster_url = "https://image.tmdb.org/t/p/w500/poster.jpg".to_string();
        movie.poster_is_placeholder = false;
        movie.overview = Some("An apocalyptic story set in the furthest reaches of our planet, in a stark desert landscape.".to_string());
        movie.genres = Some(vec!["Action".to_string(), "Adventure".to_string()]);
        let before = movie.clone();

        let presenter = MovieCardPresenter::new(1, 2, 20);
        let card = presenter.present(&movie);

        assert_eq!(movie, before);
        assert_eq!(card.title.len(), 1);
        assert!(card.title[0].ends_with(ELLIPSIS));
        assert_eq!(card.overview.len(), 2);
        assert_eq!(card.genre_tags, vec!["Action", "Adventure"]);

        let text = card.to_string();
        assert!(text.contains("[Action] [Adventure]"));
        assert!(text.contains("https://image.tmdb.…"));
    }

    #[test]
    fn test_empty_genres_render_no_tags() {
        let mut movie = minimal_movie();
        movie.genres = Some(Vec::new());
        let card = MovieCardPresenter::new(1, 3, 20).present(&movie);
        assert!(card.genre_tags.is_empty());
        assert_eq!(card.lines().len(), 5);
    }

    #[test]
    fn test_layout_tags_keeps_tags_whole() {
        let tags = vec!["Ciencia ficción".to_string(), "Película de TV".to_string()];
        assert_eq!(layout_tags(&tags, 32), vec!["[Ciencia ficción]", "[Película de TV]"]);

        let tags = vec!["Action".to_string(), "Drama".to_string()];
        assert_eq!(layout_tags(&tags, 20), vec!["[Action] [Drama]"]);

        // Only a tag wider than the line is split.
        let tags = vec!["War".to_string(), "Ciencia ficción".to_string()];
        let lines = layout_tags(&tags, 8);
        assert_eq!(lines, vec!["[War]", "[Ciencia", " ficción", "]"]);
    }

    #[test]
    fn test_multi_word_genre_on_card() {
        let mut movie = minimal_movie();
        movie.genres = Some(vec!["Ciencia ficción".to_string(), "Película de TV".to_string()]);
        let card = MovieCardPresenter::new(1, 3, 32).present(&movie);

        let lines = card.lines();
        assert!(lines.iter().any(|l| l.contains("[Ciencia ficción]")));
        assert!(lines.iter().any(|l| l.contains("[Película de TV]")));
        assert!(lines.iter().all(|l| l.chars().count() == 36));
    }

    #[test]
    fn test_grid_layout() {
        let presenter = MovieCardPresenter::new(1, 3, 10);
        let mut second = minimal_movie();
        second.key = MovieKey::Id(2);
        second.title = "Aliens".to_string();
        second.genres = Some(vec!["Action".to_string()]);
        let cards = presenter.present_all(&[minimal_movie(), second, minimal_movie()]);

        let grid = render_grid(&cards, 2);
        let rows: Vec<&str> = grid.split("\n\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(rows.len(), 2);

        let first_row: Vec<&str> = rows[0].lines().collect();
        assert_eq!(first_row.len(), 6);
        assert!(first_row[1].contains("Alien") && first_row[1].contains("Aliens"));
        assert_eq!(rows[1].lines().count(), 5);
    }
}
