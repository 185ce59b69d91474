use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Color;
use serde::Deserialize;

use crate::error::ApiError;
use crate::video::TrailerVideo;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn image_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mflix").map(|dirs| dirs.cache_dir().join("images"))
}

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.102, 0.122, 0.180);
pub const MFLIX_RED: Color = Color::from_rgb(0.863, 0.149, 0.149);
pub const RATING_YELLOW: Color = Color::from_rgb(0.918, 0.702, 0.031);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.612, 0.639, 0.686);

pub type MediaId = u64;
pub type GenreId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    #[default]
    Movie,
    TvSeries,
}

impl MediaType {
    pub fn path(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::TvSeries => "tv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn path(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// The row a card is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shelf {
    Mood,
    TopTen,
    Popular,
    TopRated,
    Similar,
    Genre(GenreId),
    Search,
}

/// One card on screen. The same title in two rows is two cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub shelf: Shelf,
    pub id: MediaId,
}

impl CardKey {
    pub fn new(shelf: Shelf, id: MediaId) -> Self {
        Self { shelf, id }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: MediaId,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub media_type: MediaType,
    pub vote_average: f32,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub genre_ids: Vec<GenreId>,
}

impl MediaItem {
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    pub fn year_label(&self) -> String {
        self.year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| String::from("N/A"))
    }

    pub fn language_badge(&self) -> String {
        match self.original_language.as_deref() {
            Some("hi") => String::from("HINDI"),
            Some("en") => String::from("ENGLISH"),
            Some(code) if !code.is_empty() => code.to_uppercase(),
            _ => String::from("DUAL"),
        }
    }

    pub fn quality_badge(&self) -> &'static str {
        if self.vote_average > 7.5 {
            "4K"
        } else {
            "HD"
        }
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMediaResult {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub media_type: Option<String>,
    pub vote_average: Option<f32>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub original_language: Option<String>,
    pub genre_ids: Option<Vec<GenreId>>,
}

impl From<TmdbMediaResult> for MediaItem {
    fn from(result: TmdbMediaResult) -> Self {
        let media_type = match result.media_type.as_deref() {
            Some("tv") => MediaType::TvSeries,
            _ => MediaType::Movie,
        };
        Self {
            id: result.id,
            title: result.title.or(result.name).unwrap_or_default(),
            overview: result.overview.unwrap_or_default(),
            poster_path: result.poster_path,
            backdrop_path: result.backdrop_path,
            media_type,
            vote_average: result.vote_average.unwrap_or_default(),
            release_date: result
                .release_date
                .filter(|d| !d.is_empty())
                .or(result.first_air_date),
            original_language: result.original_language,
            genre_ids: result.genre_ids.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMediaResult>,
}

impl TmdbPage {
    pub fn into_items(self) -> Vec<MediaItem> {
        self.results.into_iter().map(MediaItem::from).collect()
    }
}

#[derive(Debug, Clone)]
pub struct MediaDetails {
    pub item: MediaItem,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub cast: Vec<String>,
    pub similar: Vec<MediaItem>,
    pub trailer_key: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LoadingState {
    Loading,
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = image_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "image cache dir unavailable");
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn release(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn needs_load(&self, url: &str) -> bool {
        !self.cache.contains_key(url) && !self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    PriorityLoaded(Result<Vec<MediaItem>, ApiError>, Result<Vec<Genre>, ApiError>),
    SecondaryLoaded(Result<Vec<MediaItem>, ApiError>, Result<Vec<MediaItem>, ApiError>),
    HeroLoaded(Box<Result<MediaDetails, ApiError>>),
    GenreRowLoaded(GenreId, Result<Vec<MediaItem>, ApiError>),
    MoodSelected(&'static str),
    MoodLoaded(&'static str, Result<Vec<MediaItem>, ApiError>),
    MainScrolled(ScrollMetrics),
    HoverCard(CardKey, bool),
    HoverPreviewElapsed(CardKey, u64),
    TrailerVideosLoaded(CardKey, Result<Vec<TrailerVideo>, ApiError>),
    OpenTrailer(CardKey),
    OpenHeroTrailer,
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    SearchQueryChanged(String),
    SearchDebounceTriggered,
    SearchResultsLoaded(String, Result<Vec<MediaItem>, ApiError>),
    ClearSearch,
}

/// Vertical scroll position of the home screen, as reported by the scrollable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset_y: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> f32 {
        (self.content_height - (self.offset_y + self.viewport_height)).max(0.0)
    }
}

pub fn truncate_description(description: &str, max_length: usize) -> String {
    if description.chars().count() <= max_length {
        return description.to_string();
    }
    let truncated: String = description.chars().take(max_length).collect();
    format!(
        "{}...",
        truncated.rfind(' ').map_or(truncated.as_str(), |i| &truncated[..i])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(lang: Option<&str>, rating: f32, date: Option<&str>) -> MediaItem {
        MediaItem {
            id: 1,
            title: String::from("Dune"),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            media_type: MediaType::Movie,
            vote_average: rating,
            release_date: date.map(String::from),
            original_language: lang.map(String::from),
            genre_ids: Vec::new(),
        }
    }

    #[test]
    fn language_badge_names_known_codes() {
        assert_eq!(item(Some("hi"), 0.0, None).language_badge(), "HINDI");
        assert_eq!(item(Some("en"), 0.0, None).language_badge(), "ENGLISH");
        assert_eq!(item(Some("ko"), 0.0, None).language_badge(), "KO");
        assert_eq!(item(None, 0.0, None).language_badge(), "DUAL");
    }

    #[test]
    fn quality_badge_threshold_is_exclusive() {
        assert_eq!(item(None, 7.5, None).quality_badge(), "HD");
        assert_eq!(item(None, 7.6, None).quality_badge(), "4K");
    }

    #[test]
    fn year_falls_back_to_na() {
        assert_eq!(item(None, 0.0, Some("2021-09-15")).year_label(), "2021");
        assert_eq!(item(None, 0.0, Some("")).year_label(), "N/A");
        assert_eq!(item(None, 0.0, None).year_label(), "N/A");
    }

    #[test]
    fn show_results_use_name_and_first_air_date() {
        let raw: TmdbMediaResult = serde_json::from_value(serde_json::json!({
            "id": 1399,
            "name": "Game of Thrones",
            "media_type": "tv",
            "first_air_date": "2011-04-17",
            "vote_average": 8.4,
            "genre_ids": [18, 10765]
        }))
        .unwrap();
        let item = MediaItem::from(raw);
        assert_eq!(item.title, "Game of Thrones");
        assert_eq!(item.media_type, MediaType::TvSeries);
        assert_eq!(item.year(), Some(2011));
        assert_eq!(item.genre_ids, vec![18, 10765]);
        assert_eq!(item.rating_label(), "8.4");
    }

    #[test]
    fn null_fields_in_a_page_become_defaults() {
        let page: TmdbPage = serde_json::from_value(serde_json::json!({
            "results": [
                { "id": 1, "title": "Untold", "overview": null, "vote_average": null, "genre_ids": null },
                { "id": 2, "title": "Told", "overview": "A story." }
            ]
        }))
        .unwrap();
        let items = page.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].overview, "");
        assert_eq!(items[0].vote_average, 0.0);
        assert!(items[0].genre_ids.is_empty());
        assert_eq!(items[1].overview, "A story.");
    }

    #[test]
    fn scroll_distance_never_negative() {
        let m = ScrollMetrics {
            offset_y: 900.0,
            viewport_height: 720.0,
            content_height: 1500.0,
        };
        assert_eq!(m.distance_to_bottom(), 0.0);
    }

    #[test]
    fn truncate_cuts_on_word_boundary() {
        assert_eq!(truncate_description("short", 10), "short");
        assert_eq!(
            truncate_description("a desert planet story", 12),
            "a desert..."
        );
    }
}
