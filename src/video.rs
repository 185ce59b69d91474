use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::media::CardKey;

/// How long the pointer has to rest on a card before its trailer is looked up.
pub const HOVER_PREVIEW_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Deserialize)]
pub struct TrailerVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub results: Vec<TrailerVideo>,
}

/// First embeddable trailer or teaser, in the order TMDB lists them.
pub fn select_trailer(videos: &[TrailerVideo]) -> Option<&TrailerVideo> {
    videos
        .iter()
        .filter(|v| v.site == "YouTube")
        .find(|v| v.video_type == "Trailer" || v.video_type == "Teaser")
}

pub fn embed_url(youtube_key: &str) -> String {
    format!(
        "https://www.youtube.com/embed/{key}?autoplay=1&mute=1&controls=0&loop=1&playlist={key}&modestbranding=1",
        key = youtube_key
    )
}

#[derive(Debug, Default)]
struct CardHover {
    hovered: bool,
    generation: u64,
    fetched: bool,
    trailer_key: Option<String>,
}

/// Per-card hover state driving the delayed trailer lookup.
///
/// Every hover exit bumps the card's generation, so a timer armed for an
/// earlier hover reports a stale generation and is ignored.
#[derive(Debug, Default)]
pub struct HoverPreviews {
    cards: HashMap<CardKey, CardHover>,
}

impl HoverPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the card hovered. Returns the generation a timer should carry,
    /// or `None` when the trailer was already looked up.
    pub fn enter(&mut self, key: CardKey) -> Option<u64> {
        let card = self.cards.entry(key).or_default();
        card.hovered = true;
        if card.fetched {
            return None;
        }
        Some(card.generation)
    }

    pub fn leave(&mut self, key: CardKey) {
        if let Some(card) = self.cards.get_mut(&key) {
            card.hovered = false;
            card.generation = card.generation.wrapping_add(1);
        }
    }

    /// Called when a hover timer fires. Returns true exactly once per card,
    /// when the timer belongs to the current uninterrupted hover.
    pub fn timer_elapsed(&mut self, key: CardKey, generation: u64) -> bool {
        let Some(card) = self.cards.get_mut(&key) else {
            return false;
        };
        if !card.hovered || card.fetched || card.generation != generation {
            return false;
        }
        card.fetched = true;
        true
    }

    pub fn videos_loaded(&mut self, key: CardKey, videos: &[TrailerVideo]) {
        let card = self.cards.entry(key).or_default();
        card.fetched = true;
        card.trailer_key = select_trailer(videos).map(|v| v.key.clone());
    }

    pub fn is_hovered(&self, key: CardKey) -> bool {
        self.cards.get(&key).is_some_and(|c| c.hovered)
    }

    /// Trailer to show in place of the poster, only while hovered.
    pub fn active_preview(&self, key: CardKey) -> Option<&str> {
        self.cards
            .get(&key)
            .filter(|c| c.hovered)
            .and_then(|c| c.trailer_key.as_deref())
    }
}
