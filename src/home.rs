use std::collections::{HashMap, HashSet};

use crate::media::{Genre, GenreId, MediaId, MediaItem, ScrollMetrics};
use crate::mood::{Mood, TRENDING_MOOD};

pub const INITIAL_VISIBLE_GENRES: usize = 2;
pub const GENRE_REVEAL_STEP: usize = 2;
/// Distance from the bottom of the content at which the sentinel counts as visible.
pub const SENTINEL_MARGIN: f32 = 600.0;
pub const TOP_TEN: usize = 10;

/// What selecting a mood requires from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodChange {
    /// Already active; nothing to do.
    Unchanged,
    /// Switched back to trending, served from the already loaded list.
    Trending,
    /// Needs a discovery query for the given genre filter.
    Discover(&'static str),
}

/// Home screen data and the incremental genre reveal.
#[derive(Debug)]
pub struct HomeFeed {
    pub trending: Vec<MediaItem>,
    pub top_rated: Vec<MediaItem>,
    pub popular: Vec<MediaItem>,
    pub mood_items: Vec<MediaItem>,
    pub genres: Vec<Genre>,
    genre_rows: HashMap<GenreId, Vec<MediaItem>>,
    requested_genres: HashSet<GenreId>,
    visible_genre_count: usize,
    active_mood: &'static str,
    mood_loading: bool,
}

impl Default for HomeFeed {
    fn default() -> Self {
        Self {
            trending: Vec::new(),
            top_rated: Vec::new(),
            popular: Vec::new(),
            mood_items: Vec::new(),
            genres: Vec::new(),
            genre_rows: HashMap::new(),
            requested_genres: HashSet::new(),
            visible_genre_count: INITIAL_VISIBLE_GENRES,
            active_mood: TRENDING_MOOD,
            mood_loading: false,
        }
    }
}

impl HomeFeed {
    pub fn apply_trending(&mut self, items: Vec<MediaItem>) {
        if self.active_mood == TRENDING_MOOD {
            self.mood_items = items.clone();
        }
        self.trending = items;
    }

    pub fn apply_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
    }

    pub fn trending_top_ten(&self) -> &[MediaItem] {
        &self.trending[..self.trending.len().min(TOP_TEN)]
    }

    pub fn active_mood(&self) -> &'static str {
        self.active_mood
    }

    pub fn is_mood_loading(&self) -> bool {
        self.mood_loading
    }

    pub fn select_mood(&mut self, mood: &'static Mood) -> MoodChange {
        if mood.id == self.active_mood {
            return MoodChange::Unchanged;
        }
        self.active_mood = mood.id;
        if mood.id == TRENDING_MOOD {
            self.mood_items = self.trending.clone();
            self.mood_loading = false;
            return MoodChange::Trending;
        }
        self.mood_loading = true;
        MoodChange::Discover(mood.genres)
    }

    /// Applies a discovery result. Results for a mood that is no longer
    /// active are dropped; `None` keeps the last good row.
    pub fn finish_mood(&mut self, mood_id: &str, items: Option<Vec<MediaItem>>) -> bool {
        if mood_id != self.active_mood {
            return false;
        }
        self.mood_loading = false;
        if let Some(items) = items {
            self.mood_items = items;
        }
        true
    }

    /// Looks an item up across every loaded row.
    pub fn find(&self, id: MediaId) -> Option<&MediaItem> {
        self.mood_items
            .iter()
            .chain(&self.trending)
            .chain(&self.popular)
            .chain(&self.top_rated)
            .chain(self.genre_rows.values().flatten())
            .find(|item| item.id == id)
    }

    pub fn visible_genres(&self) -> &[Genre] {
        &self.genres[..self.genres.len().min(self.visible_genre_count)]
    }

    pub fn has_more_genres(&self) -> bool {
        self.genres.len() > self.visible_genre_count
    }

    pub fn genre_row(&self, id: GenreId) -> Option<&[MediaItem]> {
        self.genre_rows.get(&id).map(Vec::as_slice)
    }

    /// Visible genres whose rows were never requested. Marks them requested.
    pub fn take_unrequested_genres(&mut self) -> Vec<GenreId> {
        let pending: Vec<GenreId> = self
            .visible_genres()
            .iter()
            .map(|g| g.id)
            .filter(|id| !self.requested_genres.contains(id))
            .collect();
        self.requested_genres.extend(pending.iter().copied());
        pending
    }

    /// Records a genre row. A failed fetch leaves an empty row so the
    /// sentinel can move on.
    pub fn apply_genre_row(&mut self, id: GenreId, items: Vec<MediaItem>) {
        self.genre_rows.insert(id, items);
    }

    fn genre_rows_in_flight(&self) -> bool {
        self.visible_genres()
            .iter()
            .any(|g| self.requested_genres.contains(&g.id) && !self.genre_rows.contains_key(&g.id))
    }

    /// Sentinel check. Reveals the next batch of genres when the viewport is
    /// within the margin of the bottom, more genres remain and the previous
    /// batch has rendered. Returns whether anything was revealed.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        if metrics.distance_to_bottom() > SENTINEL_MARGIN {
            return false;
        }
        self.reveal_more_genres()
    }

    fn reveal_more_genres(&mut self) -> bool {
        if !self.has_more_genres() || self.genre_rows_in_flight() {
            return false;
        }
        self.visible_genre_count =
            (self.visible_genre_count + GENRE_REVEAL_STEP).min(self.genres.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaType;
    use crate::mood;

    fn genres(n: u64) -> Vec<Genre> {
        (1..=n)
            .map(|id| Genre {
                id,
                name: format!("Genre {id}"),
            })
            .collect()
    }

    fn items(ids: &[u64]) -> Vec<MediaItem> {
        ids.iter()
            .map(|&id| MediaItem {
                id,
                title: format!("Title {id}"),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                media_type: MediaType::Movie,
                vote_average: 7.0,
                release_date: None,
                original_language: None,
                genre_ids: Vec::new(),
            })
            .collect()
    }

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics {
            offset_y: 1000.0,
            viewport_height: 720.0,
            content_height: 2200.0,
        }
    }

    fn resolve_pending(feed: &mut HomeFeed) -> Vec<GenreId> {
        let pending = feed.take_unrequested_genres();
        for id in &pending {
            feed.apply_genre_row(*id, items(&[*id * 100]));
        }
        pending
    }

    #[test]
    fn trending_seeds_mood_row_and_top_ten() {
        let mut feed = HomeFeed::default();
        feed.apply_trending(items(&(1..=15).collect::<Vec<_>>()));

        assert_eq!(feed.mood_items.len(), 15);
        assert_eq!(feed.trending_top_ten().len(), 10);
        assert_eq!(feed.trending_top_ten()[0].id, 1);
    }

    #[test]
    fn selecting_active_mood_is_a_no_op() {
        let mut feed = HomeFeed::default();
        feed.apply_trending(items(&[1, 2]));

        let trending = mood::find(TRENDING_MOOD).unwrap();
        assert_eq!(feed.select_mood(trending), MoodChange::Unchanged);

        let scared = mood::find("scared").unwrap();
        assert_eq!(feed.select_mood(scared), MoodChange::Discover("27,53"));
        assert!(feed.is_mood_loading());
        assert_eq!(feed.select_mood(scared), MoodChange::Unchanged);
    }

    #[test]
    fn switching_back_to_trending_reuses_loaded_list() {
        let mut feed = HomeFeed::default();
        feed.apply_trending(items(&[1, 2]));
        feed.select_mood(mood::find("chill").unwrap());
        feed.finish_mood("chill", Some(items(&[9])));
        assert_eq!(feed.mood_items[0].id, 9);

        assert_eq!(
            feed.select_mood(mood::find(TRENDING_MOOD).unwrap()),
            MoodChange::Trending
        );
        assert!(!feed.is_mood_loading());
        assert_eq!(feed.mood_items, feed.trending);
    }

    #[test]
    fn stale_mood_result_is_dropped() {
        let mut feed = HomeFeed::default();
        feed.select_mood(mood::find("chill").unwrap());
        feed.select_mood(mood::find("scared").unwrap());

        assert!(!feed.finish_mood("chill", Some(items(&[5]))));
        assert!(feed.is_mood_loading());
        assert!(feed.finish_mood("scared", Some(items(&[6]))));
        assert_eq!(feed.mood_items[0].id, 6);
    }

    #[test]
    fn failed_mood_keeps_last_good_row() {
        let mut feed = HomeFeed::default();
        feed.apply_trending(items(&[1, 2]));
        feed.select_mood(mood::find("romantic").unwrap());

        assert!(feed.finish_mood("romantic", None));
        assert!(!feed.is_mood_loading());
        assert_eq!(feed.mood_items.len(), 2);
    }

    #[test]
    fn sentinel_reveals_two_at_a_time_until_exhausted() {
        let mut feed = HomeFeed::default();
        feed.apply_genres(genres(5));
        assert_eq!(resolve_pending(&mut feed), vec![1, 2]);

        assert!(feed.on_scroll(near_bottom()));
        assert_eq!(resolve_pending(&mut feed), vec![3, 4]);

        assert!(feed.on_scroll(near_bottom()));
        assert_eq!(resolve_pending(&mut feed), vec![5]);
        assert_eq!(feed.visible_genres().len(), 5);

        assert!(!feed.has_more_genres());
        assert!(!feed.on_scroll(near_bottom()));
        assert!(feed.take_unrequested_genres().is_empty());
    }

    #[test]
    fn sentinel_ignores_scroll_far_from_bottom() {
        let mut feed = HomeFeed::default();
        feed.apply_genres(genres(6));
        resolve_pending(&mut feed);

        let far = ScrollMetrics {
            offset_y: 0.0,
            viewport_height: 720.0,
            content_height: 3000.0,
        };
        assert!(!feed.on_scroll(far));
        assert_eq!(feed.visible_genres().len(), 2);
    }

    #[test]
    fn sentinel_waits_for_revealed_rows() {
        let mut feed = HomeFeed::default();
        feed.apply_genres(genres(8));
        resolve_pending(&mut feed);

        assert!(feed.on_scroll(near_bottom()));
        let pending = feed.take_unrequested_genres();
        assert_eq!(pending, vec![3, 4]);

        assert!(!feed.on_scroll(near_bottom()));
        feed.apply_genre_row(3, Vec::new());
        assert!(!feed.on_scroll(near_bottom()));
        feed.apply_genre_row(4, Vec::new());
        assert!(feed.on_scroll(near_bottom()));
        assert_eq!(feed.visible_genres().len(), 6);
    }

    #[test]
    fn find_looks_through_genre_rows() {
        let mut feed = HomeFeed::default();
        feed.apply_trending(items(&[1]));
        feed.apply_genres(genres(2));
        feed.take_unrequested_genres();
        feed.apply_genre_row(2, items(&[42]));

        assert_eq!(feed.find(42).map(|i| i.id), Some(42));
        assert_eq!(feed.find(1).map(|i| i.id), Some(1));
        assert!(feed.find(7).is_none());
    }

    #[test]
    fn no_genres_means_nothing_to_reveal() {
        let mut feed = HomeFeed::default();
        assert!(feed.visible_genres().is_empty());
        assert!(!feed.on_scroll(near_bottom()));
    }
}
