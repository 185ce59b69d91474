use iced::Task;

use crate::error::ApiError;
use crate::media::{
    CardKey, Genre, GenreId, LoadingState, MediaDetails, MediaId, MediaItem, MediaType, Message,
    ScrollMetrics,
};
use crate::home::MoodChange;
use crate::mood;
use crate::tmdb::{
    fetch_image_bytes, image_url, load_hero_details, load_secondary_content, ImageSize,
};
use crate::video::{embed_url, TrailerVideo, HOVER_PREVIEW_DELAY};
use crate::{Mflix, SEARCH_DEBOUNCE};

/// Posters requested up front per row; the rest load as rows update.
const EAGER_POSTERS_PER_ROW: usize = 10;

pub fn handle_message(app: &mut Mflix, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::PriorityLoaded(trending, genres) => handle_priority_loaded(app, trending, genres),
        Message::SecondaryLoaded(top_rated, popular) => {
            handle_secondary_loaded(app, top_rated, popular)
        }
        Message::HeroLoaded(result) => handle_hero_loaded(app, *result),
        Message::GenreRowLoaded(id, result) => handle_genre_row_loaded(app, id, result),
        Message::MoodSelected(mood_id) => handle_mood_selected(app, mood_id),
        Message::MoodLoaded(mood_id, result) => handle_mood_loaded(app, mood_id, result),
        Message::MainScrolled(metrics) => handle_main_scrolled(app, metrics),
        Message::HoverCard(key, true) => handle_hover_enter(app, key),
        Message::HoverCard(key, false) => {
            app.previews.leave(key);
            Task::none()
        }
        Message::HoverPreviewElapsed(key, generation) => {
            handle_hover_preview_elapsed(app, key, generation)
        }
        Message::TrailerVideosLoaded(key, result) => {
            handle_trailer_videos_loaded(app, key, result)
        }
        Message::OpenTrailer(key) => handle_open_trailer(app, key),
        Message::OpenHeroTrailer => handle_open_hero_trailer(app),
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::SearchQueryChanged(query) => handle_search_query_changed(app, query),
        Message::SearchDebounceTriggered => handle_search_debounce_triggered(app),
        Message::SearchResultsLoaded(query, result) => {
            handle_search_results(app, query, result)
        }
        Message::ClearSearch => handle_clear_search(app),
    }
}

fn handle_priority_loaded(
    app: &mut Mflix,
    trending: Result<Vec<MediaItem>, ApiError>,
    genres: Result<Vec<Genre>, ApiError>,
) -> Task<Message> {
    app.loading_state = LoadingState::Idle;

    match trending {
        Ok(items) => {
            tracing::info!(count = items.len(), "trending loaded");
            app.feed.apply_trending(items);
        }
        Err(e) => tracing::warn!(error = %e, "trending failed"),
    }
    match genres {
        Ok(genres) => {
            tracing::info!(count = genres.len(), "genres loaded");
            app.feed.apply_genres(genres);
        }
        Err(e) => tracing::warn!(error = %e, "genre list failed"),
    }

    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };

    let mut tasks = vec![
        Task::perform(load_secondary_content(client.clone()), |(top, popular)| {
            Message::SecondaryLoaded(top, popular)
        }),
        request_genre_rows(app),
        load_posters(app, &app.feed.trending),
    ];

    if let Some(featured) = app.feed.trending.iter().find(|i| i.backdrop_path.is_some()) {
        let (id, media_type) = (featured.id, featured.media_type);
        tasks.push(Task::perform(
            load_hero_details(client, id, media_type),
            |result| Message::HeroLoaded(Box::new(result)),
        ));
    }

    Task::batch(tasks)
}

fn handle_secondary_loaded(
    app: &mut Mflix,
    top_rated: Result<Vec<MediaItem>, ApiError>,
    popular: Result<Vec<MediaItem>, ApiError>,
) -> Task<Message> {
    match top_rated {
        Ok(items) => app.feed.top_rated = items,
        Err(e) => tracing::warn!(error = %e, "top rated failed"),
    }
    match popular {
        Ok(items) => app.feed.popular = items,
        Err(e) => tracing::warn!(error = %e, "popular failed"),
    }
    Task::batch([
        load_posters(app, &app.feed.top_rated),
        load_posters(app, &app.feed.popular),
    ])
}

fn handle_hero_loaded(app: &mut Mflix, result: Result<MediaDetails, ApiError>) -> Task<Message> {
    match result {
        Ok(details) => {
            let task = Task::batch([
                load_image(app, details.item.backdrop_path.as_deref(), ImageSize::Backdrop),
                load_posters(app, &details.similar),
            ]);
            app.hero = Some(details);
            task
        }
        Err(e) => {
            tracing::warn!(error = %e, "hero details failed");
            Task::none()
        }
    }
}

/// Fires one discovery request per newly visible genre.
fn request_genre_rows(app: &mut Mflix) -> Task<Message> {
    let Some(client) = &app.tmdb_client else {
        return Task::none();
    };
    let tasks: Vec<Task<Message>> = app
        .feed
        .take_unrequested_genres()
        .into_iter()
        .map(|genre_id| {
            let fetch_client = client.clone();
            Task::perform(
                async move {
                    fetch_client
                        .discover_by_genre(MediaType::Movie, &genre_id.to_string(), 1, None)
                        .await
                },
                move |result| Message::GenreRowLoaded(genre_id, result),
            )
        })
        .collect();
    Task::batch(tasks)
}

fn handle_genre_row_loaded(
    app: &mut Mflix,
    genre_id: GenreId,
    result: Result<Vec<MediaItem>, ApiError>,
) -> Task<Message> {
    let items = result.unwrap_or_else(|e| {
        tracing::warn!(genre_id, error = %e, "genre row failed");
        Vec::new()
    });
    let images = load_posters(app, &items);
    app.feed.apply_genre_row(genre_id, items);

    // A scroll that reached the bottom while this batch was loading is
    // honoured now. Positions taken before a reveal are spent.
    let revealed = app
        .last_scroll
        .is_some_and(|metrics| app.feed.on_scroll(metrics));
    if revealed {
        app.last_scroll = None;
        return Task::batch([images, request_genre_rows(app)]);
    }
    images
}

fn handle_mood_selected(app: &mut Mflix, mood_id: &'static str) -> Task<Message> {
    let Some(mood) = mood::find(mood_id) else {
        return Task::none();
    };
    match app.feed.select_mood(mood) {
        MoodChange::Unchanged | MoodChange::Trending => Task::none(),
        MoodChange::Discover(genres) => {
            let Some(client) = app.tmdb_client.clone() else {
                return Task::none();
            };
            tracing::info!(mood = mood_id, "loading mood row");
            Task::perform(
                async move {
                    client
                        .discover_by_genre(MediaType::Movie, genres, 1, None)
                        .await
                },
                move |result| Message::MoodLoaded(mood_id, result),
            )
        }
    }
}

fn handle_mood_loaded(
    app: &mut Mflix,
    mood_id: &'static str,
    result: Result<Vec<MediaItem>, ApiError>,
) -> Task<Message> {
    let items = match result {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(mood = mood_id, error = %e, "mood row failed");
            None
        }
    };
    if !app.feed.finish_mood(mood_id, items) {
        tracing::debug!(mood = mood_id, "dropping stale mood result");
        return Task::none();
    }
    load_posters(app, &app.feed.mood_items)
}

fn handle_main_scrolled(app: &mut Mflix, metrics: ScrollMetrics) -> Task<Message> {
    app.main_scroll_offset = metrics.offset_y;
    if app.feed.on_scroll(metrics) {
        app.last_scroll = None;
        return request_genre_rows(app);
    }
    app.last_scroll = Some(metrics);
    Task::none()
}

fn find_item(app: &Mflix, id: MediaId) -> Option<&MediaItem> {
    let similar = app.hero.iter().flat_map(|h| &h.similar);
    app.feed
        .find(id)
        .or_else(|| similar.chain(&app.search_results).find(|i| i.id == id))
}

fn handle_hover_enter(app: &mut Mflix, key: CardKey) -> Task<Message> {
    let Some(generation) = app.previews.enter(key) else {
        return Task::none();
    };
    Task::perform(
        async { tokio::time::sleep(HOVER_PREVIEW_DELAY).await },
        move |_| Message::HoverPreviewElapsed(key, generation),
    )
}

fn handle_hover_preview_elapsed(app: &mut Mflix, key: CardKey, generation: u64) -> Task<Message> {
    if !app.previews.timer_elapsed(key, generation) {
        return Task::none();
    }
    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };
    let id = key.id;
    let media_type = find_item(app, id).map(|i| i.media_type).unwrap_or_default();
    tracing::debug!(id, "looking up trailer");
    Task::perform(
        async move { client.videos(media_type, id).await },
        move |result| Message::TrailerVideosLoaded(key, result),
    )
}

fn handle_trailer_videos_loaded(
    app: &mut Mflix,
    key: CardKey,
    result: Result<Vec<TrailerVideo>, ApiError>,
) -> Task<Message> {
    let videos = result.unwrap_or_else(|e| {
        tracing::warn!(id = key.id, error = %e, "trailer lookup failed");
        Vec::new()
    });
    app.previews.videos_loaded(key, &videos);
    if app.previews.active_preview(key).is_none() {
        return Task::none();
    }
    let backdrop = find_item(app, key.id).and_then(|i| i.backdrop_path.clone());
    load_image(app, backdrop.as_deref(), ImageSize::Backdrop)
}

fn handle_open_trailer(app: &mut Mflix, key: CardKey) -> Task<Message> {
    let Some(youtube_key) = app.previews.active_preview(key) else {
        return Task::none();
    };
    if let Err(e) = open::that(embed_url(youtube_key)) {
        tracing::warn!(id = key.id, error = %e, "could not open trailer");
    }
    Task::none()
}

fn handle_open_hero_trailer(app: &mut Mflix) -> Task<Message> {
    let Some(key) = app.hero.as_ref().and_then(|h| h.trailer_key.as_deref()) else {
        return Task::none();
    };
    if let Err(e) = open::that(embed_url(key)) {
        tracing::warn!(error = %e, "could not open hero trailer");
    }
    Task::none()
}

fn load_image(app: &Mflix, path: Option<&str>, size: ImageSize) -> Task<Message> {
    let Some(path) = path else {
        return Task::none();
    };
    let url = image_url(Some(path), size);
    if app.image_cache.needs_load(&url) {
        return Task::done(Message::LoadImage(url));
    }
    Task::none()
}

fn load_posters(app: &Mflix, items: &[MediaItem]) -> Task<Message> {
    Task::batch(
        items
            .iter()
            .take(EAGER_POSTERS_PER_ROW)
            .map(|item| load_image(app, item.poster_path.as_deref(), ImageSize::Poster)),
    )
}

fn handle_load_image(app: &mut Mflix, url: String) -> Task<Message> {
    if !app.image_cache.needs_load(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(ref path) = cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (url, Ok(bytes));
                }
            }
            let result = fetch_image_bytes(url.clone()).await;
            if let (Ok(bytes), Some(path)) = (&result, &cache_path) {
                if let Err(e) = tokio::fs::write(path, bytes).await {
                    tracing::debug!(error = %e, "image not written to disk cache");
                }
            }
            (url, result)
        },
        |(url, result)| {
            let handle = result.map(iced::widget::image::Handle::from_bytes);
            Message::ImageLoaded(url, handle)
        },
    )
}

fn handle_image_loaded(
    app: &mut Mflix,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(e) => {
            tracing::debug!(%url, error = %e, "image failed");
            app.image_cache.release(&url);
        }
    }
    Task::none()
}

fn handle_search_query_changed(app: &mut Mflix, query: String) -> Task<Message> {
    if query.trim().is_empty() {
        return Task::done(Message::ClearSearch);
    }
    app.search_query = query;
    app.search_debounce_timer = Some(std::time::Instant::now());
    Task::none()
}

fn handle_search_debounce_triggered(app: &mut Mflix) -> Task<Message> {
    let Some(timer) = app.search_debounce_timer else {
        return Task::none();
    };
    if timer.elapsed() < SEARCH_DEBOUNCE {
        return Task::none();
    }
    app.search_debounce_timer = None;

    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };
    let query = app.search_query.trim().to_string();
    Task::perform(
        async move {
            let result = client.search(&query, 1).await;
            (query, result)
        },
        |(query, result)| Message::SearchResultsLoaded(query, result),
    )
}

fn handle_search_results(
    app: &mut Mflix,
    query: String,
    result: Result<Vec<MediaItem>, ApiError>,
) -> Task<Message> {
    if query != app.search_query.trim() {
        return Task::none();
    }
    match result {
        Ok(items) => {
            let images = Task::batch(
                items
                    .iter()
                    .map(|item| load_image(app, item.backdrop_path.as_deref(), ImageSize::Still)),
            );
            app.search_results = items;
            images
        }
        Err(e) => {
            tracing::warn!(error = %e, "search failed");
            Task::none()
        }
    }
}

fn handle_clear_search(app: &mut Mflix) -> Task<Message> {
    app.search_query.clear();
    app.search_results.clear();
    app.search_debounce_timer = None;
    Task::none()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use iced::futures::{future, StreamExt};
    use iced_runtime::Action;
    use tokio::time::Instant;

    use super::*;
    use crate::home::HomeFeed;
    use crate::media::{ImageCache, Shelf};
    use crate::mood::TRENDING_MOOD;
    use crate::tmdb::fake::{client_with, CountingTransport};
    use crate::video::HoverPreviews;

    /// Serves as both a result page and a video list.
    fn body() -> serde_json::Value {
        serde_json::json!({
            "results": [
                { "id": 1, "title": "Alien", "key": "abc", "site": "YouTube", "type": "Trailer" }
            ]
        })
    }

    fn app_with(transport: Arc<CountingTransport>) -> Mflix {
        Mflix {
            setup_page: None,
            loading_state: LoadingState::Idle,
            tmdb_client: Some(client_with(transport)),
            feed: HomeFeed::default(),
            hero: None,
            previews: HoverPreviews::new(),
            image_cache: ImageCache::default(),
            search_query: String::new(),
            search_results: Vec::new(),
            search_debounce_timer: None,
            main_scroll_offset: 0.0,
            last_scroll: None,
        }
    }

    fn genres(n: u64) -> Vec<Genre> {
        (1..=n)
            .map(|id| Genre {
                id,
                name: format!("Genre {id}"),
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

    async fn run(task: Task<Message>) -> Vec<Message> {
        let Some(stream) = iced_runtime::task::into_stream(task) else {
            return Vec::new();
        };
        stream
            .filter_map(|action| {
                future::ready(match action {
                    Action::Output(message) => Some(message),
                    _ => None,
                })
            })
            .collect()
            .await
    }

    /// Feeds every message a task produces back into the app until it settles.
    /// Image loads are skipped since they go to the network directly.
    async fn drive(app: &mut Mflix, task: Task<Message>) {
        let mut queue = run(task).await;
        while let Some(message) = queue.pop() {
            if matches!(message, Message::LoadImage(_)) {
                continue;
            }
            let next = handle_message(app, message);
            queue.extend(run(next).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hover_left_early_never_looks_up_trailer() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());
        let card = CardKey::new(Shelf::Popular, 1);

        let timer = handle_message(&mut app, Message::HoverCard(card, true));
        let _ = handle_message(&mut app, Message::HoverCard(card, false));
        drive(&mut app, timer).await;

        assert_eq!(transport.calls(), 0);
        assert_eq!(app.previews.active_preview(card), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sustained_hover_looks_up_trailer_once() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());
        let card = CardKey::new(Shelf::Popular, 1);

        let started = Instant::now();
        let fired = run(handle_message(&mut app, Message::HoverCard(card, true))).await;
        assert!(started.elapsed() >= HOVER_PREVIEW_DELAY);
        assert!(matches!(fired.as_slice(), [Message::HoverPreviewElapsed(k, _)] if *k == card));

        for message in fired {
            let lookup = handle_message(&mut app, message);
            drive(&mut app, lookup).await;
        }
        assert_eq!(transport.calls(), 1);
        assert_eq!(app.previews.active_preview(card), Some("abc"));

        let _ = handle_message(&mut app, Message::HoverCard(card, false));
        let again = handle_message(&mut app, Message::HoverCard(card, true));
        drive(&mut app, again).await;
        assert_eq!(transport.calls(), 1);
        assert!(transport.urls.lock().unwrap()[0].contains("/movie/1/videos?"));
    }

    #[tokio::test(start_paused = true)]
    async fn same_title_in_another_row_is_not_previewed() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());
        let top_ten = CardKey::new(Shelf::TopTen, 1);
        let mood = CardKey::new(Shelf::Mood, 1);

        let timer = handle_message(&mut app, Message::HoverCard(top_ten, true));
        drive(&mut app, timer).await;

        assert_eq!(app.previews.active_preview(top_ten), Some("abc"));
        assert!(!app.previews.is_hovered(mood));
        assert_eq!(app.previews.active_preview(mood), None);
    }

    #[tokio::test]
    async fn reselecting_a_mood_sends_no_request() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());

        let task = handle_message(&mut app, Message::MoodSelected(TRENDING_MOOD));
        assert!(run(task).await.is_empty());
        assert_eq!(transport.calls(), 0);

        let loaded = run(handle_message(&mut app, Message::MoodSelected("scared"))).await;
        assert_eq!(transport.calls(), 1);
        let while_loading = handle_message(&mut app, Message::MoodSelected("scared"));
        assert!(run(while_loading).await.is_empty());

        for message in loaded {
            let _ = handle_message(&mut app, message);
        }
        assert!(!app.feed.is_mood_loading());
        assert_eq!(app.feed.mood_items[0].id, 1);

        let again = handle_message(&mut app, Message::MoodSelected("scared"));
        assert!(run(again).await.is_empty());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn one_scroll_reveals_a_single_batch() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());
        app.feed.apply_genres(genres(19));
        let first_rows = request_genre_rows(&mut app);
        drive(&mut app, first_rows).await;
        assert_eq!(transport.calls(), 2);

        let scrolled = handle_message(&mut app, Message::MainScrolled(near_bottom()));
        drive(&mut app, scrolled).await;

        assert_eq!(app.feed.visible_genres().len(), 4);
        assert_eq!(transport.calls(), 4);
        assert!(app.last_scroll.is_none());

        let scrolled = handle_message(&mut app, Message::MainScrolled(near_bottom()));
        drive(&mut app, scrolled).await;
        assert_eq!(app.feed.visible_genres().len(), 6);
    }

    #[tokio::test]
    async fn scroll_during_loading_reveals_once_rows_land() {
        let transport = CountingTransport::returning(body());
        let mut app = app_with(transport.clone());
        app.feed.apply_genres(genres(19));
        let in_flight = run(request_genre_rows(&mut app)).await;

        let scrolled = handle_message(&mut app, Message::MainScrolled(near_bottom()));
        assert!(run(scrolled).await.is_empty());
        assert_eq!(app.feed.visible_genres().len(), 2);

        for message in in_flight {
            let next = handle_message(&mut app, message);
            drive(&mut app, next).await;
        }

        assert_eq!(app.feed.visible_genres().len(), 4);
        assert_eq!(transport.calls(), 4);
    }
}
