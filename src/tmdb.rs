use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::error::ApiError;
use crate::media::{
    Genre, MediaDetails, MediaId, MediaItem, MediaType, TimeWindow, TmdbMediaResult,
    TmdbPage,
};
use crate::settings::AppSettings;
use crate::video::{select_trailer, TrailerVideo, VideosResponse};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/500/750?grayscale";
const DEFAULT_SORT: &str = "popularity.desc";

#[derive(Debug, Clone, Copy)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Still,
}

impl ImageSize {
    fn path(self) -> &'static str {
        match self {
            ImageSize::Poster => "w500",
            ImageSize::Backdrop => "w1280",
            ImageSize::Still => "w300",
        }
    }
}

pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}/{}{}", IMAGE_BASE_URL, size.path(), p),
        _ => String::from(PLACEHOLDER_IMAGE),
    }
}

/// Performs the actual GET for the client; swapped out in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, ApiError>;
}

pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, ApiError> {
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    language: String,
    base_url: String,
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache<Arc<Value>>>,
}

impl TmdbClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self::with_transport(api_key, language, BASE_URL, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(
        api_key: String,
        language: String,
        base_url: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_key,
            language,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            cache: Arc::new(ResponseCache::default()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.effective_language())
    }

    /// Builds the request URL. Extra parameters are ordered by name so the
    /// URL doubles as a normalized cache key.
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut extra: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        extra.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

        let mut query = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        query.extend(extra);

        Url::parse_with_params(&format!("{}{}", self.base_url, endpoint), &query)
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// Fetches `endpoint` and returns the shared parsed payload. Identical
    /// requests inside the cache TTL return the same `Arc` without touching
    /// the network.
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Arc<Value>, ApiError> {
        let url = self.build_url(endpoint, params)?;
        let cache_key = url.as_str().to_string();

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(endpoint, "cache hit");
            return Ok(cached);
        }

        tracing::debug!(endpoint, "fetching");
        let payload = Arc::new(self.transport.get_json(&url).await?);
        self.cache.insert(cache_key, payload.clone());
        Ok(payload)
    }

    async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let payload = self.fetch(endpoint, params).await?;
        Ok(T::deserialize(&*payload)?)
    }

    async fn fetch_items(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<MediaItem>, ApiError> {
        let page: TmdbPage = self.fetch_as(endpoint, params).await?;
        Ok(page.into_items())
    }

    /// `media_type` of `None` means the combined movie + tv feed.
    pub async fn trending(
        &self,
        media_type: Option<MediaType>,
        window: TimeWindow,
        page: u32,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let kind = media_type.map(MediaType::path).unwrap_or("all");
        self.fetch_items(
            &format!("/trending/{}/{}", kind, window.path()),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn top_rated(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> Result<Vec<MediaItem>, ApiError> {
        self.fetch_items(
            &format!("/{}/top_rated", media_type.path()),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn popular(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> Result<Vec<MediaItem>, ApiError> {
        self.fetch_items(
            &format!("/{}/popular", media_type.path()),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn details(
        &self,
        media_type: MediaType,
        id: MediaId,
    ) -> Result<MediaDetails, ApiError> {
        let payload = self
            .fetch(
                &format!("/{}/{}", media_type.path(), id),
                &[("append_to_response", String::from("videos,credits,similar"))],
            )
            .await?;
        parse_details(&payload, media_type)
    }

    pub async fn videos(
        &self,
        media_type: MediaType,
        id: MediaId,
    ) -> Result<Vec<TrailerVideo>, ApiError> {
        let response: VideosResponse = self
            .fetch_as(&format!("/{}/{}/videos", media_type.path(), id), &[])
            .await?;
        Ok(response.results)
    }

    pub async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, ApiError> {
        let response: GenreListResponse = self
            .fetch_as(&format!("/genre/{}/list", media_type.path()), &[])
            .await?;
        Ok(response.genres)
    }

    /// `genre_ids` is a TMDB filter expression such as `"28,12"`.
    pub async fn discover_by_genre(
        &self,
        media_type: MediaType,
        genre_ids: &str,
        page: u32,
        sort_by: Option<&str>,
    ) -> Result<Vec<MediaItem>, ApiError> {
        self.fetch_items(
            &format!("/discover/{}", media_type.path()),
            &[
                ("with_genres", genre_ids.to_string()),
                ("sort_by", sort_by.unwrap_or(DEFAULT_SORT).to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// Multi search; people are dropped from the results.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<MediaItem>, ApiError> {
        let page: TmdbPage = self
            .fetch_as(
                "/search/multi",
                &[("query", query.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(page
            .results
            .into_iter()
            .filter(|r| r.media_type.as_deref() != Some("person"))
            .map(MediaItem::from)
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct TmdbDetailsExtra {
    tagline: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    episode_run_time: Vec<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    credits: Option<TmdbCredits>,
    similar: Option<TmdbPage>,
    videos: Option<VideosResponse>,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCastMember {
    name: String,
    #[serde(default)]
    order: u32,
}

fn parse_details(payload: &Value, media_type: MediaType) -> Result<MediaDetails, ApiError> {
    let mut item = MediaItem::from(TmdbMediaResult::deserialize(payload)?);
    item.media_type = media_type;
    let extra = TmdbDetailsExtra::deserialize(payload)?;

    let mut cast = extra.credits.map(|c| c.cast).unwrap_or_default();
    cast.sort_by_key(|c| c.order);

    Ok(MediaDetails {
        tagline: extra.tagline.filter(|t| !t.is_empty()),
        runtime: extra
            .runtime
            .or_else(|| extra.episode_run_time.first().copied()),
        genres: extra.genres,
        cast: cast.into_iter().take(3).map(|c| c.name).collect(),
        similar: extra.similar.map(TmdbPage::into_items).unwrap_or_default(),
        trailer_key: extra
            .videos
            .as_ref()
            .and_then(|v| select_trailer(&v.results))
            .map(|v| v.key.clone()),
        item,
    })
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

pub async fn load_priority_content(
    client: TmdbClient,
) -> (Result<Vec<MediaItem>, ApiError>, Result<Vec<Genre>, ApiError>) {
    tracing::info!("loading trending and genres");
    tokio::join!(
        client.trending(None, TimeWindow::Week, 1),
        client.genres(MediaType::Movie),
    )
}

pub async fn load_secondary_content(
    client: TmdbClient,
) -> (Result<Vec<MediaItem>, ApiError>, Result<Vec<MediaItem>, ApiError>) {
    tracing::info!("loading top rated and popular");
    tokio::join!(
        client.top_rated(MediaType::Movie, 1),
        client.popular(MediaType::Movie, 1),
    )
}

pub async fn load_hero_details(
    client: TmdbClient,
    id: MediaId,
    media_type: MediaType,
) -> Result<MediaDetails, ApiError> {
    client.details(media_type, id).await
}

/// In-memory transport that counts requests, shared by client and handler tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use reqwest::Url;
    use serde_json::Value;

    use super::{TmdbClient, Transport};
    use crate::error::ApiError;

    #[derive(Default)]
    pub struct CountingTransport {
        calls: AtomicUsize,
        pub urls: Mutex<Vec<String>>,
        body: Value,
    }

    impl CountingTransport {
        pub fn returning(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body,
                ..Default::default()
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn get_json(&self, url: &Url) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    pub fn client_with(transport: Arc<CountingTransport>) -> TmdbClient {
        TmdbClient::with_transport(
            String::from("test-key"),
            String::from("en-US"),
            "https://api.example.test/3",
            transport,
        )
    }
}
