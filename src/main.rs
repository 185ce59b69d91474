mod cache;
mod cards;
mod components;
mod error;
mod handlers;
mod hero;
mod home;
mod media;
mod mood;
mod settings;
mod tmdb;
mod video;

use std::time::{Duration, Instant};

use iced::widget::container;
use iced::{Element, Font, Length, Size, Subscription, Task, Theme};
use tracing_subscriber::EnvFilter;

use home::HomeFeed;
use media::{ImageCache, LoadingState, MediaDetails, MediaItem, Message, ScrollMetrics, BACKGROUND_BLACK};
use settings::{AppSettings, SetupPage};
use tmdb::{load_priority_content, TmdbClient};
use video::HoverPreviews;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct Mflix {
    pub setup_page: Option<SetupPage>,
    pub loading_state: LoadingState,
    pub tmdb_client: Option<TmdbClient>,
    pub feed: HomeFeed,
    pub hero: Option<MediaDetails>,
    pub previews: HoverPreviews,
    pub image_cache: ImageCache,
    pub search_query: String,
    pub search_results: Vec<MediaItem>,
    pub search_debounce_timer: Option<Instant>,
    pub main_scroll_offset: f32,
    pub last_scroll: Option<ScrollMetrics>,
}

impl Default for Mflix {
    fn default() -> Self {
        Self {
            setup_page: None,
            loading_state: LoadingState::Loading,
            tmdb_client: None,
            feed: HomeFeed::default(),
            hero: None,
            previews: HoverPreviews::new(),
            image_cache: ImageCache::new(),
            search_query: String::new(),
            search_results: Vec::new(),
            search_debounce_timer: None,
            main_scroll_offset: 0.0,
            last_scroll: None,
        }
    }
}

impl Mflix {
    fn new() -> (Self, Task<Message>) {
        let settings = match AppSettings::load() {
            Ok(Some(s)) if s.is_valid() => s,
            Ok(_) => return Self::with_setup_page(),
            Err(e) => {
                tracing::error!(error = %e, "could not read settings");
                return Self::with_setup_page();
            }
        };

        let mut app = Self::default();
        let task = app.initialize_with_settings(settings);
        (app, task)
    }

    fn with_setup_page() -> (Self, Task<Message>) {
        (
            Self {
                setup_page: Some(SetupPage::default()),
                ..Default::default()
            },
            Task::none(),
        )
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        let client = TmdbClient::from_settings(&settings);
        self.tmdb_client = Some(client.clone());
        self.setup_page = None;
        self.loading_state = LoadingState::Loading;

        Task::perform(load_priority_content(client), |(trending, genres)| {
            Message::PriorityLoaded(trending, genres)
        })
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.search_debounce_timer.is_some() {
            return iced::time::every(Duration::from_millis(50))
                .map(|_| Message::SearchDebounceTriggered);
        }
        Subscription::none()
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mflix=info")),
        )
        .init();

    iced::application(Mflix::new, Mflix::update, Mflix::view)
        .title("MFLIX")
        .theme(Mflix::theme)
        .window_size(Size::new(1280.0, 720.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .subscription(Mflix::subscription)
        .run()
}
