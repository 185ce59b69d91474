use std::path::PathBuf;

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::media::{BACKGROUND_BLACK, MFLIX_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};

const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    pub api_key: String,
    #[serde(default)]
    pub language: String,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mflix")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn load() -> Result<Option<Self>, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn effective_language(&self) -> String {
        let language = self.language.trim();
        if language.is_empty() {
            String::from(DEFAULT_LANGUAGE)
        } else {
            language.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    ApiKeyChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub api_key: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: String::from(DEFAULT_LANGUAGE),
            error: None,
        }
    }
}

impl SetupPage {
    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::ApiKeyChanged(key) => {
                self.api_key = key;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                if !self.can_submit() {
                    self.error = Some(String::from("API key is required"));
                    return None;
                }
                let mut settings = AppSettings {
                    api_key: self.api_key.trim().to_string(),
                    language: self.language.clone(),
                };
                settings.language = settings.effective_language();
                if let Err(e) = settings.save() {
                    tracing::warn!(error = %e, "failed to save settings");
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                tracing::info!(language = %settings.language, "settings saved");
                Some(settings)
            }
        }
    }

    /// The submit button stays inert until a key has been typed.
    pub fn can_submit(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let heading = row![
            text("MFLIX").size(32).color(MFLIX_RED).font(iced::Font {
                weight: iced::font::Weight::Black,
                style: iced::font::Style::Italic,
                ..Default::default()
            }),
            text("setup").size(18).color(TEXT_GRAY),
        ]
        .spacing(12)
        .align_y(Alignment::End);

        let api_input = text_input("TMDB v3 API key", &self.api_key)
            .on_input(SetupMessage::ApiKeyChanged)
            .on_submit(SetupMessage::Submit)
            .secure(true)
            .padding(10)
            .size(14);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(10)
            .size(14);

        let can_submit = self.can_submit();
        let submit = button(
            container(text("Start browsing").size(15).color(TEXT_WHITE)).center_x(Length::Fill),
        )
        .width(Length::Fill)
        .padding(10)
        .style(move |_theme, status| {
            let bg = match (can_submit, status) {
                (false, _) => SURFACE_DARK_GRAY,
                (true, button::Status::Hovered) => iced::Color::from_rgb(0.7, 0.02, 0.06),
                (true, _) => MFLIX_RED,
            };
            button::Style {
                background: Some(iced::Background::Color(bg)),
                text_color: TEXT_WHITE,
                border: iced::Border::default().rounded(6),
                ..Default::default()
            }
        })
        .on_press_maybe(can_submit.then_some(SetupMessage::Submit));

        let mut panel = column![
            heading,
            labeled("API key", api_input),
            labeled("Language", lang_input),
        ]
        .spacing(20);
        if let Some(err) = &self.error {
            panel = panel.push(text(err).size(13).color(MFLIX_RED));
        }
        panel = panel.push(submit);

        let card = container(panel)
            .width(Length::Fixed(380.0))
            .padding(32)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(iced::Color::from_rgb(
                    0.06, 0.06, 0.06,
                ))),
                border: iced::Border::default()
                    .rounded(10)
                    .color(SURFACE_DARK_GRAY)
                    .width(1.0),
                ..Default::default()
            });

        container(card)
            .center(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}

fn labeled<'a>(
    label: &'a str,
    input: text_input::TextInput<'a, SetupMessage>,
) -> Element<'a, SetupMessage> {
    column![text(label).size(13).color(TEXT_GRAY), input]
        .spacing(6)
        .into()
}
