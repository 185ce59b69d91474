use iced::widget::{button, column, container, row, text, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    truncate_description, MediaDetails, Message, MFLIX_RED, RATING_YELLOW, SURFACE_DARK_GRAY,
    TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::{image_url, ImageSize};
use crate::Mflix;

const HERO_HEIGHT: f32 = 620.0;
const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_STAR_FILL: char = '\u{F586}';

fn format_runtime(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

impl Mflix {
    pub fn view_hero_section(&self) -> Element<'_, Message> {
        match &self.hero {
            Some(details) => self.view_hero_with_content(details),
            None => self.view_hero_backdrop_placeholder(),
        }
    }

    pub fn view_hero_with_content<'a>(&'a self, details: &'a MediaDetails) -> Element<'a, Message> {
        let media_item = &details.item;
        let hero_title = text(&media_item.title)
            .size(48)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let tagline: Element<Message> = match &details.tagline {
            Some(tagline) => text(tagline).size(18).color(TEXT_WHITE).into(),
            None => Space::new().width(0).height(0).into(),
        };

        let hero_description = container(
            text(truncate_description(&media_item.overview, 200))
                .size(16)
                .color(TEXT_GRAY),
        )
        .max_width(500.0);

        let cast: Element<Message> = if details.cast.is_empty() {
            Space::new().width(0).height(0).into()
        } else {
            text(format!("Starring: {}", details.cast.join(", ")))
                .size(14)
                .color(TEXT_GRAY)
                .into()
        };

        let button_row: Element<Message> = if details.trailer_key.is_some() {
            self.view_hero_play_button()
        } else {
            Space::new().width(0).height(0).into()
        };

        let hero_text_content = column![
            hero_title,
            tagline,
            self.view_hero_metadata(details),
            hero_description,
            cast,
            button_row
        ]
        .spacing(16)
        .padding(Padding::new(64.0).left(64.0).right(64.0));

        let hero_left_gradient = container(hero_text_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Center)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(0.0)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.99))
                        .add_stop(0.3, Color::from_rgba(0.0, 0.0, 0.0, 0.9))
                        .add_stop(0.5, Color::from_rgba(0.0, 0.0, 0.0, 0.6))
                        .add_stop(0.7, Color::from_rgba(0.0, 0.0, 0.0, 0.25))
                        .add_stop(0.9, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        let hero_bottom_gradient = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::BLACK)
                        .add_stop(0.12, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        iced::widget::stack![
            self.view_hero_backdrop(details),
            hero_bottom_gradient,
            hero_left_gradient
        ]
        .width(Length::Fill)
        .height(Length::Fixed(HERO_HEIGHT))
        .into()
    }

    fn view_hero_metadata<'a>(&self, details: &'a MediaDetails) -> Element<'a, Message> {
        let media_item = &details.item;
        let mut items: Vec<Element<'a, Message>> = vec![
            row![
                icon(ICON_STAR_FILL).size(14).color(RATING_YELLOW),
                text(media_item.rating_label()).size(14).color(TEXT_WHITE)
            ]
            .spacing(4)
            .align_y(iced::Alignment::Center)
            .into(),
            text(media_item.year_label()).size(14).color(TEXT_GRAY).into(),
        ];

        if let Some(runtime) = details.runtime.filter(|m| *m > 0) {
            items.push(text(format_runtime(runtime)).size(14).color(TEXT_GRAY).into());
        }

        let genres: Vec<&str> = details.genres.iter().take(3).map(|g| g.name.as_str()).collect();
        if !genres.is_empty() {
            items.push(text(genres.join(" • ")).size(14).color(TEXT_GRAY).into());
        }

        items.push(
            container(text(media_item.quality_badge()).size(12).color(TEXT_WHITE))
                .padding(Padding::new(2.0).left(6.0).right(6.0))
                .style(|_theme| container::Style {
                    border: Border {
                        color: TEXT_GRAY,
                        width: 1.0,
                        radius: 2.0.into(),
                    },
                    ..Default::default()
                })
                .into(),
        );

        row(items)
            .spacing(12)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_hero_backdrop(&self, details: &MediaDetails) -> Element<'_, Message> {
        let Some(backdrop_path) = details.item.backdrop_path.as_deref() else {
            return self.view_hero_backdrop_placeholder();
        };
        let url = image_url(Some(backdrop_path), ImageSize::Backdrop);
        let Some(handle) = self.image_cache.get(&url) else {
            return self.view_hero_backdrop_placeholder();
        };
        iced::widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .content_fit(iced::ContentFit::Cover)
            .into()
    }

    fn view_hero_backdrop_placeholder(&self) -> Element<'_, Message> {
        container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }

    fn view_hero_play_button(&self) -> Element<'_, Message> {
        button(
            row![
                icon(ICON_PLAY_FILL).size(14).color(TEXT_WHITE),
                text("Play Trailer").size(16).color(TEXT_WHITE)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(|_theme, status| {
            let background_color = match status {
                button::Status::Hovered => Color::from_rgb(0.698, 0.027, 0.063),
                _ => MFLIX_RED,
            };
            button::Style {
                background: Some(iced::Background::Color(background_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::OpenHeroTrailer)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::format_runtime;

    #[test]
    fn runtime_reads_as_hours_and_minutes() {
        assert_eq!(format_runtime(45), "45m");
        assert_eq!(format_runtime(120), "2h");
        assert_eq!(format_runtime(155), "2h 35m");
    }
}
