use iced::widget::{column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    CardKey, MediaItem, Message, Shelf, MFLIX_RED, RATING_YELLOW, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::{image_url, ImageSize};
use crate::Mflix;

const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_FILM: char = '\u{F3A9}';
const ICON_STAR_FILL: char = '\u{F586}';

const CARD_WIDTH: f32 = 150.0;
const CARD_HEIGHT: f32 = 225.0;
const PREVIEW_WIDTH: f32 = 400.0;
const STILL_WIDTH: f32 = 276.0;
const STILL_HEIGHT: f32 = 155.0;
const CARDS_PER_ROW: usize = 20;
const SEARCH_COLUMNS: usize = 4;
/// Cards at the head of a row that get the TRENDING badge on hover.
const TRENDING_BADGE_SLOTS: usize = 5;

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

fn bold() -> iced::Font {
    iced::Font {
        weight: iced::font::Weight::Bold,
        ..Default::default()
    }
}

fn badge<'a>(label: impl text::IntoFragment<'a>, background: Color) -> Element<'a, Message> {
    container(text(label).size(10).color(TEXT_WHITE).font(bold()))
        .padding(Padding::new(2.0).left(6.0).right(6.0))
        .style(move |_theme| container::Style {
            background: Some(iced::Background::Color(background)),
            border: Border {
                radius: 3.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
}

fn card_style(lifted: bool) -> impl Fn(&iced::Theme) -> container::Style {
    let (alpha, offset, blur) = if lifted { (0.5, 6.0, 12.0) } else { (0.3, 4.0, 8.0) };
    move |_theme| container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, alpha),
            offset: iced::Vector::new(0.0, offset),
            blur_radius: blur,
        },
        ..Default::default()
    }
}

fn hidden_horizontal_scrollbar_style(
    _theme: &iced::Theme,
    _status: scrollable::Status,
) -> scrollable::Style {
    let hidden_rail = || scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    };
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: hidden_rail(),
        horizontal_rail: hidden_rail(),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

/// How a row presents its cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    /// Cards carry their 1-based rank.
    Ranked,
    /// Dimmed while its contents are being replaced; ignores the pointer.
    Dimmed,
}

impl Mflix {
    pub fn view_row<'a>(
        &'a self,
        title: String,
        shelf: Shelf,
        items: &'a [MediaItem],
        style: RowStyle,
    ) -> Element<'a, Message> {
        let section_title = text(title).size(24).color(TEXT_WHITE).font(bold());

        let interactive = style != RowStyle::Dimmed;
        let cards: Vec<Element<Message>> = items
            .iter()
            .take(CARDS_PER_ROW)
            .enumerate()
            .map(|(index, item)| {
                let card = self.view_movie_card(shelf, item, index, interactive);
                if style == RowStyle::Ranked {
                    self.view_ranked(index + 1, card)
                } else {
                    card
                }
            })
            .collect();

        let cards_row = Row::with_children(cards)
            .spacing(16)
            .align_y(iced::Alignment::Start);

        let scrollable_cards = scrollable(cards_row)
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .style(hidden_horizontal_scrollbar_style);

        let section = column![section_title, scrollable_cards]
            .spacing(20)
            .width(Length::Fill);

        if interactive {
            return section.into();
        }

        let veil = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.5,
                ))),
                ..Default::default()
            });
        iced::widget::stack![section, veil].width(Length::Fill).into()
    }

    fn view_ranked<'a>(&self, rank: usize, card: Element<'a, Message>) -> Element<'a, Message> {
        row![
            text(rank.to_string())
                .size(96)
                .color(Color::from_rgba(1.0, 1.0, 1.0, 0.85))
                .font(bold()),
            card
        ]
        .spacing(4)
        .align_y(iced::Alignment::End)
        .into()
    }

    pub fn view_movie_card<'a>(
        &'a self,
        shelf: Shelf,
        media_item: &'a MediaItem,
        index: usize,
        interactive: bool,
    ) -> Element<'a, Message> {
        let key = CardKey::new(shelf, media_item.id);
        let is_hovered = interactive && self.previews.is_hovered(key);

        let artwork = if interactive && self.previews.active_preview(key).is_some() {
            self.view_preview_artwork(media_item, PREVIEW_WIDTH, CARD_HEIGHT)
        } else {
            self.view_poster_artwork(media_item, index, is_hovered)
        };

        let card = column![artwork, self.view_card_info(media_item)]
            .spacing(8)
            .width(Length::Shrink);

        if !interactive {
            return card.into();
        }

        iced::widget::mouse_area(card)
            .on_enter(Message::HoverCard(key, true))
            .on_exit(Message::HoverCard(key, false))
            .on_press(Message::OpenTrailer(key))
            .into()
    }

    fn view_poster_artwork<'a>(
        &'a self,
        media_item: &'a MediaItem,
        index: usize,
        is_hovered: bool,
    ) -> Element<'a, Message> {
        let poster = self.view_card_poster(media_item, CARD_WIDTH, CARD_HEIGHT);

        let trending: Element<Message> = if is_hovered && index < TRENDING_BADGE_SLOTS {
            badge("TRENDING", MFLIX_RED)
        } else {
            Space::new().width(0).height(0).into()
        };
        let badges = row![
            badge(media_item.language_badge(), Color::from_rgba(0.0, 0.0, 0.0, 0.75)),
            Space::new().width(Length::Fill),
            trending
        ]
        .padding(6)
        .width(Length::Fill);

        container(iced::widget::stack![poster, badges])
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_HEIGHT))
            .style(card_style(is_hovered))
            .into()
    }

    /// Hovered card with a trailer: backdrop plus a badge inviting a press.
    fn view_preview_artwork<'a>(
        &'a self,
        media_item: &'a MediaItem,
        width: f32,
        height: f32,
    ) -> Element<'a, Message> {
        let backdrop = self.view_cached_image(
            media_item.backdrop_path.as_deref(),
            ImageSize::Backdrop,
            width,
            height,
        );

        let play_badge = container(
            row![
                icon(ICON_PLAY_FILL).size(12).color(TEXT_WHITE),
                text("PREVIEW").size(11).color(TEXT_WHITE).font(bold())
            ]
            .spacing(6)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(4.0).left(10.0).right(10.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(MFLIX_RED)),
            border: Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        });

        let overlay = container(play_badge)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(10)
            .align_x(iced::alignment::Horizontal::Left)
            .align_y(iced::alignment::Vertical::Bottom)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.8))
                        .add_stop(0.4, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        container(iced::widget::stack![backdrop, overlay])
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .style(card_style(true))
            .into()
    }

    fn view_card_info<'a>(&self, media_item: &'a MediaItem) -> Element<'a, Message> {
        let title = text(&media_item.title)
            .size(14)
            .color(TEXT_WHITE)
            .font(bold())
            .wrapping(text::Wrapping::None);

        let quality = badge(media_item.quality_badge(), Color::from_rgba(1.0, 1.0, 1.0, 0.15));
        let rating = row![
            icon(ICON_STAR_FILL).size(11).color(RATING_YELLOW),
            text(media_item.rating_label()).size(12).color(TEXT_GRAY)
        ]
        .spacing(4)
        .align_y(iced::Alignment::Center);

        let meta = row![
            text(media_item.year_label()).size(12).color(TEXT_GRAY),
            quality,
            rating
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);

        column![title, meta]
            .spacing(4)
            .width(Length::Fixed(CARD_WIDTH))
            .clip(true)
            .into()
    }

    pub fn view_card_poster(
        &self,
        media_item: &MediaItem,
        width: f32,
        height: f32,
    ) -> Element<'_, Message> {
        self.view_cached_image(media_item.poster_path.as_deref(), ImageSize::Poster, width, height)
    }

    fn view_cached_image(
        &self,
        path: Option<&str>,
        size: ImageSize,
        width: f32,
        height: f32,
    ) -> Element<'_, Message> {
        let handle = path.and_then(|p| self.image_cache.get(&image_url(Some(p), size)));

        match handle {
            Some(h) => iced::widget::image(h.clone())
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => self.view_card_placeholder(width, height),
        }
    }

    pub fn view_card_placeholder(&self, width: f32, height: f32) -> Element<'_, Message> {
        container(icon(ICON_FILM).size(48).color(TEXT_GRAY))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }

    pub fn view_search_results_grid(&self) -> Element<'_, Message> {
        if self.search_results.is_empty() {
            let message = if self.search_debounce_timer.is_some() {
                "Searching..."
            } else {
                "No titles match your search"
            };
            return container(text(message).size(18).color(TEXT_GRAY))
                .width(Length::Fill)
                .padding(48)
                .center_x(Length::Fill)
                .into();
        }

        let rows: Vec<Element<Message>> = self
            .search_results
            .chunks(SEARCH_COLUMNS)
            .map(|chunk| {
                Row::with_children(chunk.iter().map(|item| self.view_search_result_card(item)))
                    .spacing(16)
                    .align_y(iced::Alignment::Start)
                    .into()
            })
            .collect();

        Column::with_children(rows)
            .spacing(16)
            .width(Length::Fill)
            .into()
    }

    fn view_search_result_card<'a>(&'a self, media_item: &'a MediaItem) -> Element<'a, Message> {
        let key = CardKey::new(Shelf::Search, media_item.id);
        let lifted = self.previews.is_hovered(key);

        let artwork = if self.previews.active_preview(key).is_some() {
            self.view_preview_artwork(media_item, STILL_WIDTH, STILL_HEIGHT)
        } else {
            let still = self.view_cached_image(
                media_item.backdrop_path.as_deref(),
                ImageSize::Still,
                STILL_WIDTH,
                STILL_HEIGHT,
            );
            let title_overlay = container(
                text(&media_item.title)
                    .size(14)
                    .color(TEXT_WHITE)
                    .font(bold()),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(10)
            .align_y(iced::alignment::Vertical::Bottom)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.85))
                        .add_stop(0.5, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });
            container(iced::widget::stack![still, title_overlay])
                .width(Length::Fixed(STILL_WIDTH))
                .height(Length::Fixed(STILL_HEIGHT))
                .style(card_style(lifted))
                .into()
        };

        iced::widget::mouse_area(artwork)
            .on_enter(Message::HoverCard(key, true))
            .on_exit(Message::HoverCard(key, false))
            .on_press(Message::OpenTrailer(key))
            .into()
    }
}
