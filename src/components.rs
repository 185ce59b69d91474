use iced::widget::{
    button, column, container, row, scrollable, text, text_input, Column, Row, Space,
};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::cards::RowStyle;
use crate::media::{
    LoadingState, Message, ScrollMetrics, Shelf, MFLIX_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::mood::{Mood, MOODS};
use crate::Mflix;

const ICON_SEARCH: char = '\u{F52A}';
const ICON_X_LG: char = '\u{F659}';
const HEADER_HEIGHT: f32 = 80.0;

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn hidden_vertical_scrollbar_style(
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

fn view_mood_button(
    mood: &'static Mood,
    is_active: bool,
    enabled: bool,
) -> Element<'static, Message> {
    button(text(mood.label).size(14))
        .padding(Padding::new(8.0).left(18.0).right(18.0))
        .style(move |_theme, status| {
            let background = match (is_active, status) {
                (true, _) => MFLIX_RED,
                (false, button::Status::Hovered) => Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                (false, _) => Color::from_rgba(1.0, 1.0, 1.0, 0.08),
            };
            button::Style {
                background: Some(iced::Background::Color(background)),
                text_color: if is_active { TEXT_WHITE } else { TEXT_GRAY },
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    width: 1.0,
                    radius: 20.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press_maybe(enabled.then_some(Message::MoodSelected(mood.id)))
        .into()
}

impl Mflix {
    pub fn view_header(&self) -> Element<'_, Message> {
        let header_content = row![
            self.view_logo(24.0),
            Space::new().width(Length::Fill),
            self.view_search_bar()
        ]
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        let is_scrolled = self.main_scroll_offset > 0.0;

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT))
            .style(move |_theme| {
                if !is_scrolled {
                    container::Style::default()
                } else {
                    container::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            0.0, 0.0, 0.0, 0.8,
                        ))),
                        ..Default::default()
                    }
                }
            })
            .into()
    }

    pub fn view_logo(&self, size: f32) -> Element<'_, Message> {
        text("MFLIX")
            .size(size)
            .color(MFLIX_RED)
            .font(iced::Font {
                weight: iced::font::Weight::Black,
                style: iced::font::Style::Italic,
                ..Default::default()
            })
            .into()
    }

    pub fn view_search_bar(&self) -> Element<'_, Message> {
        let search_icon = icon(ICON_SEARCH).size(14).color(TEXT_GRAY);

        let search_input = text_input("Titles, people, genres", &self.search_query)
            .on_input(Message::SearchQueryChanged)
            .padding(8)
            .width(Length::Fixed(220.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: MFLIX_RED,
            });

        let clear: Element<Message> = if self.search_query.is_empty() {
            Space::new().width(0).height(0).into()
        } else {
            button(icon(ICON_X_LG).size(12).color(TEXT_GRAY))
                .padding(4)
                .style(|_theme, _status| button::Style {
                    background: None,
                    text_color: TEXT_GRAY,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                })
                .on_press(Message::ClearSearch)
                .into()
        };

        container(
            row![search_icon, search_input, clear]
                .spacing(8)
                .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(4.0).left(12.0).right(8.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                0.0, 0.0, 0.0, 0.7,
            ))),
            border: Border {
                color: TEXT_GRAY,
                width: 1.0,
                radius: 24.0.into(),
            },
            ..Default::default()
        })
        .into()
    }

    pub fn view_main_content(&self) -> Element<'_, Message> {
        match self.loading_state {
            LoadingState::Loading => self.view_skeleton_ui(),
            LoadingState::Idle => self.view_idle_state(),
        }
    }

    fn view_idle_state(&self) -> Element<'_, Message> {
        let main_column = if self.search_query.is_empty() {
            self.view_home_rows()
        } else {
            self.view_search_page()
        };

        iced::widget::stack![
            scrollable(main_column)
                .direction(scrollable::Direction::Vertical(
                    scrollable::Scrollbar::new().width(0).scroller_width(0),
                ))
                .on_scroll(|viewport| {
                    Message::MainScrolled(ScrollMetrics {
                        offset_y: viewport.absolute_offset().y,
                        viewport_height: viewport.bounds().height,
                        content_height: viewport.content_bounds().height,
                    })
                })
                .width(Length::Fill)
                .height(Length::Fill)
                .style(hidden_vertical_scrollbar_style),
            self.view_header()
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn view_home_rows(&self) -> Element<'_, Message> {
        let feed = &self.feed;
        let mut rows: Vec<Element<Message>> = vec![self.view_mood_filter()];

        let mood_style = if feed.is_mood_loading() {
            RowStyle::Dimmed
        } else {
            RowStyle::Plain
        };
        rows.push(self.view_row(
            format!("For Your Mood: {}", feed.active_mood().to_uppercase()),
            Shelf::Mood,
            &feed.mood_items,
            mood_style,
        ));
        rows.push(self.view_row(
            String::from("Top 10 Movies Today"),
            Shelf::TopTen,
            feed.trending_top_ten(),
            RowStyle::Ranked,
        ));
        if !feed.popular.is_empty() {
            rows.push(self.view_row(
                String::from("Popular on MFLIX"),
                Shelf::Popular,
                &feed.popular,
                RowStyle::Plain,
            ));
        }
        if !feed.top_rated.is_empty() {
            rows.push(self.view_row(
                String::from("Critically Acclaimed"),
                Shelf::TopRated,
                &feed.top_rated,
                RowStyle::Plain,
            ));
        }
        if let Some(hero) = self.hero.as_ref().filter(|h| !h.similar.is_empty()) {
            rows.push(self.view_row(
                format!("More Like {}", hero.item.title),
                Shelf::Similar,
                &hero.similar,
                RowStyle::Plain,
            ));
        }

        for genre in feed.visible_genres() {
            let title = format!("{} Movies", genre.name);
            match feed.genre_row(genre.id) {
                Some([]) => {}
                Some(items) => rows.push(self.view_row(
                    title,
                    Shelf::Genre(genre.id),
                    items,
                    RowStyle::Plain,
                )),
                None => rows.push(self.view_skeleton_section()),
            }
        }

        rows.push(self.view_sentinel());

        let content = Column::with_children(rows)
            .spacing(48)
            .padding(Padding::new(32.0).left(48.0).right(48.0))
            .width(Length::Fill);

        column![self.view_hero_section(), content, self.view_footer()]
            .width(Length::Fill)
            .into()
    }

    fn view_mood_filter(&self) -> Element<'_, Message> {
        let active = self.feed.active_mood();
        let loading = self.feed.is_mood_loading();

        let buttons: Vec<Element<Message>> = MOODS
            .iter()
            .map(|mood| view_mood_button(mood, mood.id == active, !loading))
            .collect();

        column![
            text("How are you feeling?").size(16).color(TEXT_GRAY),
            Row::with_children(buttons).spacing(12)
        ]
        .spacing(12)
        .into()
    }

    /// Bottom-of-content marker; shows a spinner while genres remain.
    fn view_sentinel(&self) -> Element<'_, Message> {
        let indicator: Element<Message> = if self.feed.has_more_genres() {
            container(Space::new().width(32).height(32))
                .style(|_theme| container::Style {
                    border: Border {
                        color: MFLIX_RED,
                        width: 4.0,
                        radius: 16.0.into(),
                    },
                    ..Default::default()
                })
                .into()
        } else {
            Space::new().width(0).height(0).into()
        };

        container(indicator)
            .width(Length::Fill)
            .height(Length::Fixed(80.0))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(80.0))
            .into()
    }

    fn view_footer(&self) -> Element<'_, Message> {
        let links: Row<Message> = Row::with_children(
            ["Privacy", "Terms", "Help", "Contact"]
                .into_iter()
                .map(|label| text(label).size(12).color(TEXT_GRAY).into()),
        )
        .spacing(32);

        container(
            column![
                self.view_logo(24.0),
                text("The ultimate cinematic experience. Built for the future of entertainment.")
                    .size(14)
                    .color(TEXT_GRAY),
                links
            ]
            .spacing(16)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::new(80.0).left(48.0).right(48.0))
        .center_x(Length::Fill)
        .style(|_theme| container::Style {
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.05),
                width: 1.0,
                radius: 0.0.into(),
            },
            ..Default::default()
        })
        .into()
    }

    fn view_search_page(&self) -> Element<'_, Message> {
        let heading = text(format!("Results for \"{}\"", self.search_query.trim()))
            .size(24)
            .color(TEXT_WHITE);

        column![heading, self.view_search_results_grid()]
            .spacing(24)
            .padding(Padding::new(48.0).top(HEADER_HEIGHT + 24.0))
            .width(Length::Fill)
            .into()
    }
}

impl Mflix {
    pub fn view_skeleton_ui(&self) -> Element<'_, Message> {
        let skeleton_header = row![
            self.view_logo(24.0),
            Space::new().width(Length::Fill),
            container(Space::new().width(220.0).height(36.0)).style(skeleton_style(24.0))
        ]
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        let skeleton_hero = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(500.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            });

        let sections: Vec<Element<Message>> =
            (0..4).map(|_| self.view_skeleton_section()).collect();
        let skeleton_sections = Column::with_children(sections)
            .spacing(24)
            .padding(Padding::new(24.0).left(48.0).right(48.0))
            .width(Length::Fill);

        scrollable(
            column![skeleton_header, skeleton_hero, skeleton_sections]
                .spacing(0)
                .width(Length::Fill),
        )
        .direction(scrollable::Direction::Vertical(
            scrollable::Scrollbar::new().width(0).scroller_width(0),
        ))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(hidden_vertical_scrollbar_style)
        .into()
    }

    pub fn view_skeleton_section(&self) -> Element<'_, Message> {
        let title_skeleton =
            container(Space::new().width(150.0).height(24.0)).style(skeleton_style_alpha(4.0, 0.6));

        let card_skeletons: Vec<Element<Message>> = (0..6)
            .map(|_| {
                container(Space::new().width(150.0).height(225.0))
                    .style(skeleton_style(8.0))
                    .into()
            })
            .collect();

        let cards_row = Row::with_children(card_skeletons)
            .spacing(12)
            .align_y(iced::Alignment::Start);

        column![title_skeleton, cards_row]
            .spacing(16)
            .width(Length::Fill)
            .into()
    }
}

fn skeleton_style(radius: f32) -> impl Fn(&iced::Theme) -> container::Style {
    skeleton_style_alpha(radius, 0.5)
}

fn skeleton_style_alpha(radius: f32, alpha: f32) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(iced::Background::Color(Color::from_rgba(
            0.2, 0.2, 0.2, alpha,
        ))),
        border: Border {
            radius: radius.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}
