//! Default message bubble.
//!
//! Consecutive messages from the same author form a run: the author name is
//! shown on the oldest bubble of the run and the avatar on the newest one.
//! A day separator precedes the first message of each calendar day.

use chrono::Local;
use eframe::egui::{self, Color32};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::{Message, User};
use crate::props::{MessageProps, Position};
use crate::ui::theme::{self, ChatTheme};

const AVATAR_SIZE: f32 = 32.0;
const MAX_BUBBLE_FRACTION: f32 = 0.75;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("URL regex pattern is valid"));

/// Piece of message text, either plain or a link.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TextPiece<'a> {
    Plain(&'a str),
    Link(&'a str),
}

pub(crate) fn split_links(text: &str) -> Vec<TextPiece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in URL_RE.find_iter(text) {
        if m.start() > last {
            pieces.push(TextPiece::Plain(&text[last..m.start()]));
        }
        pieces.push(TextPiece::Link(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        pieces.push(TextPiece::Plain(&text[last..]));
    }
    pieces
}

/// Whether `other` was written by the same author as `current`.
pub fn is_same_user(current: &Message, other: Option<&Message>) -> bool {
    match (current.user.as_ref(), other.and_then(|m| m.user.as_ref())) {
        (Some(a), Some(b)) => !current.system && a.same_as(b),
        _ => false,
    }
}

/// Whether both messages fall on the same local calendar day.
pub fn is_same_day(current: &Message, other: Option<&Message>) -> bool {
    match (current.created_at, other.and_then(|m| m.created_at)) {
        (Some(a), Some(b)) => a.with_timezone(&Local).date_naive() == b.with_timezone(&Local).date_naive(),
        _ => false,
    }
}

fn avatar_seed(user: Option<&User>) -> String {
    user.and_then(|u| u.id.as_ref().map(|id| id.to_string()))
        .or_else(|| user.and_then(|u| u.name.clone()))
        .unwrap_or_default()
}

pub struct MessageBubble<'a> {
    props: &'a MessageProps<'a>,
}

impl<'a> MessageBubble<'a> {
    pub fn new(props: &'a MessageProps<'a>) -> Self {
        Self { props }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let theme = ChatTheme::for_ui(ui);
        let current = self.props.current;

        if current.created_at.is_some() && !is_same_day(current, self.props.previous) {
            render_day(ui, current, &theme);
        }

        if current.system {
            render_system(ui, current, &theme);
            return;
        }

        ui.add_space(if is_same_user(current, self.props.previous) { 2.0 } else { 8.0 });

        match self.props.position {
            Position::Left => {
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Max), |ui| {
                    ui.add_space(8.0);
                    if is_same_user(current, self.props.next) {
                        ui.add_space(AVATAR_SIZE);
                    } else {
                        theme::render_avatar(ui, &avatar_seed(current.user.as_ref()), AVATAR_SIZE);
                    }
                    ui.add_space(6.0);
                    self.render_bubble(ui, &theme);
                });
            }
            Position::Right => {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Max), |ui| {
                    ui.add_space(8.0);
                    self.render_bubble(ui, &theme);
                });
            }
        }
    }

    fn render_bubble(&self, ui: &mut egui::Ui, theme: &ChatTheme) {
        let current = self.props.current;
        let (fill, text_color) = match self.props.position {
            Position::Left => (theme.incoming, theme.text_primary),
            Position::Right => (theme.accent, theme.text_on_accent),
        };
        let max_width = ui.available_width() * MAX_BUBBLE_FRACTION;

        egui::Frame::new()
            .fill(fill)
            .corner_radius(12.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                    if self.props.position == Position::Left && !is_same_user(current, self.props.previous) {
                        if let Some(user) = &current.user {
                            let name = user.display_name();
                            if !name.is_empty() {
                                ui.label(
                                    egui::RichText::new(name)
                                        .size(12.0)
                                        .strong()
                                        .color(theme::user_color(&avatar_seed(Some(user)))),
                                );
                            }
                        }
                    }

                    render_text(ui, &current.text, text_color, theme);

                    if let Some(created_at) = current.created_at {
                        ui.label(
                            egui::RichText::new(created_at.with_timezone(&Local).format("%H:%M").to_string())
                                .size(10.0)
                                .color(Color32::from_white_alpha(120)),
                        );
                    }
                });
            });
    }
}

fn render_text(ui: &mut egui::Ui, text: &str, color: Color32, theme: &ChatTheme) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for piece in split_links(text) {
            match piece {
                TextPiece::Plain(s) => {
                    ui.label(egui::RichText::new(s).size(14.0).color(color));
                }
                TextPiece::Link(url) => {
                    ui.hyperlink_to(egui::RichText::new(url).size(14.0).color(theme.info), url);
                }
            }
        }
    });
}

fn render_day(ui: &mut egui::Ui, msg: &Message, theme: &ChatTheme) {
    let Some(created_at) = msg.created_at else {
        return;
    };
    ui.add_space(10.0);
    ui.vertical_centered(|ui| {
        ui.label(
            egui::RichText::new(created_at.with_timezone(&Local).format("%A, %B %-d").to_string())
                .size(11.0)
                .strong()
                .color(theme.text_muted),
        );
    });
    ui.add_space(4.0);
}

fn render_system(ui: &mut egui::Ui, msg: &Message, theme: &ChatTheme) {
    ui.add_space(6.0);
    ui.vertical_centered(|ui| {
        ui.label(
            egui::RichText::new(&msg.text)
                .size(12.0)
                .italics()
                .color(theme.text_muted),
        );
    });
    ui.add_space(6.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn from(user: i64, id: i64) -> Message {
        Message::new(id, "hello", User::new(user, format!("user{}", user)))
    }

    #[test]
    fn test_split_links() {
        let pieces = split_links("see https://example.com/a?b=1 and http://x.y now");
        assert_eq!(
            pieces,
            vec![
                TextPiece::Plain("see "),
                TextPiece::Link("https://example.com/a?b=1"),
                TextPiece::Plain(" and "),
                TextPiece::Link("http://x.y"),
                TextPiece::Plain(" now"),
            ]
        );
        assert_eq!(split_links("plain"), vec![TextPiece::Plain("plain")]);
        assert!(split_links("").is_empty());
    }

    #[test]
    fn test_is_same_user() {
        let a1 = from(1, 1);
        let a2 = from(1, 2);
        let b = from(2, 3);
        assert!(is_same_user(&a1, Some(&a2)));
        assert!(!is_same_user(&a1, Some(&b)));
        assert!(!is_same_user(&a1, None));

        let system = Message::system(4, "alice joined");
        assert!(!is_same_user(&system, Some(&a1)));
    }

    #[test]
    fn test_is_same_day() {
        let noon = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let a = from(1, 1).with_created_at(noon);
        let b = from(1, 2).with_created_at(noon + Duration::minutes(5));
        let c = from(1, 3).with_created_at(noon + Duration::days(2));
        assert!(is_same_day(&a, Some(&b)));
        assert!(!is_same_day(&a, Some(&c)));
        assert!(!is_same_day(&a, None));
    }

    #[test]
    fn test_avatar_seed_prefers_id() {
        assert_eq!(avatar_seed(Some(&User::new(7, "zed"))), "7");
        let nameless = User {
            name: Some("anon".into()),
            ..Default::default()
        };
        assert_eq!(avatar_seed(Some(&nameless)), "anon");
        assert_eq!(avatar_seed(None), "");
    }
}
