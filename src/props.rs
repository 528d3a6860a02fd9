//! Inputs of the message container and of individual rows.

use std::fmt;
use std::sync::Arc;

use eframe::egui;

use crate::message::{Message, User};
use crate::rows::RowKey;
use crate::shallow::ShallowEq;

/// Draws one message in place of the default bubble.
pub type RenderMessageFn = Arc<dyn Fn(&mut egui::Ui, &MessageProps<'_>) + Send + Sync>;
/// Draws the footer at the newest end of the list.
pub type RenderFooterFn = Arc<dyn Fn(&mut egui::Ui, &ContainerProps) + Send + Sync>;
/// Draws the "load earlier" control at the oldest end of the list.
pub type RenderLoadEarlierFn = Arc<dyn Fn(&mut egui::Ui, &ContainerProps) + Send + Sync>;
pub type OnLoadEarlierFn = Arc<dyn Fn() + Send + Sync>;

/// Which side of the list a bubble hugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Left,
    Right,
}

impl Position {
    /// `Right` for the viewer's own messages; an absent user is never the viewer.
    pub fn for_message(message: &Message, viewer: &User) -> Self {
        match &message.user {
            Some(author) if author.same_as(viewer) => Position::Right,
            _ => Position::Left,
        }
    }
}

/// Options forwarded to the scroll surface.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollViewProps {
    /// Newest message at the bottom, content grows upward.
    pub inverted: bool,
    /// Keep the view pinned to the newest message while it is already there.
    pub stick_to_newest: bool,
    pub max_height: Option<f32>,
    pub id_salt: String,
}

impl Default for ScrollViewProps {
    fn default() -> Self {
        Self {
            inverted: true,
            stick_to_newest: true,
            max_height: None,
            id_salt: "chat_list".to_string(),
        }
    }
}

impl ShallowEq for ScrollViewProps {
    fn shallow_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// Everything the parent hands to the container.
#[derive(Clone, Default)]
pub struct ContainerProps {
    pub messages: Arc<Vec<Message>>,
    /// The local viewer; their messages are drawn on the right.
    pub user: Arc<User>,
    pub render_footer: Option<RenderFooterFn>,
    pub render_message: Option<RenderMessageFn>,
    pub load_earlier: bool,
    pub is_loading_earlier: bool,
    pub load_earlier_label: Option<String>,
    pub render_load_earlier: Option<RenderLoadEarlierFn>,
    pub scroll_view: ScrollViewProps,
    pub on_load_earlier: Option<OnLoadEarlierFn>,
}

impl ContainerProps {
    pub fn new(messages: Vec<Message>, user: User) -> Self {
        Self {
            messages: Arc::new(messages),
            user: Arc::new(user),
            ..Default::default()
        }
    }

    /// Same props with a new message list.
    pub fn with_messages(&self, messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(messages),
            ..self.clone()
        }
    }
}

impl ShallowEq for ContainerProps {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.messages.shallow_eq(&other.messages)
            && self.user.shallow_eq(&other.user)
            && self.render_footer.shallow_eq(&other.render_footer)
            && self.render_message.shallow_eq(&other.render_message)
            && self.load_earlier.shallow_eq(&other.load_earlier)
            && self.is_loading_earlier.shallow_eq(&other.is_loading_earlier)
            && self.load_earlier_label.shallow_eq(&other.load_earlier_label)
            && self.render_load_earlier.shallow_eq(&other.render_load_earlier)
            && self.scroll_view.shallow_eq(&other.scroll_view)
            && self.on_load_earlier.shallow_eq(&other.on_load_earlier)
    }
}

impl fmt::Debug for ContainerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerProps")
            .field("messages", &self.messages.len())
            .field("user", &self.user)
            .field("render_footer", &self.render_footer.is_some())
            .field("render_message", &self.render_message.is_some())
            .field("load_earlier", &self.load_earlier)
            .field("is_loading_earlier", &self.is_loading_earlier)
            .field("load_earlier_label", &self.load_earlier_label)
            .field("render_load_earlier", &self.render_load_earlier.is_some())
            .field("scroll_view", &self.scroll_view)
            .field("on_load_earlier", &self.on_load_earlier.is_some())
            .finish()
    }
}

/// What a row renderer receives: the container props plus the row itself.
#[derive(Clone, Copy)]
pub struct MessageProps<'a> {
    pub container: &'a ContainerProps,
    pub key: &'a RowKey,
    pub current: &'a Message,
    pub previous: Option<&'a Message>,
    pub next: Option<&'a Message>,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_for_viewer() {
        let me = User::new(1, "me");
        let mine = Message::new(1, "hi", User::new(1, "me"));
        let theirs = Message::new(2, "yo", User::new(2, "them"));
        let orphan = Message {
            id: Some(3.into()),
            ..Default::default()
        };

        assert_eq!(Position::for_message(&mine, &me), Position::Right);
        assert_eq!(Position::for_message(&theirs, &me), Position::Left);
        assert_eq!(Position::for_message(&orphan, &me), Position::Left);
        // An anonymous viewer never owns an anonymous message.
        assert_eq!(Position::for_message(&orphan, &User::default()), Position::Left);
    }

    #[test]
    fn test_props_shallow_eq() {
        let props = ContainerProps::new(vec![Message::new(1, "a", User::new(1, "me"))], User::new(1, "me"));
        assert!(props.shallow_eq(&props.clone()));

        let same_content = props.with_messages((*props.messages).clone());
        assert!(!props.shallow_eq(&same_content));

        let flagged = ContainerProps {
            load_earlier: true,
            ..props.clone()
        };
        assert!(!props.shallow_eq(&flagged));
    }
}
