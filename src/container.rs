//! The message container: owns the prepared rows, decides when a repaint is
//! needed, and draws the list inside an invertible scroll surface.
//!
//! Data flow per update:
//! 1. The parent calls [`MessageContainer::update`] with new props.
//! 2. If the message list is a new `Arc`, rows are rebuilt and the data source
//!    is replaced (never patched).
//! 3. The entrance animation is switched on once the list grows from a
//!    non-empty state.
//! 4. The return value tells the parent whether anything observable changed.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;

use crate::config::ListSettings;
use crate::data_source::RowDataSource;
use crate::message::{Message, User};
use crate::props::{ContainerProps, MessageProps, Position};
use crate::rows::{prepare_messages, Row, RowKey};
use crate::shallow::ShallowEq;
use crate::ui::fade::FadeInUp;
use crate::ui::load_earlier::LoadEarlier;
use crate::ui::message::MessageBubble;
use crate::ui::scroll::{show_scroll, ScrollMetrics, ScrollPlan, ScrollTo};

/// State derived from props. Replaced wholesale on every update.
#[derive(Clone, Debug, Default)]
pub struct ContainerState {
    pub data_source: RowDataSource,
    pub bubble_animation_enabled: bool,
}

impl ShallowEq for ContainerState {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.data_source.same_handle(&other.data_source)
            && self.bubble_animation_enabled == other.bubble_animation_enabled
    }
}

/// Animation switches on when the list grows from a non-empty list and then
/// stays on.
pub fn animation_enabled_after(enabled: bool, current_len: usize, next_len: usize) -> bool {
    enabled || (next_len > current_len && current_len != 0)
}

/// How many rows (from the newest) are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowWindow {
    limit: usize,
}

impl RowWindow {
    pub fn new(initial: usize) -> Self {
        Self { limit: initial }
    }

    pub fn visible(&self, count: usize) -> usize {
        self.limit.min(count)
    }

    /// Extend by one page. Returns false when every row is already drawn.
    pub fn grow(&mut self, page_size: usize, count: usize) -> bool {
        if self.limit >= count {
            return false;
        }
        self.limit = self.limit.saturating_add(page_size.max(1));
        true
    }
}

/// What happened during one [`MessageContainer::show`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerResponse {
    pub rendered_rows: usize,
    pub load_earlier_clicked: bool,
    pub metrics: ScrollMetrics,
}

/// Per-row bookkeeping that outlives a single frame.
#[derive(Clone, Copy, Debug)]
struct RowMemo {
    /// egui input time at which the row was first drawn.
    mounted_at: f64,
    /// Data source generation the row last warned about.
    warned: Option<u64>,
}

pub struct MessageContainer {
    props: ContainerProps,
    state: ContainerState,
    settings: ListSettings,
    fade: FadeInUp,
    window: RowWindow,
    pending_scroll: Option<ScrollTo>,
    metrics: Option<ScrollMetrics>,
    /// Inverted lists follow new messages only while resting at the newest end.
    pinned: bool,
    /// Pruned to the live rows whenever the rows are rebuilt.
    memo: RefCell<HashMap<egui::Id, RowMemo>>,
}

impl MessageContainer {
    pub fn new(props: ContainerProps, settings: ListSettings) -> Self {
        let data_source = RowDataSource::new().clone_with_rows(prepare_messages(&props.messages));
        Self {
            state: ContainerState {
                data_source,
                bubble_animation_enabled: false,
            },
            fade: FadeInUp::new(
                Duration::from_millis(settings.fade_duration_ms),
                settings.fade_distance,
            ),
            window: RowWindow::new(settings.initial_list_size),
            pending_scroll: None,
            metrics: None,
            pinned: true,
            memo: RefCell::new(HashMap::new()),
            props,
            settings,
        }
    }

    pub fn props(&self) -> &ContainerProps {
        &self.props
    }

    pub fn state(&self) -> &ContainerState {
        &self.state
    }

    pub fn settings(&self) -> &ListSettings {
        &self.settings
    }

    /// Accept new props. Returns whether the list must be repainted.
    pub fn update(&mut self, next_props: ContainerProps) -> bool {
        let mut next_state = self.state.clone();

        let rebuilt = !Arc::ptr_eq(&self.props.messages, &next_props.messages);
        if rebuilt {
            next_state.data_source = self
                .state
                .data_source
                .clone_with_rows(prepare_messages(&next_props.messages));
        }

        next_state.bubble_animation_enabled = animation_enabled_after(
            self.state.bubble_animation_enabled,
            self.props.messages.len(),
            next_props.messages.len(),
        );
        if next_state.bubble_animation_enabled && !self.state.bubble_animation_enabled {
            tracing::debug!("entrance animation enabled");
        }

        let should = self.should_update(&next_props, &next_state);
        self.props = next_props;
        self.state = next_state;
        if rebuilt {
            self.prune_memo();
        }
        should
    }

    /// Drop bookkeeping for rows that are no longer in the list.
    fn prune_memo(&mut self) {
        let live: HashSet<egui::Id> = (0..self.state.data_source.row_count())
            .filter_map(|index| {
                let key = self.state.data_source.key_at(index)?;
                Some(self.row_id(key, index))
            })
            .collect();
        let memo = self.memo.get_mut();
        let before = memo.len();
        memo.retain(|id, _| live.contains(id));
        if memo.len() != before {
            tracing::debug!(dropped = before - memo.len(), "pruned row bookkeeping");
        }
    }

    /// Number of rows with bookkeeping held by the container.
    pub fn tracked_rows(&self) -> usize {
        self.memo.borrow().len()
    }

    /// False only when both props and state are shallow-equal to the current ones.
    pub fn should_update(&self, next_props: &ContainerProps, next_state: &ContainerState) -> bool {
        !(self.props.shallow_eq(next_props) && self.state.shallow_eq(next_state))
    }

    /// Scroll the list on the next frame. In inverted lists `y = 0` is the newest message.
    pub fn scroll_to(&mut self, request: ScrollTo) {
        self.pending_scroll = Some(request);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ContainerResponse {
        let inverted = self.props.scroll_view.inverted;
        let count = self.state.data_source.row_count();
        let visible = self.window.visible(count);

        let (offset, leaves_newest) = match (self.pending_scroll, self.metrics) {
            (Some(request), Some(metrics)) => {
                self.pending_scroll = None;
                (Some(metrics.resolve(request, inverted)), request.y > 0.0)
            }
            _ => (None, false),
        };
        // A jump away from the newest end must not be undone by sticking to the bottom.
        let plan = ScrollPlan {
            offset,
            stick_to_bottom: inverted
                && self.props.scroll_view.stick_to_newest
                && (self.pinned || offset.is_some())
                && !leaves_newest,
            padding: self.metrics.map_or(0.0, |m| m.fill_padding(inverted)),
        };

        let this = &*self;
        let (load_earlier_clicked, metrics) = show_scroll(ui, &this.props.scroll_view, plan, |ui| {
            let mut clicked = false;
            if inverted {
                clicked |= this.render_load_earlier(ui);
                for index in (0..visible).rev() {
                    this.render_row_at(ui, index);
                }
                this.render_footer(ui);
            } else {
                this.render_footer(ui);
                for index in 0..visible {
                    this.render_row_at(ui, index);
                }
                clicked |= this.render_load_earlier(ui);
            }
            clicked
        });

        if self.pending_scroll.is_some() {
            // First frame had no geometry yet.
            ui.ctx().request_repaint();
        }
        if (metrics.fill_padding(inverted) - plan.padding).abs() > 0.5 {
            ui.ctx().request_repaint();
        }
        self.metrics = Some(metrics);
        self.pinned = metrics.distance_to_newest(inverted) <= 1.0;

        if visible < count
            && metrics.distance_to_oldest(inverted) <= self.settings.end_reached_threshold
            && self.window.grow(self.settings.page_size, count)
        {
            tracing::debug!(
                visible = self.window.visible(count),
                total = count,
                "end reached, drawing more rows"
            );
            ui.ctx().request_repaint();
        }

        ContainerResponse {
            rendered_rows: visible,
            load_earlier_clicked,
            metrics,
        }
    }

    fn base_id(&self) -> egui::Id {
        egui::Id::new(("chat_list", self.props.scroll_view.id_salt.as_str()))
    }

    /// Rows are identified by message id so they keep their mount time when
    /// newer messages shift them down.
    fn row_id(&self, key: &RowKey, index: usize) -> egui::Id {
        match key {
            Some(id) => self.base_id().with(("row", id)),
            None => self.base_id().with(("row-without-id", index)),
        }
    }

    fn render_row_at(&self, ui: &mut egui::Ui, index: usize) {
        if let Some((key, row)) = self.state.data_source.row_at(index) {
            self.render_row(ui, key, row, index);
        }
    }

    /// Draw one row with the caller's renderer or the default bubble.
    pub fn render_row(&self, ui: &mut egui::Ui, key: &RowKey, row: &Row, index: usize) {
        let row_id = self.row_id(key, index);
        let message = row.message();
        let now = ui.input(|i| i.time);
        self.warn_malformed(row_id, now, message);

        let patched;
        let current = if message.user.is_none() {
            patched = Message {
                user: Some(User::default()),
                ..message.clone()
            };
            &patched
        } else {
            message
        };

        let props = MessageProps {
            container: &self.props,
            key,
            current,
            previous: row.previous(),
            next: row.next(),
            position: Position::for_message(current, &self.props.user),
        };

        let mounted_at = self
            .memo
            .borrow_mut()
            .entry(row_id)
            .or_insert(RowMemo {
                mounted_at: now,
                warned: None,
            })
            .mounted_at;

        ui.push_id(row_id, |ui| {
            if let Some(render_message) = &self.props.render_message {
                render_message(ui, &props);
            } else if self.state.bubble_animation_enabled {
                self.fade
                    .show(ui, mounted_at, |ui| MessageBubble::new(&props).show(ui));
            } else {
                MessageBubble::new(&props).show(ui);
            }
        });
    }

    /// Warn about missing ids or users once per row per rebuild.
    fn warn_malformed(&self, row_id: egui::Id, now: f64, message: &Message) {
        if !message.is_missing_id() && message.user.is_some() {
            return;
        }
        let generation = self.state.data_source.generation();
        {
            let mut memo = self.memo.borrow_mut();
            let entry = memo.entry(row_id).or_insert(RowMemo {
                mounted_at: now,
                warned: None,
            });
            if entry.warned == Some(generation) {
                return;
            }
            entry.warned = Some(generation);
        }

        let json = serde_json::to_string(message).unwrap_or_default();
        if message.is_missing_id() {
            tracing::warn!(message = %json, "`id` is missing for message");
        }
        if message.user.is_none() {
            tracing::warn!(message = %json, "`user` is missing for message");
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        if let Some(render_footer) = &self.props.render_footer {
            render_footer(ui, &self.props);
        }
    }

    fn render_load_earlier(&self, ui: &mut egui::Ui) -> bool {
        if !self.props.load_earlier {
            return false;
        }
        if let Some(render_load_earlier) = &self.props.render_load_earlier {
            render_load_earlier(ui, &self.props);
            return false;
        }
        LoadEarlier::new(&self.props).show(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;

    fn msgs(ids: &[i64]) -> Vec<Message> {
        ids.iter()
            .map(|&id| Message::new(id, format!("message {}", id), User::new(2, "bob")))
            .collect()
    }

    fn container(ids: &[i64]) -> MessageContainer {
        MessageContainer::new(
            ContainerProps::new(msgs(ids), User::new(1, "me")),
            ListSettings::default(),
        )
    }

    #[test]
    fn test_animation_rule() {
        assert!(!animation_enabled_after(false, 0, 5));
        assert!(animation_enabled_after(false, 5, 6));
        assert!(!animation_enabled_after(false, 5, 5));
        assert!(!animation_enabled_after(false, 5, 4));
        assert!(animation_enabled_after(true, 5, 0));
    }

    #[test]
    fn test_first_load_does_not_animate() {
        let mut c = container(&[]);
        assert!(c.update(c.props().with_messages(msgs(&[3, 2, 1]))));
        assert!(!c.state().bubble_animation_enabled);

        assert!(c.update(c.props().with_messages(msgs(&[4, 3, 2, 1]))));
        assert!(c.state().bubble_animation_enabled);
    }

    #[test]
    fn test_same_props_skip_update() {
        let mut c = container(&[2, 1]);
        let generation = c.state().data_source.generation();
        assert!(!c.update(c.props().clone()));
        assert_eq!(c.state().data_source.generation(), generation);
    }

    #[test]
    fn test_new_messages_arc_forces_update() {
        let mut c = container(&[2, 1]);
        let same_content = c.props().with_messages((*c.props().messages).clone());
        assert!(c.update(same_content));
        assert!(c.state().data_source.changed_keys().is_empty());
        assert!(!c.state().bubble_animation_enabled);
    }

    #[test]
    fn test_other_prop_change_keeps_rows() {
        let mut c = container(&[2, 1]);
        let generation = c.state().data_source.generation();
        let next = ContainerProps {
            load_earlier: true,
            ..c.props().clone()
        };
        assert!(c.update(next));
        assert_eq!(c.state().data_source.generation(), generation);
    }

    #[test]
    fn test_should_update_compares_state() {
        let c = container(&[1]);
        let props = c.props().clone();
        let mut state = c.state().clone();
        assert!(!c.should_update(&props, &state));
        state.bubble_animation_enabled = true;
        assert!(c.should_update(&props, &state));
    }

    #[test]
    fn test_rows_follow_messages() {
        let mut c = container(&[1]);
        c.update(c.props().with_messages(msgs(&[3, 2, 1])));
        let keys: Vec<_> = (0..3)
            .map(|i| c.state().data_source.key_at(i).cloned())
            .collect();
        assert_eq!(
            keys,
            vec![
                Some(Some(MessageId::Int(3))),
                Some(Some(MessageId::Int(2))),
                Some(Some(MessageId::Int(1)))
            ]
        );
    }

    #[test]
    fn test_row_window() {
        let mut window = RowWindow::new(20);
        assert_eq!(window.visible(5), 5);
        assert_eq!(window.visible(50), 20);
        assert!(!window.grow(20, 5));
        assert!(window.grow(20, 50));
        assert_eq!(window.visible(50), 40);
        assert!(window.grow(20, 50));
        assert_eq!(window.visible(50), 50);
        assert!(!window.grow(20, 50));
    }
}
