//! Invertible scroll surface built on `egui::ScrollArea`.
//!
//! In inverted mode list offsets are measured from the bottom: `y = 0` is the
//! newest message. egui measures from the top, so requests are translated
//! with the previous frame's metrics.

use eframe::egui;

use crate::props::ScrollViewProps;

/// Imperative scroll request, in list coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTo {
    pub y: f32,
}

impl ScrollTo {
    /// Jump to the newest message.
    pub fn newest() -> Self {
        Self { y: 0.0 }
    }
}

/// Geometry of the scroll surface as of the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Includes `padding`.
    pub content_height: f32,
    pub viewport_height: f32,
    /// egui offset from the top.
    pub offset: f32,
    /// Space added above the rows to push a short inverted list down.
    pub padding: f32,
}

impl ScrollMetrics {
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Height of the drawn rows without the top padding.
    pub fn list_height(&self) -> f32 {
        (self.content_height - self.padding).max(0.0)
    }

    /// egui offset for a list-coordinate request.
    pub fn resolve(&self, request: ScrollTo, inverted: bool) -> f32 {
        let y = request.y.max(0.0);
        if inverted {
            (self.max_offset() - y).max(0.0)
        } else {
            y.min(self.max_offset())
        }
    }

    /// Distance from the viewport to the oldest end of the list.
    pub fn distance_to_oldest(&self, inverted: bool) -> f32 {
        if inverted {
            self.offset
        } else {
            (self.max_offset() - self.offset).max(0.0)
        }
    }

    /// Distance from the viewport to the newest end of the list.
    pub fn distance_to_newest(&self, inverted: bool) -> f32 {
        if inverted {
            (self.max_offset() - self.offset).max(0.0)
        } else {
            self.offset
        }
    }

    /// Top padding that lets a short inverted list rest on the bottom edge.
    /// Padded content stays one point shorter than the viewport.
    pub fn fill_padding(&self, inverted: bool) -> f32 {
        if !inverted {
            return 0.0;
        }
        (self.viewport_height - self.list_height() - 1.0).max(0.0)
    }
}

/// Per-frame instructions for [`show_scroll`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPlan {
    /// egui offset to jump to this frame.
    pub offset: Option<f32>,
    /// Keep the view pinned to the bottom edge while content grows.
    pub stick_to_bottom: bool,
    pub padding: f32,
}

/// Show `add_contents` inside the scroll surface following `plan`.
pub fn show_scroll<R>(
    ui: &mut egui::Ui,
    props: &ScrollViewProps,
    plan: ScrollPlan,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> (R, ScrollMetrics) {
    let mut area = egui::ScrollArea::vertical()
        .id_salt(props.id_salt.as_str())
        .auto_shrink([false; 2])
        .stick_to_bottom(plan.stick_to_bottom);
    if let Some(max_height) = props.max_height {
        area = area.max_height(max_height);
    }
    if let Some(offset) = plan.offset {
        area = area.vertical_scroll_offset(offset);
    }

    let output = area.show(ui, |ui| {
        if plan.padding > 0.0 {
            ui.add_space(plan.padding);
        }
        add_contents(ui)
    });
    let metrics = ScrollMetrics {
        content_height: output.content_size.y,
        viewport_height: output.inner_rect.height(),
        offset: output.state.offset.y,
        padding: plan.padding,
    };
    (output.inner, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(offset: f32) -> ScrollMetrics {
        ScrollMetrics {
            content_height: 1000.0,
            viewport_height: 400.0,
            offset,
            padding: 0.0,
        }
    }

    #[test]
    fn test_resolve_inverted() {
        let m = metrics(0.0);
        assert_eq!(m.resolve(ScrollTo::newest(), true), 600.0);
        assert_eq!(m.resolve(ScrollTo { y: 100.0 }, true), 500.0);
        assert_eq!(m.resolve(ScrollTo { y: 5000.0 }, true), 0.0);
    }

    #[test]
    fn test_resolve_upright_clamps() {
        let m = metrics(0.0);
        assert_eq!(m.resolve(ScrollTo { y: 100.0 }, false), 100.0);
        assert_eq!(m.resolve(ScrollTo { y: 5000.0 }, false), 600.0);
        assert_eq!(m.resolve(ScrollTo { y: -3.0 }, false), 0.0);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let m = ScrollMetrics {
            content_height: 100.0,
            viewport_height: 400.0,
            ..Default::default()
        };
        assert_eq!(m.max_offset(), 0.0);
        assert_eq!(m.resolve(ScrollTo::newest(), true), 0.0);
    }

    #[test]
    fn test_fill_padding_ignores_previous_padding() {
        let unpadded = ScrollMetrics {
            content_height: 100.0,
            viewport_height: 400.0,
            ..Default::default()
        };
        assert_eq!(unpadded.fill_padding(true), 299.0);
        assert_eq!(unpadded.fill_padding(false), 0.0);

        let padded = ScrollMetrics {
            content_height: 399.0,
            padding: 299.0,
            ..unpadded
        };
        assert_eq!(padded.list_height(), 100.0);
        assert_eq!(padded.fill_padding(true), 299.0);

        // A list taller than the viewport needs no padding.
        assert_eq!(metrics(0.0).fill_padding(true), 0.0);
    }

    #[test]
    fn test_distance_to_ends() {
        assert_eq!(metrics(50.0).distance_to_oldest(true), 50.0);
        assert_eq!(metrics(50.0).distance_to_oldest(false), 550.0);
        assert_eq!(metrics(50.0).distance_to_newest(true), 550.0);
        assert_eq!(metrics(600.0).distance_to_newest(true), 0.0);
        assert_eq!(metrics(50.0).distance_to_newest(false), 50.0);
    }
}
