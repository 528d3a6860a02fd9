//! Built-in "load earlier messages" control.

use eframe::egui;

use crate::props::ContainerProps;
use crate::ui::theme::ChatTheme;

pub const DEFAULT_LABEL: &str = "Load earlier messages";

/// Pill-shaped button drawn at the oldest end of the list. Clicking it calls
/// `on_load_earlier`; while `is_loading_earlier` it shows a spinner instead.
pub struct LoadEarlier<'a> {
    props: &'a ContainerProps,
}

impl<'a> LoadEarlier<'a> {
    pub fn new(props: &'a ContainerProps) -> Self {
        Self { props }
    }

    pub fn label(&self) -> &str {
        self.props
            .load_earlier_label
            .as_deref()
            .unwrap_or(DEFAULT_LABEL)
    }

    /// Returns whether the control was clicked this frame.
    pub fn show(self, ui: &mut egui::Ui) -> bool {
        let theme = ChatTheme::for_ui(ui);
        let mut clicked = false;

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if self.props.is_loading_earlier {
                ui.add(egui::Spinner::new().size(16.0));
                return;
            }
            let button = egui::Button::new(
                egui::RichText::new(self.label())
                    .size(12.0)
                    .color(theme.text_on_accent),
            )
            .fill(theme.text_muted)
            .corner_radius(12.0);

            if ui.add(button).clicked() {
                clicked = true;
            }
        });
        ui.add_space(8.0);

        if clicked {
            tracing::debug!("load earlier requested");
            if let Some(on_load_earlier) = &self.props.on_load_earlier {
                on_load_earlier();
            }
        }
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_defaults() {
        let props = ContainerProps::default();
        assert_eq!(LoadEarlier::new(&props).label(), DEFAULT_LABEL);

        let props = ContainerProps {
            load_earlier_label: Some("Older".into()),
            ..Default::default()
        };
        assert_eq!(LoadEarlier::new(&props).label(), "Older");
    }
}
