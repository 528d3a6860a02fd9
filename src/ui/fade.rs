//! Fade-in-up entrance animation for freshly mounted rows.

use std::time::Duration;

use eframe::egui;

/// Fades contents in while sliding them up by `distance` points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeInUp {
    pub duration: Duration,
    pub distance: f32,
}

impl Default for FadeInUp {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(250),
            distance: 16.0,
        }
    }
}

impl FadeInUp {
    pub fn new(duration: Duration, distance: f32) -> Self {
        Self { duration, distance }
    }

    /// Eased progress in `[0, 1]` after `elapsed` seconds.
    pub fn progress(&self, elapsed: f64) -> f32 {
        let total = self.duration.as_secs_f64();
        if total <= 0.0 || elapsed >= total {
            return 1.0;
        }
        let t = (elapsed.max(0.0) / total) as f32;
        // Ease-out cubic.
        1.0 - (1.0 - t).powi(3)
    }

    /// Draw `add_contents` with the animation applied. `mounted_at` is the
    /// `egui` input time at which the row first appeared.
    pub fn show<R>(
        &self,
        ui: &mut egui::Ui,
        mounted_at: f64,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let now = ui.input(|i| i.time);
        let p = self.progress(now - mounted_at);
        if p >= 1.0 {
            return add_contents(ui);
        }

        ui.ctx().request_repaint();
        ui.scope(|ui| {
            ui.multiply_opacity(p);
            ui.add_space((1.0 - p) * self.distance);
            add_contents(ui)
        })
        .inner
    }
}
