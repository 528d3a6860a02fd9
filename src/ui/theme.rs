//! Colors and avatar drawing for the message list.
//!
//! Two palettes are provided (`dark`, `light`). Bubble colors follow the
//! usual chat convention: the viewer's own bubbles use the accent color,
//! everyone else sits on a raised surface.

use eframe::egui::{self, Color32};

#[derive(Clone, Debug)]
pub struct ChatTheme {
    pub name: String,
    /// Raised surface behind incoming bubbles.
    pub incoming: Color32,
    pub accent: Color32,
    pub info: Color32,
    pub text_primary: Color32,
    pub text_on_accent: Color32,
    pub text_muted: Color32,
}

impl ChatTheme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            incoming: Color32::from_rgb(37, 37, 50),
            accent: Color32::from_rgb(88, 101, 242),
            info: Color32::from_rgb(0, 175, 244),
            text_primary: Color32::WHITE,
            text_on_accent: Color32::WHITE,
            text_muted: Color32::from_rgb(114, 118, 125),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            incoming: Color32::from_rgb(236, 237, 240),
            accent: Color32::from_rgb(0, 132, 255),
            info: Color32::from_rgb(0, 120, 200),
            text_primary: Color32::from_rgb(6, 6, 7),
            text_on_accent: Color32::WHITE,
            text_muted: Color32::from_rgb(116, 127, 141),
        }
    }

    /// Palette by settings name; unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Palette matching the current egui visuals.
    pub fn for_ui(ui: &egui::Ui) -> Self {
        if ui.style().visuals.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

const USER_COLORS: [Color32; 12] = [
    Color32::from_rgb(231, 76, 60),   // red
    Color32::from_rgb(46, 204, 113),  // emerald
    Color32::from_rgb(52, 152, 219),  // blue
    Color32::from_rgb(155, 89, 182),  // amethyst
    Color32::from_rgb(241, 196, 15),  // sunflower
    Color32::from_rgb(230, 126, 34),  // carrot
    Color32::from_rgb(26, 188, 156),  // turquoise
    Color32::from_rgb(236, 100, 166), // pink
    Color32::from_rgb(41, 128, 185),  // belize
    Color32::from_rgb(39, 174, 96),   // nephritis
    Color32::from_rgb(22, 160, 133),  // green sea
    Color32::from_rgb(211, 84, 0),    // pumpkin
];

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 1469598103934665603u64;
    for b in s.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211u64);
    }
    hash
}

/// Stable color for a user, keyed by whatever string identifies them.
pub fn user_color(seed: &str) -> Color32 {
    USER_COLORS[(fnv1a(seed) as usize) % USER_COLORS.len()]
}

/// Circular identicon avatar. Users with an avatar URL still get the identicon;
/// image loading is left to custom row renderers.
pub fn render_avatar(ui: &mut egui::Ui, seed: &str, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter();

    painter.circle_filled(rect.center(), size / 2.0, user_color(seed));

    let pattern = identicon_pattern(seed);
    let fg = Color32::from_white_alpha(200);
    let cell = size / 6.0;
    let offset = cell * 0.5;

    for row in 0..5 {
        for col in 0..5 {
            // Mirror left to right.
            let pattern_col = if col < 3 { col } else { 4 - col };
            if pattern & (1 << (row * 3 + pattern_col)) == 0 {
                continue;
            }
            let min = egui::pos2(
                rect.left() + offset + col as f32 * cell,
                rect.top() + offset + row as f32 * cell,
            );
            let center = min + egui::vec2(cell / 2.0, cell / 2.0);
            if (center - rect.center()).length() < size / 2.0 - cell * 0.3 {
                painter.rect_filled(
                    egui::Rect::from_min_size(min, egui::vec2(cell * 0.85, cell * 0.85)),
                    cell * 0.2,
                    fg,
                );
            }
        }
    }

    response
}

/// 15-bit pattern for a 5x5 mirrored identicon; the center column is never empty.
pub fn identicon_pattern(seed: &str) -> u16 {
    (fnv1a(seed) as u16 & 0x7FFF) | 0x0084
}
