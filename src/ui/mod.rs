//! egui building blocks used by the message container.
//!
//! - `message`: default bubble with run grouping and day separators
//! - `fade`: fade-in-up entrance wrapper
//! - `scroll`: invertible scroll surface
//! - `load_earlier`: built-in "load earlier" control
//! - `theme`: palettes and identicon avatars

pub mod fade;
pub mod load_earlier;
pub mod message;
pub mod scroll;
pub mod theme;

pub use fade::FadeInUp;
pub use load_earlier::LoadEarlier;
pub use message::{is_same_day, is_same_user, MessageBubble};
pub use scroll::{ScrollMetrics, ScrollTo};
pub use theme::ChatTheme;
