//! chat-list: an invertible, diff-aware chat message list for egui.
//!
//! This module re-exports the core components for embedding and testing.

pub mod config;
pub mod container;
pub mod data_source;
pub mod logging;
pub mod message;
pub mod props;
pub mod rows;
pub mod shallow;
pub mod ui;


pub use container::{ContainerResponse, ContainerState, MessageContainer};
pub use message::{Message, MessageId, User};
pub use props::{ContainerProps, MessageProps, Position, ScrollViewProps};
pub use ui::scroll::ScrollTo;
