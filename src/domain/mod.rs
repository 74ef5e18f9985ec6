//! Core domain layer. No external I/O dependencies.
//!
//! Bus events, chat boundary types and errors live here.

pub mod errors;
pub mod events;
pub mod message;

pub use errors::DomainError;
pub use events::{
    CommandEvent, ErrorEvent, Event, NotificationCommand, PhotoEvent, TextEvent, Topic,
};
pub use message::{AlbumItem, BotCommand, ChatMessage, ChatPhoto};
