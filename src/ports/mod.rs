//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: bus consumers driven by the application
//! - Outbound: called by the application into chat and social infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::EventHandler;
pub use outbound::{ChatPlatform, SocialClient};
