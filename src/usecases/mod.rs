//! Application use cases. Routing, authorization, aggregation and delivery via ports.

pub mod album;
pub mod filters;
pub mod handlers;
pub mod router;

pub use album::{AlbumAggregator, AlbumSender, spawn_album_pipeline};
pub use handlers::{ChatBroadcastHandler, ErrorSink, HandlersManager, SocialHandler};
pub use router::{CommandRouter, RouterConfig, Trigger};
