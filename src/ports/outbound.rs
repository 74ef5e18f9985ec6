//! Outbound ports. The core calls into the chat platform and the social network.
//!
//! Implemented by adapters.

use crate::domain::{AlbumItem, BotCommand, ChatPhoto, DomainError};

/// Chat platform (Telegram bot) boundary.
#[async_trait::async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Replace the command list shown by chat clients.
    async fn set_commands(&self, commands: &[BotCommand]) -> Result<(), DomainError>;

    /// Send text to a chat. Adapters split text over the platform's length limit.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DomainError>;

    /// Send an already-uploaded photo (by file id) with its caption.
    async fn send_photo(&self, chat_id: i64, photo: &ChatPhoto) -> Result<(), DomainError>;

    /// Send several photos as one grouped post.
    async fn send_album(&self, chat_id: i64, items: &[AlbumItem]) -> Result<(), DomainError>;

    /// Download file content by platform file id.
    async fn get_file(&self, file_id: &str) -> Result<Vec<u8>, DomainError>;
}

/// Social network status API boundary.
#[async_trait::async_trait]
pub trait SocialClient: Send + Sync {
    /// Post a status. Empty text is a no-op.
    async fn send_update(&self, text: &str) -> Result<(), DomainError>;

    /// Upload `photo` and post a status carrying it.
    async fn send_update_with_photo(&self, text: &str, photo: &[u8]) -> Result<(), DomainError>;
}
