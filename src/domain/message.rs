//! Chat boundary types. Mapped from platform updates by the Telegram adapter.
//!
//! No teloxide types here; the core only sees these.

/// A photo attached to an incoming chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatPhoto {
    pub caption: String,
    pub file_id: String,
    pub file_url: String,
    pub file_size: i64,
}

/// Incoming chat message as seen by the command router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender user id, as text. Parsed as a number by the admin filter.
    pub sender_id: String,
    pub text: String,
    /// Text following the command word, e.g. `social` in `/stop social`.
    pub payload: String,
    pub photo: Option<ChatPhoto>,
    pub is_private: bool,
    /// Shared by every item of one multi-photo submission.
    pub album_id: Option<String>,
}

/// One photo inside a flushed album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumItem {
    pub caption: String,
    pub file_id: String,
    pub file_url: String,
    pub file_size: i64,
}

impl From<&ChatPhoto> for AlbumItem {
    fn from(photo: &ChatPhoto) -> Self {
        Self {
            caption: photo.caption.trim().to_string(),
            file_id: photo.file_id.clone(),
            file_url: photo.file_url.clone(),
            file_size: photo.file_size,
        }
    }
}

/// Command entry registered with the chat platform and listed by `/help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    /// Bare command name, without the leading slash.
    pub text: String,
    pub description: String,
}
