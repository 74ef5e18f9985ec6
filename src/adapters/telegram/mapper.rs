//! Map teloxide messages to domain ChatMessage.

use crate::domain::{ChatMessage, ChatPhoto};
use teloxide::types::{MediaKind, Message, MessageKind};

/// Build the router's view of `msg`. Photos use the largest available size.
pub fn to_chat_message(msg: &Message) -> ChatMessage {
    let text = msg.text().unwrap_or_default().to_string();
    let (photo, album_id) = match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Photo(p) => {
                let photo = p.photo.last().map(|ps| ChatPhoto {
                    caption: p.caption.clone().unwrap_or_default(),
                    file_id: ps.file.id.clone(),
                    file_url: String::new(),
                    file_size: i64::from(ps.file.size),
                });
                (photo, p.media_group_id.clone())
            }
            _ => (None, None),
        },
        _ => (None, None),
    };

    ChatMessage {
        sender_id: msg
            .from
            .as_ref()
            .map(|u| u.id.0.to_string())
            .unwrap_or_default(),
        payload: command_payload(&text),
        text,
        photo,
        is_private: msg.chat.is_private(),
        album_id,
    }
}

/// Text after the command word, e.g. `social` for `/stop social`. Empty for non-commands.
pub fn command_payload(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with('/') {
        return String::new();
    }
    match text.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    }
}
