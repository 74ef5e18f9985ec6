//! Implements ChatPlatform using a teloxide Bot.
//!
//! Long texts are split at the 4096-character limit and sent as a reply chain.
//! Albums go out as media groups of at most ten photos.

use crate::domain::{AlbumItem, BotCommand, ChatPhoto, DomainError};
use crate::ports::ChatPlatform;
use crate::shared::chunks::split_chars;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, ReplyParameters};
use tracing::debug;

/// Telegram message length limit, in characters.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Telegram accepts 2..=10 items per media group.
const MAX_MEDIA_GROUP: usize = 10;

pub struct TeloxideChat {
    bot: Bot,
    http: reqwest::Client,
}

impl TeloxideChat {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            http: reqwest::Client::new(),
        }
    }
}

fn chat_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Chat(e.to_string())
}

fn photo_input(file_id: &str, file_url: &str) -> Result<InputFile, DomainError> {
    if !file_id.is_empty() || file_url.is_empty() {
        return Ok(InputFile::file_id(file_id.to_string()));
    }
    let url = file_url.parse().map_err(chat_err)?;
    Ok(InputFile::url(url))
}

#[async_trait]
impl ChatPlatform for TeloxideChat {
    async fn set_commands(&self, commands: &[BotCommand]) -> Result<(), DomainError> {
        let commands: Vec<teloxide::types::BotCommand> = commands
            .iter()
            .map(|c| teloxide::types::BotCommand::new(c.text.clone(), c.description.clone()))
            .collect();
        self.bot.set_my_commands(commands).await.map_err(chat_err)?;
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DomainError> {
        let mut reply_to = None;
        for chunk in split_chars(text, TELEGRAM_MAX_MESSAGE_LEN) {
            let mut req = self.bot.send_message(ChatId(chat_id), chunk);
            if let Some(id) = reply_to {
                req = req.reply_parameters(ReplyParameters::new(id));
            }
            let sent = req.await.map_err(chat_err)?;
            reply_to = Some(sent.id);
        }
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo: &ChatPhoto) -> Result<(), DomainError> {
        let input = photo_input(&photo.file_id, &photo.file_url)?;
        let mut req = self.bot.send_photo(ChatId(chat_id), input);
        if !photo.caption.is_empty() {
            req = req.caption(photo.caption.clone());
        }
        req.await.map_err(chat_err)?;
        Ok(())
    }

    async fn send_album(&self, chat_id: i64, items: &[AlbumItem]) -> Result<(), DomainError> {
        for group in items.chunks(MAX_MEDIA_GROUP) {
            if let [single] = group {
                let photo = ChatPhoto {
                    caption: single.caption.clone(),
                    file_id: single.file_id.clone(),
                    file_url: single.file_url.clone(),
                    file_size: single.file_size,
                };
                self.send_photo(chat_id, &photo).await?;
                continue;
            }

            let mut media = Vec::with_capacity(group.len());
            for item in group {
                let mut photo = InputMediaPhoto::new(photo_input(&item.file_id, &item.file_url)?);
                if !item.caption.is_empty() {
                    photo = photo.caption(item.caption.clone());
                }
                media.push(InputMedia::Photo(photo));
            }
            self.bot
                .send_media_group(ChatId(chat_id), media)
                .await
                .map_err(chat_err)?;
            debug!(chat_id, items = group.len(), "media group sent");
        }
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<Vec<u8>, DomainError> {
        let file = self.bot.get_file(file_id).await.map_err(chat_err)?;
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        let response = self.http.get(&url).send().await.map_err(chat_err)?;
        if !response.status().is_success() {
            return Err(DomainError::Chat(format!(
                "failed to download file: HTTP {}",
                response.status()
            )));
        }
        let data = response.bytes().await.map_err(chat_err)?;
        Ok(data.to_vec())
    }
}
