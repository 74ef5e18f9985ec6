//! Recording fakes of the outbound ports for unit tests.

use crate::domain::{AlbumItem, BotCommand, ChatPhoto, DomainError};
use crate::ports::{ChatPlatform, SocialClient};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    SetCommands(Vec<BotCommand>),
    Text(i64, String),
    Photo(i64, ChatPhoto),
    Album(i64, Vec<AlbumItem>),
    GetFile(String),
}

#[derive(Default)]
pub struct RecordingChat {
    pub calls: Mutex<Vec<ChatCall>>,
    pub fail_sends: AtomicBool,
    pub fail_files: AtomicBool,
    pub file_content: Vec<u8>,
}

impl RecordingChat {
    pub fn with_file(content: &[u8]) -> Self {
        Self {
            file_content: content.to_vec(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ChatCall) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DomainError::Chat("chat unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatPlatform for RecordingChat {
    async fn set_commands(&self, commands: &[BotCommand]) -> Result<(), DomainError> {
        self.record(ChatCall::SetCommands(commands.to_vec()))
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DomainError> {
        self.record(ChatCall::Text(chat_id, text.to_string()))
    }

    async fn send_photo(&self, chat_id: i64, photo: &ChatPhoto) -> Result<(), DomainError> {
        self.record(ChatCall::Photo(chat_id, photo.clone()))
    }

    async fn send_album(&self, chat_id: i64, items: &[AlbumItem]) -> Result<(), DomainError> {
        self.record(ChatCall::Album(chat_id, items.to_vec()))
    }

    async fn get_file(&self, file_id: &str) -> Result<Vec<u8>, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(ChatCall::GetFile(file_id.to_string()));
        if self.fail_files.load(Ordering::SeqCst) {
            return Err(DomainError::Chat("error downloading image".into()));
        }
        Ok(self.file_content.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialCall {
    Update(String),
    UpdateWithPhoto(String, Vec<u8>),
}

#[derive(Default)]
pub struct RecordingSocial {
    pub calls: Mutex<Vec<SocialCall>>,
    pub fail: AtomicBool,
}

impl RecordingSocial {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SocialCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SocialCall) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Social("couldn't send message to twitter".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SocialClient for RecordingSocial {
    async fn send_update(&self, text: &str) -> Result<(), DomainError> {
        self.record(SocialCall::Update(text.to_string()))
    }

    async fn send_update_with_photo(&self, text: &str, photo: &[u8]) -> Result<(), DomainError> {
        self.record(SocialCall::UpdateWithPhoto(text.to_string(), photo.to_vec()))
    }
}
