//! Implements SocialClient against an X/Twitter-compatible v2 HTTP API.
//!
//! Statuses over the length limit are posted as a reply chain. An attached photo is
//! uploaded first and rides on the first status of the chain.

use crate::domain::DomainError;
use crate::ports::SocialClient;
use crate::shared::chunks::split_chars;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Status length limit, in characters.
pub const STATUS_MAX_LENGTH: usize = 280;

/// Appended to every status of a chain except the last.
const CONTINUATION: &str = "...";

pub struct HttpSocialClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Created {
    data: CreatedData,
}

#[derive(Debug, Deserialize)]
struct CreatedData {
    id: String,
}

impl HttpSocialClient {
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    async fn upload_media(&self, photo: &[u8]) -> Result<String, DomainError> {
        let part = Part::bytes(photo.to_vec())
            .file_name("photo")
            .mime_str(detect_image_type(photo))
            .map_err(social_err)?;
        let form = Form::new()
            .text("media_category", "tweet_image")
            .part("media", part);

        let response = self
            .http
            .post(format!("{}/2/media/upload", self.api_url))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(social_err)?;
        let created: Created = read_created(response, "error uploading media").await?;
        debug!(media_id = %created.data.id, bytes = photo.len(), "media uploaded");
        Ok(created.data.id)
    }

    async fn publish_status(
        &self,
        text: &str,
        media_id: Option<String>,
    ) -> Result<(), DomainError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let mut media_id = media_id;
        let mut reply_to: Option<String> = None;
        for status in status_chunks(text) {
            let mut body = json!({ "text": status });
            if let Some(id) = media_id.take() {
                body["media"] = json!({ "media_ids": [id] });
            }
            if let Some(id) = &reply_to {
                body["reply"] = json!({ "in_reply_to_tweet_id": id });
            }

            let response = self
                .http
                .post(format!("{}/2/tweets", self.api_url))
                .bearer_auth(&self.access_token)
                .json(&body)
                .send()
                .await
                .map_err(social_err)?;
            let created = read_created(response, "error sending status update").await?;
            reply_to = Some(created.data.id);
        }
        Ok(())
    }
}

fn social_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Social(e.to_string())
}

async fn read_created(response: reqwest::Response, context: &str) -> Result<Created, DomainError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DomainError::Social(format!(
            "{}. Response status code: {} and body: {}",
            context,
            status.as_u16(),
            body
        )));
    }
    response.json::<Created>().await.map_err(social_err)
}

/// Split a status into a chain that fits the length limit.
pub fn status_chunks(text: &str) -> Vec<String> {
    if text.chars().count() <= STATUS_MAX_LENGTH {
        return vec![text.to_string()];
    }

    let mut chunks = split_chars(text, STATUS_MAX_LENGTH - CONTINUATION.len());
    let last = chunks.len().saturating_sub(1);
    for chunk in &mut chunks[..last] {
        chunk.push_str(CONTINUATION);
    }
    chunks
}

/// Sniff the image MIME type from magic bytes.
pub fn detect_image_type(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl SocialClient for HttpSocialClient {
    async fn send_update(&self, text: &str) -> Result<(), DomainError> {
        self.publish_status(text, None).await
    }

    async fn send_update_with_photo(&self, text: &str, photo: &[u8]) -> Result<(), DomainError> {
        let media_id = self.upload_media(photo).await?;
        self.publish_status(text, Some(media_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_status_is_single_chunk() {
        assert_eq!(status_chunks("testing"), vec!["testing"]);
        let exact = "a".repeat(STATUS_MAX_LENGTH);
        assert_eq!(status_chunks(&exact), vec![exact.clone()]);
    }

    #[test]
    fn test_long_status_becomes_chain() {
        let long = "b".repeat(300);
        let chunks = status_chunks(&long);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}...", &long[..277]));
        assert_eq!(chunks[1], long[277..]);
        assert!(chunks.iter().all(|c| c.chars().count() <= STATUS_MAX_LENGTH));
    }

    #[test]
    fn test_detect_image_type() {
        assert_eq!(detect_image_type(&[0x89, b'P', b'N', b'G', 0x0D]), "image/png");
        assert_eq!(detect_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(detect_image_type(b"GIF89a"), "image/gif");
        assert_eq!(detect_image_type(b"hello"), "application/octet-stream");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = HttpSocialClient::new("https://api.example.com/", "token");
        assert_eq!(client.api_url, "https://api.example.com");
    }

    #[tokio::test]
    async fn test_blank_status_is_noop() {
        // No request is made, so an unreachable host is fine.
        let client = HttpSocialClient::new("http://127.0.0.1:9", "token");
        assert!(client.send_update("   ").await.is_ok());
    }
}
