//! Album aggregation: grouped photo messages arrive one by one with a shared album id
//! and no end marker. Items are buffered per album and a buffer is flushed when an
//! item from a different album arrives.
//!
//! Two tasks: the aggregator (owns the buffer map) and the flusher (performs the
//! grouped send). A trailing album with no successor stays buffered.

use crate::domain::{AlbumItem, ChatMessage};
use crate::ports::ChatPlatform;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A completed album ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumBatch {
    pub album_id: String,
    pub items: Vec<AlbumItem>,
}

/// Buffer state. Confined to the aggregator task.
#[derive(Debug, Default)]
pub struct AlbumAggregator {
    buffers: HashMap<String, Vec<AlbumItem>>,
    last_seen: String,
}

impl AlbumAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one grouped photo. Returns the album closed by this item, if any.
    pub fn push(&mut self, msg: &ChatMessage) -> Option<AlbumBatch> {
        let album_id = msg.album_id.as_deref().filter(|id| !id.is_empty())?;
        let photo = msg.photo.as_ref()?;

        self.buffers
            .entry(album_id.to_string())
            .or_default()
            .push(AlbumItem::from(photo));

        if self.last_seen == album_id {
            return None;
        }

        let previous = std::mem::replace(&mut self.last_seen, album_id.to_string());
        if previous.is_empty() {
            return None;
        }

        self.buffers.remove(&previous).map(|items| AlbumBatch {
            album_id: previous,
            items,
        })
    }

    /// Number of albums still buffered.
    pub fn pending(&self) -> usize {
        self.buffers.len()
    }
}

/// Handle used by the command router to feed grouped photos.
#[derive(Clone)]
pub struct AlbumSender {
    tx: mpsc::UnboundedSender<ChatMessage>,
}

impl AlbumSender {
    pub fn submit(&self, msg: ChatMessage) {
        if self.tx.send(msg).is_err() {
            warn!("album aggregator stopped, dropping grouped photo");
        }
    }
}

/// Spawn the aggregator and flusher tasks. Flushed albums go to `channel`.
pub fn spawn_album_pipeline(
    chat: Arc<dyn ChatPlatform>,
    channel: i64,
    cancel: CancellationToken,
) -> (AlbumSender, Vec<JoinHandle<()>>) {
    let (photo_tx, mut photo_rx) = mpsc::unbounded_channel::<ChatMessage>();
    let (batch_tx, mut batch_rx) = mpsc::unbounded_channel::<AlbumBatch>();

    let aggregator_cancel = cancel.clone();
    let aggregator = tokio::spawn(async move {
        let mut albums = AlbumAggregator::new();
        loop {
            tokio::select! {
                _ = aggregator_cancel.cancelled() => break,
                next = photo_rx.recv() => {
                    let Some(msg) = next else { break };
                    if let Some(batch) = albums.push(&msg) {
                        debug!(
                            album_id = %batch.album_id,
                            items = batch.items.len(),
                            "album complete"
                        );
                        if batch_tx.send(batch).is_err() {
                            break;
                        }
                    }
                }
            }
        }
        if albums.pending() > 0 {
            info!(pending = albums.pending(), "album aggregator stopped with unflushed albums");
        }
    });

    let flusher = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                next = batch_rx.recv() => {
                    let Some(batch) = next else { break };
                    if let Err(e) = chat.send_album(channel, &batch.items).await {
                        error!(album_id = %batch.album_id, error = %e, "album send failed");
                    }
                }
            }
        }
    });

    (AlbumSender { tx: photo_tx }, vec![aggregator, flusher])
}
