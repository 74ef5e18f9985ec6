//! In-process publish/subscribe bus.
//!
//! One unbounded channel per subscription. Publishing copies the payload into a fresh
//! envelope for every current subscriber of the topic; nothing is stored for late
//! subscribers.

use crate::domain::{Event, Topic};
use crate::pubsub::envelope::{Envelope, Receipt};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("bus is closed")]
    Closed,

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Default)]
struct Inner {
    closed: bool,
    subscribers: HashMap<Topic, Vec<mpsc::UnboundedSender<Envelope>>>,
}

/// Shared by every component via `Arc<Bus>`; the owner calls `close()` on shutdown.
#[derive(Default)]
pub struct Bus {
    inner: Mutex<Inner>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `payload` to every current subscriber of `topic`.
    ///
    /// Returns one receipt per subscriber reached (empty when nobody listens).
    pub fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<Vec<Receipt>, BusError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(BusError::Closed);
        }

        let id = Uuid::new_v4();
        let mut receipts = Vec::new();
        if let Some(senders) = inner.subscribers.get_mut(&topic) {
            senders.retain(|tx| {
                let (envelope, receipt) = Envelope::new(id, payload.clone());
                match tx.send(envelope) {
                    Ok(()) => {
                        receipts.push(receipt);
                        true
                    }
                    Err(mpsc::error::SendError(undelivered)) => {
                        // Subscriber went away; nobody will settle this one.
                        undelivered.ack();
                        false
                    }
                }
            });
        }

        debug!(%topic, message_id = %id, subscribers = receipts.len(), "published");
        Ok(receipts)
    }

    /// Encode and publish a typed event on its own topic.
    pub fn publish_event<E: Event>(&self, event: &E) -> Result<Vec<Receipt>, BusError> {
        let payload = event.encode()?;
        self.publish(E::TOPIC, payload)
    }

    /// Open a live subscription. Only envelopes published after this call are seen.
    pub fn subscribe(&self, topic: Topic) -> Result<Subscription, BusError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(BusError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        inner.subscribers.entry(topic).or_default().push(tx);
        debug!(%topic, "subscribed");
        Ok(Subscription { rx })
    }

    /// Stop accepting publishes and end every open subscription. Idempotent.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.subscribers.clear();
        debug!("bus closed");
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Stream of envelopes for one topic. Ends when the bus closes.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}
