//! Envelope: one acknowledgeable unit of data moving through the bus.
//!
//! Settling consumes the envelope, so a subscriber can ack or reject it at most once.
//! Dropping an unsettled envelope is logged as a leak.

use tokio::sync::oneshot;
use tracing::warn;
use uuid::Uuid;

/// Terminal outcome of a delivered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Acked,
    Rejected,
}

pub struct Envelope {
    id: Uuid,
    payload: Vec<u8>,
    settle: Option<oneshot::Sender<Settlement>>,
}

impl Envelope {
    /// Build an envelope plus the receipt its publisher can await.
    pub fn new(id: Uuid, payload: Vec<u8>) -> (Self, Receipt) {
        let (tx, rx) = oneshot::channel();
        let envelope = Self {
            id,
            payload,
            settle: Some(tx),
        };
        (envelope, Receipt { rx })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Processed successfully.
    pub fn ack(mut self) {
        self.settle(Settlement::Acked);
    }

    /// Processing failed. The bus does not redeliver.
    pub fn nack(mut self) {
        self.settle(Settlement::Rejected);
    }

    fn settle(&mut self, outcome: Settlement) {
        if let Some(tx) = self.settle.take() {
            // Publisher may have dropped its receipt.
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Envelope {
    fn drop(&mut self) {
        if self.settle.is_some() {
            warn!(envelope_id = %self.id, "envelope dropped without ack or reject");
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("payload_len", &self.payload.len())
            .field("settled", &self.settle.is_none())
            .finish()
    }
}

/// Publisher-side view of one delivery.
#[derive(Debug)]
pub struct Receipt {
    rx: oneshot::Receiver<Settlement>,
}

impl Receipt {
    /// Wait for the subscriber to settle. `None` if the envelope was dropped unsettled.
    pub async fn settled(self) -> Option<Settlement> {
        self.rx.await.ok()
    }
}
