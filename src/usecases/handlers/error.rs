//! Error sink: logs every event on the error topic. Errors are recorded, never retried.

use crate::domain::{ErrorEvent, Event, Topic};
use crate::ports::EventHandler;
use crate::pubsub::Bus;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub const ERROR_IDENTITY: &str = "error";

pub struct ErrorSink {
    bus: Arc<Bus>,
}

impl ErrorSink {
    pub fn new(bus: Arc<Bus>) -> Self {
        Self { bus }
    }
}

impl EventHandler for ErrorSink {
    fn identity(&self) -> &str {
        ERROR_IDENTITY
    }

    fn execute_handlers(self: Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut subscription = match self.bus.subscribe(Topic::Error) {
            Ok(s) => s,
            Err(e) => {
                error!(topic = %Topic::Error, error = %e, "error sink subscription failed");
                return Vec::new();
            }
        };

        let task = tokio::spawn(async move {
            loop {
                let envelope = tokio::select! {
                    _ = cancel.cancelled() => break,
                    next = subscription.next() => match next {
                        Some(envelope) => envelope,
                        None => break,
                    },
                };

                match ErrorEvent::decode(envelope.payload()) {
                    Ok(event) => error!(error = %event.error, "reported error"),
                    Err(e) => error!(error = %e, "malformed error envelope"),
                }
                envelope.ack();
            }
            debug!("error sink stopped");
        });
        vec![task]
    }

    /// Errors are always logged; the sink ignores stop commands.
    fn disarm(&self) {}

    fn is_armed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubsub::Settlement;
    use crate::usecases::handlers::send_error;

    #[tokio::test]
    async fn test_acks_reported_and_malformed_errors() {
        let bus = Arc::new(Bus::new());
        let sink = Arc::new(ErrorSink::new(bus.clone()));
        let cancel = CancellationToken::new();
        let tasks = Arc::clone(&sink).execute_handlers(cancel.clone());
        assert_eq!(tasks.len(), 1);

        for r in bus.publish(Topic::Error, b"not json".to_vec()).unwrap() {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }
        let receipts = bus
            .publish_event(&ErrorEvent {
                error: "boom".into(),
            })
            .unwrap();
        for r in receipts {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }

        cancel.cancel();
        for t in tasks {
            t.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_disarm_is_ignored() {
        let sink = ErrorSink::new(Arc::new(Bus::new()));
        sink.disarm();
        assert!(sink.is_armed());
    }

    #[test]
    fn test_send_error_on_closed_bus_does_not_panic() {
        let bus = Bus::new();
        bus.close();
        send_error(&bus, &"late failure");
    }

    #[tokio::test]
    async fn test_closed_bus_starts_no_loop() {
        let bus = Arc::new(Bus::new());
        bus.close();
        let sink = Arc::new(ErrorSink::new(bus));
        assert!(sink.execute_handlers(CancellationToken::new()).is_empty());
    }
}
