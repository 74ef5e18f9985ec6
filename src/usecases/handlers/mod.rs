//! Delivery handlers and the notification control plane.
//!
//! Every handler runs one task per subscribed topic. The manager owns the handler set,
//! starts their loops and disarms them on `CommandEvent`s from the command topic.

pub mod error;
pub mod social;
pub mod telegram;

pub use error::ErrorSink;
pub use social::SocialHandler;
pub use telegram::ChatBroadcastHandler;

use crate::domain::{CommandEvent, DomainError, ErrorEvent, Event, NotificationCommand, Topic};
use crate::ports::EventHandler;
use crate::pubsub::Bus;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Publish `err` on the error topic. Failures here are only logged.
pub fn send_error(bus: &Bus, err: &impl Display) {
    let event = ErrorEvent {
        error: err.to_string(),
    };
    if let Err(e) = bus.publish_event(&event) {
        error!(error = %event.error, publish_error = %e, "could not report error on bus");
    }
}

/// Armed/disarmed flag. Written by the control plane, read by the handler's loops.
#[derive(Debug)]
pub struct NotificationSwitch(AtomicBool);

impl Default for NotificationSwitch {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl NotificationSwitch {
    pub fn disarm(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Subscribe to `E::TOPIC` and spawn the consumer loop.
///
/// Per envelope: malformed payload -> error reported, acked; disarmed -> acked without
/// delivery; delivery failure -> error reported, rejected; success -> acked.
pub(crate) fn consume<E, F, Fut>(
    bus: Arc<Bus>,
    identity: &str,
    switch: Arc<NotificationSwitch>,
    cancel: CancellationToken,
    deliver: F,
) -> Option<JoinHandle<()>>
where
    E: Event + Send + 'static,
    F: Fn(E) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    let topic = E::TOPIC;
    let mut subscription = match bus.subscribe(topic) {
        Ok(s) => s,
        Err(e) => {
            error!(handler = identity, %topic, error = %e, "subscription failed");
            send_error(&bus, &e);
            return None;
        }
    };

    let identity = identity.to_string();
    Some(tokio::spawn(async move {
        loop {
            let envelope = tokio::select! {
                _ = cancel.cancelled() => break,
                next = subscription.next() => match next {
                    Some(envelope) => envelope,
                    None => break,
                },
            };

            let event = match E::decode(envelope.payload()) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        handler = %identity,
                        %topic,
                        envelope_id = %envelope.id(),
                        error = %e,
                        "malformed envelope"
                    );
                    send_error(&bus, &e);
                    envelope.ack();
                    continue;
                }
            };

            if !switch.is_armed() {
                debug!(handler = %identity, %topic, "disarmed, draining envelope");
                envelope.ack();
                continue;
            }

            match deliver(event).await {
                Ok(()) => envelope.ack(),
                Err(e) => {
                    warn!(
                        handler = %identity,
                        %topic,
                        envelope_id = %envelope.id(),
                        error = %e,
                        "delivery failed"
                    );
                    send_error(&bus, &e);
                    envelope.nack();
                }
            }
        }
        debug!(handler = %identity, %topic, "consumer stopped");
    }))
}

/// Owns the delivery handlers and applies notification commands to them.
pub struct HandlersManager {
    bus: Arc<Bus>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl HandlersManager {
    pub fn new(bus: Arc<Bus>, handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self { bus, handlers }
    }

    pub fn handlers(&self) -> &[Arc<dyn EventHandler>] {
        &self.handlers
    }

    /// Start every handler's loops plus the command-topic listener.
    pub fn start_handlers(self: &Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut tasks: Vec<JoinHandle<()>> = self
            .handlers
            .iter()
            .flat_map(|h| Arc::clone(h).execute_handlers(cancel.clone()))
            .collect();
        if let Some(task) = self.listen_commands(cancel) {
            tasks.push(task);
        }
        info!(handlers = self.handlers.len(), tasks = tasks.len(), "handlers started");
        tasks
    }

    /// Disarm every handler the command targets. Returns how many were disarmed.
    ///
    /// Handlers that stay armed after `disarm` (the error sink) are not counted.
    pub fn apply(&self, command: &CommandEvent) -> usize {
        match command.command {
            NotificationCommand::Stop => {
                let mut matched = 0;
                let mut disarmed = 0;
                for h in self.handlers.iter().filter(|h| command.targets(h.identity())) {
                    matched += 1;
                    h.disarm();
                    if h.is_armed() {
                        debug!(handler = h.identity(), "handler ignores stop");
                        continue;
                    }
                    info!(handler = h.identity(), "notifications stopped");
                    disarmed += 1;
                }
                if matched == 0 {
                    warn!(handler = %command.handler, "stop command matched no handler");
                }
                disarmed
            }
        }
    }

    fn listen_commands(self: &Arc<Self>, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let mut subscription = match self.bus.subscribe(Topic::Command) {
            Ok(s) => s,
            Err(e) => {
                error!(topic = %Topic::Command, error = %e, "subscription failed");
                send_error(&self.bus, &e);
                return None;
            }
        };

        let manager = Arc::clone(self);
        Some(tokio::spawn(async move {
            loop {
                let envelope = tokio::select! {
                    _ = cancel.cancelled() => break,
                    next = subscription.next() => match next {
                        Some(envelope) => envelope,
                        None => break,
                    },
                };

                match CommandEvent::decode(envelope.payload()) {
                    Ok(command) => {
                        manager.apply(&command);
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed command envelope");
                        send_error(&manager.bus, &e);
                    }
                }
                envelope.ack();
            }
            debug!("command listener stopped");
        }))
    }
}
