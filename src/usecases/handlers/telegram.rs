//! Chat broadcast handler: re-posts texts and photos to the broadcast channel.

use crate::domain::{ChatPhoto, PhotoEvent, TextEvent};
use crate::ports::{ChatPlatform, EventHandler};
use crate::pubsub::Bus;
use crate::usecases::handlers::{NotificationSwitch, consume};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const TELEGRAM_IDENTITY: &str = "telegram";

#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    pub channel: i64,
}

pub struct ChatBroadcastHandler {
    config: BroadcastConfig,
    chat: Arc<dyn ChatPlatform>,
    bus: Arc<Bus>,
    switch: Arc<NotificationSwitch>,
}

impl ChatBroadcastHandler {
    pub fn new(config: BroadcastConfig, chat: Arc<dyn ChatPlatform>, bus: Arc<Bus>) -> Self {
        Self {
            config,
            chat,
            bus,
            switch: Arc::new(NotificationSwitch::default()),
        }
    }
}

impl EventHandler for ChatBroadcastHandler {
    fn identity(&self) -> &str {
        TELEGRAM_IDENTITY
    }

    fn execute_handlers(self: Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let channel = self.config.channel;

        let text_chat = Arc::clone(&self.chat);
        let text = consume(
            Arc::clone(&self.bus),
            TELEGRAM_IDENTITY,
            Arc::clone(&self.switch),
            cancel.clone(),
            move |event: TextEvent| {
                let chat = Arc::clone(&text_chat);
                async move { chat.send_text(channel, &event.text).await }
            },
        );

        let photo_chat = Arc::clone(&self.chat);
        let photo = consume(
            Arc::clone(&self.bus),
            TELEGRAM_IDENTITY,
            Arc::clone(&self.switch),
            cancel,
            move |event: PhotoEvent| {
                let chat = Arc::clone(&photo_chat);
                async move {
                    let photo = ChatPhoto {
                        caption: event.caption,
                        file_id: event.file_id,
                        file_url: event.file_url,
                        file_size: event.file_size,
                    };
                    chat.send_photo(channel, &photo).await
                }
            },
        );

        text.into_iter().chain(photo).collect()
    }

    fn disarm(&self) {
        self.switch.disarm();
    }

    fn is_armed(&self) -> bool {
        self.switch.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorEvent, Event, Topic};
    use crate::pubsub::Settlement;
    use crate::testing::{ChatCall, RecordingChat};
    use std::sync::atomic::Ordering;

    const CHANNEL: i64 = 987654;

    fn start(chat: Arc<RecordingChat>) -> (Arc<Bus>, Arc<ChatBroadcastHandler>, CancellationToken) {
        let bus = Arc::new(Bus::new());
        let handler = Arc::new(ChatBroadcastHandler::new(
            BroadcastConfig { channel: CHANNEL },
            chat,
            bus.clone(),
        ));
        let cancel = CancellationToken::new();
        let tasks = Arc::clone(&handler).execute_handlers(cancel.clone());
        assert_eq!(tasks.len(), 2);
        (bus, handler, cancel)
    }

    #[tokio::test]
    async fn test_text_broadcast_to_channel() {
        let chat = Arc::new(RecordingChat::default());
        let (bus, _h, cancel) = start(chat.clone());

        for r in bus.publish_event(&TextEvent { text: "hello".into() }).unwrap() {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }
        assert_eq!(chat.calls(), vec![ChatCall::Text(CHANNEL, "hello".into())]);
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_photo_broadcast_by_file_id() {
        let chat = Arc::new(RecordingChat::default());
        let (bus, _h, cancel) = start(chat.clone());

        let event = PhotoEvent {
            caption: "testing".into(),
            file_id: "blablabla".into(),
            file_url: "http://myimage.com/test.jpg".into(),
            file_size: 1234,
            file_content: vec![9; 4],
        };
        for r in bus.publish_event(&event).unwrap() {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }
        assert_eq!(
            chat.calls(),
            vec![ChatCall::Photo(
                CHANNEL,
                ChatPhoto {
                    caption: "testing".into(),
                    file_id: "blablabla".into(),
                    file_url: "http://myimage.com/test.jpg".into(),
                    file_size: 1234,
                }
            )]
        );
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_send_failure_rejects() {
        let chat = Arc::new(RecordingChat::default());
        chat.fail_sends.store(true, Ordering::SeqCst);
        let (bus, _h, cancel) = start(chat.clone());

        for r in bus.publish(Topic::Text, br#"{"text":"x"}"#.to_vec()).unwrap() {
            assert_eq!(r.settled().await, Some(Settlement::Rejected));
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_malformed_photo_acked_with_one_error() {
        let chat = Arc::new(RecordingChat::default());
        let (bus, _h, cancel) = start(chat.clone());
        let mut errors = bus.subscribe(Topic::Error).unwrap();

        let receipts = bus
            .publish(Topic::Photo, br#"{"caption":"x","fileSize":"big"}"#.to_vec())
            .unwrap();
        assert_eq!(receipts.len(), 1);
        for r in receipts {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }

        let envelope = errors.next().await.unwrap();
        assert!(ErrorEvent::decode(envelope.payload()).is_ok());
        envelope.ack();
        bus.close();
        assert!(errors.next().await.is_none());
        assert!(chat.calls().is_empty());
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_disarmed_sends_nothing() {
        let chat = Arc::new(RecordingChat::default());
        let (bus, handler, cancel) = start(chat.clone());
        handler.disarm();

        for r in bus.publish_event(&TextEvent { text: "hello".into() }).unwrap() {
            assert_eq!(r.settled().await, Some(Settlement::Acked));
        }
        assert!(chat.calls().is_empty());
        cancel.cancel();
    }
}
