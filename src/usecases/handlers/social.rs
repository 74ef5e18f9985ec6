//! Social delivery handler: posts texts and captioned photos as statuses.

use crate::domain::{PhotoEvent, TextEvent};
use crate::ports::{EventHandler, SocialClient};
use crate::pubsub::Bus;
use crate::usecases::handlers::{NotificationSwitch, consume};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const SOCIAL_IDENTITY: &str = "social";

pub struct SocialHandler {
    client: Arc<dyn SocialClient>,
    bus: Arc<Bus>,
    switch: Arc<NotificationSwitch>,
}

impl SocialHandler {
    pub fn new(client: Arc<dyn SocialClient>, bus: Arc<Bus>) -> Self {
        Self {
            client,
            bus,
            switch: Arc::new(NotificationSwitch::default()),
        }
    }
}

impl EventHandler for SocialHandler {
    fn identity(&self) -> &str {
        SOCIAL_IDENTITY
    }

    fn execute_handlers(self: Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let text_client = Arc::clone(&self.client);
        let text = consume(
            Arc::clone(&self.bus),
            SOCIAL_IDENTITY,
            Arc::clone(&self.switch),
            cancel.clone(),
            move |event: TextEvent| {
                let client = Arc::clone(&text_client);
                async move { client.send_update(&event.text).await }
            },
        );

        let photo_client = Arc::clone(&self.client);
        let photo = consume(
            Arc::clone(&self.bus),
            SOCIAL_IDENTITY,
            Arc::clone(&self.switch),
            cancel,
            move |event: PhotoEvent| {
                let client = Arc::clone(&photo_client);
                async move {
                    client
                        .send_update_with_photo(&event.caption, &event.file_content)
                        .await
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
