//! Long-polling loop: fetch updates and hand each message to the command router.
//!
//! Messages are handled one at a time so grouped photos reach the album aggregator
//! in arrival order.

use crate::adapters::telegram::mapper;
use crate::domain::DomainError;
use crate::usecases::CommandRouter;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, UpdateKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pause after a failed getUpdates call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub async fn run_polling(
    bot: Bot,
    router: Arc<CommandRouter>,
    timeout_secs: u32,
    cancel: CancellationToken,
) {
    info!(timeout_secs, "telegram polling started");
    let mut offset: i32 = 0;

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = bot
                .get_updates()
                .offset(offset)
                .timeout(timeout_secs)
                .allowed_updates(vec![AllowedUpdate::Message])
                .send() => result,
        };

        let updates = match result {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        for update in updates {
            offset = update.id.as_offset();
            let UpdateKind::Message(msg) = update.kind else {
                continue;
            };

            let message = mapper::to_chat_message(&msg);
            debug!(chat_id = msg.chat.id.0, sender = %message.sender_id, "received message");
            match router.handle(message).await {
                Ok(()) => {}
                Err(DomainError::InvalidSender(sender)) => {
                    debug!(sender = %sender, "dropping message from unparsable sender");
                }
                Err(e) => warn!(error = %e, "message handler failed"),
            }
        }
    }

    info!("telegram polling stopped");
}
