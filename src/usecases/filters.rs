//! Authorization filters. Each wraps a command handler with a precondition.
//!
//! A chain is applied so that the first filter in the list runs first.

use crate::domain::{ChatMessage, DomainError};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send>>;

/// Callback invoked for one incoming chat message.
pub type CommandHandler = Arc<dyn Fn(ChatMessage) -> HandlerFuture + Send + Sync>;

/// Handler-to-handler transformation.
pub type Filter = Arc<dyn Fn(CommandHandler) -> CommandHandler + Send + Sync>;

/// Build a `CommandHandler` from an async closure.
pub fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(ChatMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    Arc::new(move |msg| Box::pin(f(msg)))
}

/// Pass only messages from one-to-one conversations; drop the rest silently.
pub fn only_private() -> Filter {
    Arc::new(|inner: CommandHandler| {
        handler(move |msg: ChatMessage| {
            let inner = Arc::clone(&inner);
            async move {
                if !msg.is_private {
                    return Ok(());
                }
                inner(msg).await
            }
        })
    })
}

/// Pass only messages whose sender is in `admins`.
///
/// A non-numeric sender id fails with `DomainError::InvalidSender`.
pub fn only_admins(admins: Arc<HashSet<i64>>) -> Filter {
    Arc::new(move |inner: CommandHandler| {
        let admins = Arc::clone(&admins);
        handler(move |msg: ChatMessage| {
            let inner = Arc::clone(&inner);
            let admins = Arc::clone(&admins);
            async move {
                let sender = parse_sender(&msg.sender_id)?;
                if !admins.contains(&sender) {
                    return Ok(());
                }
                inner(msg).await
            }
        })
    })
}

/// Wrap `inner` so that `filters[0]` is evaluated first.
pub fn apply(inner: CommandHandler, filters: &[Filter]) -> CommandHandler {
    filters
        .iter()
        .rev()
        .fold(inner, |exec, filter| filter(exec))
}

pub fn parse_sender(sender_id: &str) -> Result<i64, DomainError> {
    sender_id
        .trim()
        .parse::<i64>()
        .map_err(|_| DomainError::InvalidSender(sender_id.to_string()))
}
