//! Inbound port. The bus drives delivery handlers through this.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A bus consumer addressable by the notification control plane.
pub trait EventHandler: Send + Sync {
    /// Stable name used by `/stop <identity>`.
    fn identity(&self) -> &str;

    /// Subscribe and spawn one task per topic. A failed subscription is reported
    /// on the error topic and its loop is not started.
    fn execute_handlers(self: Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>>;

    /// Stop performing external sends; incoming envelopes are drained.
    fn disarm(&self);

    fn is_armed(&self) -> bool;
}
