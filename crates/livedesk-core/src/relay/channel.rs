//! Outbound port traits implemented by the infrastructure layer.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition), same
//! pattern as the counter repository.

use livedesk_types::chat::AutomationEvent;
use livedesk_types::error::ChannelError;

/// The chat-bot transport the human operator is reachable through.
pub trait OperatorChannel: Send + Sync {
    /// Deliver a notification to the operator's admin chat.
    fn send_to_admin(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), ChannelError>> + Send;
}

/// Best-effort event sink for the external automation peer.
pub trait AutomationNotifier: Send + Sync {
    /// Whether a peer URL is configured at all. When false the relay
    /// skips notification entirely.
    fn is_enabled(&self) -> bool;

    /// Deliver one event. Single attempt; the relay logs and swallows
    /// failures.
    fn notify(
        &self,
        event: &AutomationEvent,
    ) -> impl std::future::Future<Output = Result<(), ChannelError>> + Send;
}
