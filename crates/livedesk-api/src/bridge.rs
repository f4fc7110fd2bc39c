//! Operator command bridge: long-polls Telegram for operator messages,
//! routes parsed reply commands through the relay, and acknowledges each
//! one back to the chat it came from.
//!
//! Messages that are not reply commands are silently ignored. Transport
//! errors are logged and polling resumes after a short backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use livedesk_core::relay::parse_reply_command;
use livedesk_infra::telegram::TelegramClient;

use crate::state::ConcreteRelay;

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BACKOFF: Duration = Duration::from_secs(2);

const ACK_DELIVERED: &str = "Reply delivered to the site.";
const ACK_NOT_FOUND: &str = "Session not found or expired.";

/// Run the bridge until the token is cancelled.
pub async fn run(client: TelegramClient, relay: Arc<ConcreteRelay>, cancel: CancellationToken) {
    let mut offset: Option<i64> = None;

    loop {
        let updates = tokio::select! {
            _ = cancel.cancelled() => break,
            result = client.get_updates(offset, POLL_TIMEOUT) => match result {
                Ok(updates) => updates,
                Err(err) => {
                    tracing::warn!(error = %err, "operator channel poll failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            },
        };

        for update in updates {
            offset = Some(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text.as_deref() else {
                continue;
            };
            let Some(command) = parse_reply_command(text) else {
                continue;
            };

            let ack = match relay.handle_operator_reply(&command) {
                Ok(()) => ACK_DELIVERED,
                Err(err) => {
                    tracing::info!(
                        session_id = %command.session_id,
                        error = %err,
                        "operator reply rejected"
                    );
                    ACK_NOT_FOUND
                }
            };

            let chat_id = message.chat.id.to_string();
            if let Err(err) = client.send_message(&chat_id, ack).await {
                tracing::warn!(error = %err, "failed to acknowledge operator command");
            }
        }
    }
}
