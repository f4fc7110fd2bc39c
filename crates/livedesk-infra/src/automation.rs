//! Outbound notifications to the automation peer.
//!
//! Serializes each event to canonical JSON bytes once, signs those exact
//! bytes when a secret is configured, and issues a single POST. No retry,
//! no backoff: the relay logs a failure and moves on, the primary request
//! has already been satisfied.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use livedesk_core::relay::AutomationNotifier;
use livedesk_types::chat::AutomationEvent;
use livedesk_types::error::ChannelError;

use crate::signature;

/// Webhook client for the automation peer. With no URL configured it is
/// a permanent no-op and the relay skips notification entirely.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>, secret: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            secret,
        }
    }
}

impl AutomationNotifier for WebhookNotifier {
    fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    async fn notify(&self, event: &AutomationEvent) -> Result<(), ChannelError> {
        let Some(url) = &self.url else {
            return Ok(());
        };

        let raw = serde_json::to_vec(event)
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let mut request = self
            .client
            .post(url)
            .timeout(Duration::from_secs(15))
            .header(CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.secret {
            let header = signature::sign(secret.as_bytes(), &raw)
                .map_err(|e| ChannelError::Transport(e.to_string()))?;
            request = request.header(signature::SIGNATURE_HEADER, header);
        }

        tracing::debug!(session_id = %event.session_id, "delivering automation notification");
        let response = request
            .body(raw)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Api(format!(
                "automation peer returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
