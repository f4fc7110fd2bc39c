//! Relay service: routes site events, operator replies, and automation
//! callbacks through the session store and the outbound channels.
//!
//! Ordering contract: all session-store mutations for one logical
//! operation complete before any suspending call is issued, so concurrent
//! handlers never observe a half-updated session. The automation
//! notification is spawned fire-and-forget -- it must not delay the HTTP
//! response that triggered it, and its failure is logged and swallowed.

use std::sync::Arc;

use chrono::Utc;

use livedesk_types::chat::{AutomationEvent, CallRequest, ChatMessage, PendingReply, SiteEvent};
use livedesk_types::error::RelayError;

use crate::relay::channel::{AutomationNotifier, OperatorChannel};
use crate::relay::command::{ParsedReply, REPLY_PREFIX};
use crate::session::SessionStore;

/// Event kind sent to the automation peer for live-chat messages.
const LIVECHAT_EVENT_KIND: &str = "livechat_message";

/// Callback path the automation peer replies on.
const REPLY_URL: &str = "/api/chat-reply";

/// Orchestrates the three message flows. Generic over the outbound ports;
/// the application layer pins them to the Telegram and webhook clients.
pub struct RelayService<C, N> {
    store: Arc<SessionStore>,
    channel: Arc<C>,
    notifier: Arc<N>,
}

impl<C, N> RelayService<C, N>
where
    C: OperatorChannel,
    N: AutomationNotifier + 'static,
{
    pub fn new(store: Arc<SessionStore>, channel: Arc<C>, notifier: Arc<N>) -> Self {
        Self {
            store,
            channel,
            notifier,
        }
    }

    /// Handle a `POST /api/chat-message` payload: a call request or a
    /// live-chat message.
    ///
    /// The operator notification is awaited (its failure fails the
    /// request); the automation notification is not.
    pub async fn handle_site_event(&self, event: SiteEvent) -> Result<(), RelayError> {
        match event {
            SiteEvent::Call(call) => self.handle_call_request(&call).await,
            SiteEvent::Chat(chat) => self.handle_chat_message(&chat).await,
        }
    }

    async fn handle_call_request(&self, call: &CallRequest) -> Result<(), RelayError> {
        tracing::info!(name = %call.name, "call request received");
        self.channel
            .send_to_admin(&render_call_notification(call))
            .await?;
        Ok(())
    }

    async fn handle_chat_message(&self, chat: &ChatMessage) -> Result<(), RelayError> {
        if chat.message.is_empty() || chat.session_id.is_empty() {
            return Err(RelayError::InvalidPayload(
                "message and sessionId are required".to_string(),
            ));
        }

        tracing::info!(session_id = %chat.session_id, "chat message received");
        self.channel
            .send_to_admin(&render_chat_notification(chat))
            .await?;

        let now = Utc::now().timestamp_millis();
        let history = self.store.record_inbound(&chat.session_id, &chat.message, now);

        if self.notifier.is_enabled() {
            let event = AutomationEvent {
                kind: LIVECHAT_EVENT_KIND.to_string(),
                session_id: chat.session_id.clone(),
                message: chat.message.clone(),
                history,
                reply_url: REPLY_URL.to_string(),
            };
            let notifier = Arc::clone(&self.notifier);
            tokio::spawn(async move {
                if let Err(err) = notifier.notify(&event).await {
                    tracing::warn!(
                        session_id = %event.session_id,
                        error = %err,
                        "automation notification failed"
                    );
                }
            });
        }

        Ok(())
    }

    /// Handle a verified callback from the automation peer. Creates the
    /// session lazily and queues the reply for site polling.
    pub fn handle_automation_reply(&self, session_id: &str, text: &str) {
        let now = Utc::now().timestamp_millis();
        self.store.enqueue_outbound(session_id, text, now);
        tracing::info!(session_id, "automation reply queued");
    }

    /// Handle a parsed operator command. The session must already exist;
    /// an unknown session is a soft failure the bridge acknowledges back
    /// to the operator, with no state change.
    pub fn handle_operator_reply(&self, reply: &ParsedReply) -> Result<(), RelayError> {
        let now = Utc::now().timestamp_millis();
        if self
            .store
            .enqueue_outbound_existing(&reply.session_id, &reply.body, now)
        {
            tracing::info!(session_id = %reply.session_id, "operator reply queued");
            Ok(())
        } else {
            Err(RelayError::SessionNotFound(reply.session_id.clone()))
        }
    }

    /// Drain pending replies for a polling site client.
    pub fn drain_replies(&self, session_id: &str) -> Vec<PendingReply> {
        self.store.drain_outbound(session_id)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

fn render_call_notification(call: &CallRequest) -> String {
    format!(
        "New call request\n\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Date: {}\n\
         Time: {}\n\n\
         Hot lead, call back as soon as possible.",
        call.name, call.email, call.phone, call.date, call.time
    )
}

fn render_chat_notification(chat: &ChatMessage) -> String {
    format!(
        "New live chat message\n\n\
         Session: {}\n\
         Message: {}\n\n\
         Reply with: {}{} <your reply>",
        chat.session_id, chat.message, REPLY_PREFIX, chat.session_id
    )
}
