//! Chat session and relay wire types.
//!
//! These types model the three message flows of the relay: site payloads
//! (`SiteEvent`), pending replies polled by the site (`PendingReply`), and
//! the event notification sent to the automation peer (`AutomationEvent`).
//!
//! All wire field names are camelCase to match the site widget and the
//! automation peer; timestamps travel as epoch milliseconds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of a session's conversation history.
///
/// History is context for the automation peer, not a delivery queue;
/// the store caps it at the 20 most recent entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    /// Epoch milliseconds.
    pub ts: i64,
}

/// A reply queued for delivery to the site via polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReply {
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// In-memory state of one chat session.
///
/// Sessions are keyed by an opaque, client-supplied identifier and live
/// only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    /// Epoch milliseconds of the last inbound or outbound event.
    pub last_activity: i64,
    /// Last 20 conversation entries, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Replies awaiting the next site poll.
    pub pending_outbound: Vec<PendingReply>,
}

/// Marker for the `"type": "call"` discriminator on call requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CallTag {
    #[serde(rename = "call")]
    Call,
}

/// An outbound call request submitted through the site form.
///
/// Field values are free text from the visitor; missing fields default to
/// empty strings rather than rejecting the lead.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    #[serde(rename = "type")]
    pub kind: CallTag,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// A live-chat message submitted through the site widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    pub session_id: String,
}

/// Payload of `POST /api/chat-message`: either a call request or a chat
/// message, discriminated by shape.
///
/// Call requests are tried first so that a payload carrying both the
/// `type: "call"` tag and chat fields is treated as a call request.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SiteEvent {
    Call(CallRequest),
    Chat(ChatMessage),
}

/// Signed callback payload from the automation peer
/// (`POST /api/chat-reply`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationReply {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub text: String,
}

/// Event notification sent to the automation peer when a chat message
/// arrives from the site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub session_id: String,
    pub message: String,
    /// Full trimmed history, the new message included.
    pub history: Vec<HistoryEntry>,
    /// Path the peer should call back on with its reply.
    pub reply_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_event_parses_call_request() {
        let event: SiteEvent = serde_json::from_str(
            r#"{"type":"call","name":"Ann","email":"a@b.c","phone":"+1","date":"2024-05-14","time":"10:00"}"#,
        )
        .unwrap();
        match event {
            SiteEvent::Call(call) => {
                assert_eq!(call.name, "Ann");
                assert_eq!(call.time, "10:00");
            }
            SiteEvent::Chat(_) => panic!("expected call request"),
        }
    }

    #[test]
    fn test_site_event_call_tolerates_missing_fields() {
        let event: SiteEvent = serde_json::from_str(r#"{"type":"call","name":"Ann"}"#).unwrap();
        match event {
            SiteEvent::Call(call) => {
                assert_eq!(call.name, "Ann");
                assert_eq!(call.email, "");
            }
            SiteEvent::Chat(_) => panic!("expected call request"),
        }
    }

    #[test]
    fn test_site_event_parses_chat_message() {
        let event: SiteEvent =
            serde_json::from_str(r#"{"message":"hi","sessionId":"abc"}"#).unwrap();
        match event {
            SiteEvent::Chat(chat) => {
                assert_eq!(chat.message, "hi");
                assert_eq!(chat.session_id, "abc");
            }
            SiteEvent::Call(_) => panic!("expected chat message"),
        }
    }

    #[test]
    fn test_site_event_rejects_unrelated_shape() {
        let result = serde_json::from_str::<SiteEvent>(r#"{"foo":"bar"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_automation_event_wire_shape() {
        let event = AutomationEvent {
            kind: "livechat_message".to_string(),
            session_id: "abc".to_string(),
            message: "hi".to_string(),
            history: vec![HistoryEntry {
                role: Role::User,
                text: "hi".to_string(),
                ts: 1,
            }],
            reply_url: "/api/chat-reply".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "livechat_message");
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["replyUrl"], "/api/chat-reply");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][0]["ts"], 1);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
