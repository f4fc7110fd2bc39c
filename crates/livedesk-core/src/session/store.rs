//! In-memory session store: the shared mutable core of the relay.
//!
//! Sessions are keyed by an opaque, client-supplied identifier and created
//! lazily on first reference. Each session holds a capped conversation
//! history (context for the automation peer) and a pending-outbound queue
//! drained by site polling.
//!
//! Backed by `DashMap`: every operation completes under a single entry
//! lock, so no caller can observe a half-updated session. Nothing here
//! awaits; suspending work (channel sends, notifications) happens in the
//! relay after the mutation is done.

use dashmap::DashMap;

use livedesk_types::chat::{ChatSession, HistoryEntry, PendingReply, Role};

/// Maximum history entries kept per session (oldest dropped first).
pub const HISTORY_CAP: usize = 20;

/// Process-wide map of active chat sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, ChatSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a session exists, creating an empty one with
    /// `last_activity = now` if needed. Idempotent.
    pub fn get_or_create(&self, session_id: &str, now: i64) {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ChatSession {
                last_activity: now,
                ..ChatSession::default()
            });
    }

    /// Record an inbound visitor message: append a `user` history entry
    /// (trimming to the cap) and bump `last_activity`.
    ///
    /// Returns the trimmed history, new entry included, for attaching to
    /// the automation notification.
    pub fn record_inbound(&self, session_id: &str, text: &str, now: i64) -> Vec<HistoryEntry> {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_default();
        push_history(&mut session, Role::User, text, now);
        session.last_activity = now;
        session.history.clone()
    }

    /// Queue a reply for the site and mirror it into history as
    /// `assistant`. Creates the session lazily (automation callbacks may
    /// arrive for sessions this process has never seen).
    pub fn enqueue_outbound(&self, session_id: &str, text: &str, now: i64) {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_default();
        session.pending_outbound.push(PendingReply {
            text: text.to_string(),
            timestamp: now,
        });
        push_history(&mut session, Role::Assistant, text, now);
        session.last_activity = now;
    }

    /// Like [`enqueue_outbound`](Self::enqueue_outbound) but only for an
    /// existing session. Returns false, with no state change, when the
    /// session is unknown (expired or never existed) -- the operator
    /// command path must not resurrect sessions.
    pub fn enqueue_outbound_existing(&self, session_id: &str, text: &str, now: i64) -> bool {
        let Some(mut session) = self.sessions.get_mut(session_id) else {
            return false;
        };
        session.pending_outbound.push(PendingReply {
            text: text.to_string(),
            timestamp: now,
        });
        push_history(&mut session, Role::Assistant, text, now);
        session.last_activity = now;
        true
    }

    /// Atomically take the pending queue, leaving it empty. Unknown or
    /// empty sessions yield an empty Vec -- never an error.
    ///
    /// This is the sole site read path. Delivery is not acknowledged: a
    /// drained batch that never reaches the client is lost.
    pub fn drain_outbound(&self, session_id: &str) -> Vec<PendingReply> {
        self.sessions
            .get_mut(session_id)
            .map(|mut session| std::mem::take(&mut session.pending_outbound))
            .unwrap_or_default()
    }

    /// Remove sessions idle for longer than `idle_threshold_ms`.
    /// Returns the number removed.
    pub fn sweep_idle(&self, now: i64, idle_threshold_ms: i64) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now - session.last_activity <= idle_threshold_ms);
        before - self.sessions.len()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Clone of a session's current state, for inspection.
    pub fn snapshot(&self, session_id: &str) -> Option<ChatSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }
}

fn push_history(session: &mut ChatSession, role: Role, text: &str, now: i64) {
    session.history.push(HistoryEntry {
        role,
        text: text.to_string(),
        ts: now,
    });
    if session.history.len() > HISTORY_CAP {
        let excess = session.history.len() - HISTORY_CAP;
        session.history.drain(..excess);
    }
}
