//! Operator reply command parser.
//!
//! Commands look like `/reply_<session-id> <body>`: the session identifier
//! is a restricted character class (letters, digits, underscore, hyphen)
//! and the body is everything after the first run of whitespace, embedded
//! newlines included. The body may itself contain underscores and hyphens;
//! only the first token is structural.
//!
//! An explicit parser rather than a regex, decoupled from the transport's
//! message type: anything that does not match yields `None` and is
//! silently ignored upstream.

/// Command prefix the operator types in the bot chat.
pub const REPLY_PREFIX: &str = "/reply_";

/// A successfully parsed operator reply command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub session_id: String,
    pub body: String,
}

/// Parse an operator message into a reply command, if it is one.
pub fn parse_reply_command(text: &str) -> Option<ParsedReply> {
    let rest = text.strip_prefix(REPLY_PREFIX)?;

    let id_end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    let (session_id, tail) = rest.split_at(id_end);

    if session_id.is_empty() || !session_id.chars().all(is_session_id_char) {
        return None;
    }

    let body = tail.trim_start();
    if body.is_empty() {
        return None;
    }

    Some(ParsedReply {
        session_id: session_id.to_string(),
        body: body.to_string(),
    })
}

fn is_session_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
