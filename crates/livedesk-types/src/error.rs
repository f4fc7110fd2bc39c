use thiserror::Error;

/// Errors from the outbound channels (operator bot, automation peer).
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel api error: {0}")]
    Api(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors from relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Errors from signature computation and verification.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    MissingHeader,

    #[error("signature header malformed")]
    MalformedHeader,

    #[error("signature mismatch")]
    Mismatch,

    #[error("invalid hmac key: {0}")]
    InvalidKey(String),
}

/// Errors from counter state persistence.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("counter state io error: {0}")]
    Io(String),

    #[error("counter state serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::SessionNotFound("abc".to_string());
        assert_eq!(err.to_string(), "session 'abc' not found");
    }

    #[test]
    fn test_channel_error_propagates_through_relay_error() {
        let err = RelayError::from(ChannelError::Api("telegram said no".to_string()));
        assert_eq!(err.to_string(), "channel api error: telegram said no");
    }

    #[test]
    fn test_signature_error_display() {
        assert_eq!(SignatureError::Mismatch.to_string(), "signature mismatch");
        assert_eq!(
            SignatureError::MalformedHeader.to_string(),
            "signature header malformed"
        );
    }
}
