//! Infrastructure layer for Livedesk.
//!
//! Contains implementations of the ports defined in `livedesk-core`:
//! the Telegram operator channel, the signed automation webhook client,
//! the HMAC-SHA256 signature codec, and the JSON-file counter repository.

pub mod automation;
pub mod counter_file;
pub mod signature;
pub mod telegram;
