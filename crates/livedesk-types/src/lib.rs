//! Shared domain types for Livedesk.
//!
//! This crate contains the wire and domain types used across the relay:
//! chat sessions, site payloads, automation events, counter state, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod counter;
pub mod error;
