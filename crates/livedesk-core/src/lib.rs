//! Business logic and port definitions for Livedesk.
//!
//! This crate owns the relay semantics (session store, operator command
//! parsing, message flows) and the live counter engine. It defines the
//! "ports" (traits) that the infrastructure layer implements -- operator
//! channel, automation notifier, counter repository, clock -- and depends
//! only on `livedesk-types`, never on HTTP or filesystem crates.

pub mod clock;
pub mod counter;
pub mod relay;
pub mod session;
