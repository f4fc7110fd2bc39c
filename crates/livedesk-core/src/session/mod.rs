//! Chat session state: the in-memory store and its janitor.

pub mod janitor;
pub mod store;

pub use store::SessionStore;
