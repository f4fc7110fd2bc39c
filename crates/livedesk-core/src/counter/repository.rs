//! CounterRepository trait definition.
//!
//! Persistence port for the live counter state. The production
//! implementation lives in livedesk-infra (JSON file); tests use an
//! in-memory stand-in. Uses native async fn in traits (RPITIT, Rust 2024
//! edition).

use livedesk_types::counter::CounterState;
use livedesk_types::error::CounterError;

/// Durable storage for the single process-wide counter record.
pub trait CounterRepository: Send + Sync {
    /// Load the persisted state. `Ok(None)` when nothing usable is stored
    /// (missing or corrupt) -- the engine then starts empty.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<CounterState>, CounterError>> + Send;

    /// Persist the current state. Best-effort from the engine's point of
    /// view: a failure is logged, never rolled back.
    fn save(
        &self,
        state: &CounterState,
    ) -> impl std::future::Future<Output = Result<(), CounterError>> + Send;
}
