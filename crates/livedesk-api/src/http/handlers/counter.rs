//! Live counter handler.

use axum::extract::State;
use axum::Json;

use livedesk_types::counter::CounterSnapshot;

use crate::state::AppState;

/// GET /api/live-counter - Read the counter, advancing it first so the
/// count keeps moving even if the background timer stalls.
pub async fn live_counter(State(state): State<AppState>) -> Json<CounterSnapshot> {
    Json(state.counter.advance_and_read().await)
}
