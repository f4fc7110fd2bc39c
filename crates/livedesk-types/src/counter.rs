//! Live counter state types.
//!
//! `CounterState` is the single process-wide record behind the simulated
//! visitor counter. Its serde shape is also the on-disk file format:
//! `{"dayKey": "...", "count": N, "nextAt": <epoch millis>}`, where a
//! `nextAt` of 0 means "not scheduled" (the format existing state files
//! already use).

use serde::{Deserialize, Serialize};

/// Persistent state of the live counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    /// Local calendar date (`YYYY-MM-DD`) the count applies to.
    #[serde(default)]
    pub day_key: Option<String>,
    /// Increment events fired since the start of the current local day.
    #[serde(default)]
    pub count: u64,
    /// Epoch milliseconds of the next scheduled increment; `None` when
    /// unscheduled. Serialized as 0 when unset.
    #[serde(default, with = "next_at_millis")]
    pub next_at: Option<i64>,
}

/// Read-model returned by the counter endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    pub count: u64,
    pub day_key: String,
}

/// Serializes `Option<i64>` as plain epoch millis with 0 meaning unset.
mod next_at_millis {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Ok(if millis <= 0 { None } else { Some(millis) })
    }
}
