//! JSON-file implementation of the counter repository.
//!
//! The state file is a small pretty-printed JSON object
//! (`{dayKey, count, nextAt}`) compatible with state files written by
//! earlier deployments. A missing or corrupt file loads as "nothing
//! stored" so the engine starts fresh instead of refusing to boot.

use std::path::PathBuf;

use livedesk_core::counter::CounterRepository;
use livedesk_types::counter::CounterState;
use livedesk_types::error::CounterError;

/// Counter repository backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCounterRepository {
    path: PathBuf,
}

impl FileCounterRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CounterRepository for FileCounterRepository {
    async fn load(&self) -> Result<Option<CounterState>, CounterError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CounterError::Io(err.to_string())),
        };

        match serde_json::from_slice::<CounterState>(&bytes) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "counter state file is corrupt, ignoring it"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &CounterState) -> Result<(), CounterError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| CounterError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| CounterError::Io(e.to_string()))
    }
}
