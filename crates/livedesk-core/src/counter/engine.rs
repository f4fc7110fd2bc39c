//! Live counter engine: day rollover, jittered increments, and the
//! self-rescheduling timer.
//!
//! The counter advances at unpredictable intervals (uniform 20-45 minutes)
//! within a local calendar day and resets at local midnight. State is
//! persisted after every mutation so restarts pick up where the process
//! left off; persistence failures are logged and never block the counter.
//!
//! Every entry point runs the day-rollover check first, and the timer
//! never sleeps past the next local midnight, so a rollover cannot be
//! missed even when the next increment is scheduled into tomorrow.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local};
use rand::Rng;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use livedesk_types::counter::{CounterSnapshot, CounterState};

use crate::clock::Clock;
use crate::counter::repository::CounterRepository;

/// Shortest gap between two increments.
pub const MIN_INTERVAL_MS: i64 = 20 * 60 * 1000;

/// Longest gap between two increments.
pub const MAX_INTERVAL_MS: i64 = 45 * 60 * 1000;

/// Floor on the timer delay, so a stale `next_at` cannot busy-loop.
const MIN_TIMER_DELAY_MS: i64 = 1000;

/// The process-wide counter engine.
///
/// All mutation goes through a single mutex; the persist call happens
/// while the lock is held, so on-disk state never interleaves two
/// half-applied transitions.
pub struct CounterEngine<R, K> {
    state: Mutex<CounterState>,
    repo: R,
    clock: K,
}

impl<R, K> CounterEngine<R, K>
where
    R: CounterRepository,
    K: Clock,
{
    pub fn new(repo: R, clock: K) -> Self {
        Self {
            state: Mutex::new(CounterState::default()),
            repo,
            clock,
        }
    }

    /// Load persisted state and fold in at most one increment that came
    /// due while the process was offline. Deliberately lossy: however
    /// long the downtime, only one missed increment is recovered.
    pub async fn restore(&self) {
        match self.repo.load().await {
            Ok(Some(persisted)) => {
                tracing::info!(
                    day_key = persisted.day_key.as_deref().unwrap_or("-"),
                    count = persisted.count,
                    "restored counter state"
                );
                *self.state.lock().await = persisted;
            }
            Ok(None) => {
                tracing::info!("no usable counter state on disk, starting fresh");
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load counter state, starting fresh");
            }
        }
        self.maybe_increment().await;
    }

    /// Run the day-rollover check and, if the scheduled instant has
    /// passed, apply one increment and reschedule. Returns whether an
    /// increment fired.
    pub async fn maybe_increment(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        self.maybe_increment_locked(&mut state, now).await
    }

    /// Advance the counter if due, then return the read-model. Used by
    /// the query endpoint so the counter moves even if the background
    /// timer stalls.
    pub async fn advance_and_read(&self) -> CounterSnapshot {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        self.maybe_increment_locked(&mut state, now).await;
        CounterSnapshot {
            count: state.count,
            day_key: state.day_key.clone().unwrap_or_default(),
        }
    }

    /// Current state without advancing, for inspection.
    pub async fn state(&self) -> CounterState {
        self.state.lock().await.clone()
    }

    /// Self-rescheduling timer: wake at the earlier of the next scheduled
    /// increment and the next local midnight (clamped to a 1s floor),
    /// fire one evaluation, repeat until cancelled.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken)
    where
        R: 'static,
    {
        loop {
            let delay_ms = {
                let mut state = self.state.lock().await;
                let now = self.clock.now();
                self.ensure_day_locked(&mut state, now).await;

                let next_at = match state.next_at {
                    Some(at) => at,
                    None => {
                        let at = now.timestamp_millis() + jitter_ms();
                        state.next_at = Some(at);
                        self.persist(&state).await;
                        at
                    }
                };
                next_wake_delay_ms(next_at, now)
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(delay_ms as u64)) => {
                    self.maybe_increment().await;
                }
            }
        }
    }

    /// Reset the record when the local calendar date has changed. Must
    /// run before any other counter logic on every entry point.
    async fn ensure_day_locked(&self, state: &mut CounterState, now: DateTime<Local>) -> bool {
        let key = local_day_key(now);
        if state.day_key.as_deref() == Some(key.as_str()) {
            return false;
        }
        tracing::info!(day_key = %key, "counter day rollover");
        state.day_key = Some(key);
        state.count = 0;
        state.next_at = Some(now.timestamp_millis() + jitter_ms());
        self.persist(state).await;
        true
    }

    async fn maybe_increment_locked(&self, state: &mut CounterState, now: DateTime<Local>) -> bool {
        self.ensure_day_locked(state, now).await;

        let now_ms = now.timestamp_millis();
        let Some(next_at) = state.next_at else {
            state.next_at = Some(now_ms + jitter_ms());
            self.persist(state).await;
            return false;
        };

        if now_ms >= next_at {
            state.count += 1;
            state.next_at = Some(now_ms + jitter_ms());
            self.persist(state).await;
            tracing::debug!(count = state.count, "counter incremented");
            true
        } else {
            false
        }
    }

    async fn persist(&self, state: &CounterState) {
        if let Err(err) = self.repo.save(state).await {
            tracing::warn!(error = %err, "counter state save failed");
        }
    }
}

/// Local calendar date key, `YYYY-MM-DD`.
pub fn local_day_key(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Epoch milliseconds of the next local midnight after `now`.
pub fn next_local_midnight_ms(now: DateTime<Local>) -> i64 {
    (now.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis() + 24 * 60 * 60 * 1000)
}

/// Milliseconds until the timer should wake: the earlier of the next
/// scheduled increment and the next local midnight, floored at 1s so a
/// stale `next_at` cannot busy-loop.
fn next_wake_delay_ms(next_at: i64, now: DateTime<Local>) -> i64 {
    let wake_at = next_at.min(next_local_midnight_ms(now));
    (wake_at - now.timestamp_millis()).max(MIN_TIMER_DELAY_MS)
}

fn jitter_ms() -> i64 {
    rand::rng().random_range(MIN_INTERVAL_MS..=MAX_INTERVAL_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex as StdMutex;

    use chrono::TimeZone;

    use livedesk_types::error::CounterError;

    struct ManualClock {
        millis: AtomicI64,
    }

    impl ManualClock {
        fn at(millis: i64) -> Self {
            Self {
                millis: AtomicI64::new(millis),
            }
        }

        fn advance(&self, millis: i64) {
            self.millis.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now(&self) -> DateTime<Local> {
            Local
                .timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
                .unwrap()
        }
    }

    #[derive(Default)]
    struct InMemoryRepo {
        stored: StdMutex<Option<CounterState>>,
    }

    impl CounterRepository for InMemoryRepo {
        async fn load(&self) -> Result<Option<CounterState>, CounterError> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, state: &CounterState) -> Result<(), CounterError> {
            *self.stored.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    const MIN: i64 = MIN_INTERVAL_MS;

    /// A DST-safe mid-morning local instant.
    fn base_millis() -> i64 {
        Local
            .with_ymd_and_hms(2024, 5, 14, 10, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn engine_at(
        millis: i64,
        persisted: Option<CounterState>,
    ) -> (CounterEngine<InMemoryRepo, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(millis));
        let repo = InMemoryRepo::default();
        *repo.stored.lock().unwrap() = persisted;
        (CounterEngine::new(repo, Arc::clone(&clock)), clock)
    }

    #[tokio::test]
    async fn test_first_evaluation_schedules_without_incrementing() {
        let (engine, clock) = engine_at(base_millis(), None);

        assert!(!engine.maybe_increment().await);

        let state = engine.state().await;
        assert_eq!(state.count, 0);
        assert_eq!(state.day_key.as_deref(), Some("2024-05-14"));
        let next_at = state.next_at.unwrap();
        let now = clock.now_millis();
        assert!(next_at > now + MIN - 1 && next_at <= now + MAX_INTERVAL_MS);
    }

    #[tokio::test]
    async fn test_increment_only_after_next_at() {
        let (engine, clock) = engine_at(base_millis(), None);
        engine.maybe_increment().await;
        let next_at = engine.state().await.next_at.unwrap();

        // 10 minutes in: not yet due
        clock.advance(10 * 60 * 1000);
        assert!(!engine.maybe_increment().await);
        assert_eq!(engine.state().await.count, 0);

        // Advance just past next_at: exactly one increment, rescheduled
        clock.advance(next_at - clock.now_millis() + 1);
        assert!(engine.maybe_increment().await);

        let state = engine.state().await;
        assert_eq!(state.count, 1);
        let now = clock.now_millis();
        let rescheduled = state.next_at.unwrap();
        assert!(rescheduled >= now + MIN && rescheduled <= now + MAX_INTERVAL_MS);
        // Not stale: the consumed instant was replaced
        assert_ne!(rescheduled, next_at);
    }

    #[tokio::test]
    async fn test_count_never_decreases_within_a_day() {
        let (engine, clock) = engine_at(base_millis(), None);
        engine.maybe_increment().await;

        let mut last = 0;
        for _ in 0..4 {
            clock.advance(50 * 60 * 1000); // beyond MAX, always due
            engine.maybe_increment().await;
            let count = engine.state().await.count;
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 4);
    }

    #[tokio::test]
    async fn test_day_rollover_resets_count_exactly_once() {
        let (engine, clock) = engine_at(base_millis(), None);
        engine.maybe_increment().await;
        clock.advance(50 * 60 * 1000);
        engine.maybe_increment().await;
        assert_eq!(engine.state().await.count, 1);
        let old_key = engine.state().await.day_key.unwrap();

        // Two days later the key has changed and the count is back to 0
        clock.advance(48 * 60 * 60 * 1000);
        assert!(!engine.maybe_increment().await);
        let state = engine.state().await;
        assert_eq!(state.count, 0);
        assert_ne!(state.day_key.as_deref(), Some(old_key.as_str()));
        // next_at was rescheduled into the new day, not left stale
        let next_at = state.next_at.unwrap();
        assert!(next_at > clock.now_millis());

        // Same day again: no second reset, increments accumulate
        clock.advance(50 * 60 * 1000);
        assert!(engine.maybe_increment().await);
        assert_eq!(engine.state().await.count, 1);
    }

    #[tokio::test]
    async fn test_restore_applies_at_most_one_missed_increment() {
        let base = base_millis();
        // next_at two hours in the past, same local day
        let persisted = CounterState {
            day_key: Some("2024-05-14".to_string()),
            count: 5,
            next_at: Some(base - 2 * 60 * 60 * 1000),
        };
        let (engine, clock) = engine_at(base, Some(persisted));

        engine.restore().await;

        let state = engine.state().await;
        assert_eq!(state.count, 6);
        assert!(state.next_at.unwrap() > clock.now_millis());
    }

    #[tokio::test]
    async fn test_restore_across_days_resets_instead_of_incrementing() {
        let base = base_millis();
        let persisted = CounterState {
            day_key: Some("2024-05-10".to_string()),
            count: 9,
            next_at: Some(base - 60 * 1000),
        };
        let (engine, _) = engine_at(base, Some(persisted));

        engine.restore().await;

        let state = engine.state().await;
        // Rollover rescheduled next_at into the future, so no increment
        assert_eq!(state.count, 0);
        assert_eq!(state.day_key.as_deref(), Some("2024-05-14"));
    }

    #[tokio::test]
    async fn test_restore_with_empty_repo_starts_fresh() {
        let (engine, _) = engine_at(base_millis(), None);
        engine.restore().await;

        let state = engine.state().await;
        assert_eq!(state.count, 0);
        assert!(state.day_key.is_some());
        assert!(state.next_at.is_some());
    }

    #[tokio::test]
    async fn test_advance_and_read_reports_current_day() {
        let (engine, clock) = engine_at(base_millis(), None);
        let snap = engine.advance_and_read().await;
        assert_eq!(snap.count, 0);
        assert_eq!(snap.day_key, "2024-05-14");

        clock.advance(50 * 60 * 1000);
        let snap = engine.advance_and_read().await;
        assert_eq!(snap.count, 1);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let clock = Arc::new(ManualClock::at(base_millis()));
        let repo = InMemoryRepo::default();
        let engine = CounterEngine::new(repo, Arc::clone(&clock));

        engine.maybe_increment().await;
        let stored = engine.repo.stored.lock().unwrap().clone().unwrap();
        assert_eq!(stored.day_key.as_deref(), Some("2024-05-14"));
        assert!(stored.next_at.is_some());
    }

    #[test]
    fn test_next_local_midnight_is_start_of_next_day() {
        let now = Local.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();
        let midnight_ms = next_local_midnight_ms(now);
        assert!(midnight_ms > now.timestamp_millis());

        let midnight = Local.timestamp_millis_opt(midnight_ms).unwrap();
        assert_eq!(local_day_key(midnight), "2024-05-15");
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_wake_delay_uses_next_at_when_before_midnight() {
        let now = Local.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();
        let next_at = now.timestamp_millis() + 25 * 60 * 1000;
        assert_eq!(next_wake_delay_ms(next_at, now), 25 * 60 * 1000);
    }

    #[test]
    fn test_wake_delay_capped_at_next_midnight() {
        let now = Local.with_ymd_and_hms(2024, 5, 14, 23, 50, 0).unwrap();
        // Scheduled 40 minutes out, into tomorrow: midnight wins
        let next_at = now.timestamp_millis() + 40 * 60 * 1000;
        assert_eq!(
            next_wake_delay_ms(next_at, now),
            next_local_midnight_ms(now) - now.timestamp_millis()
        );
    }

    #[test]
    fn test_wake_delay_floors_overdue_next_at_at_one_second() {
        let now = Local.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();
        let next_at = now.timestamp_millis() - 60 * 1000;
        assert_eq!(next_wake_delay_ms(next_at, now), MIN_TIMER_DELAY_MS);
    }

    #[test]
    fn test_local_day_key_format() {
        let now = Local.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(local_day_key(now), "2024-01-05");
    }
}
