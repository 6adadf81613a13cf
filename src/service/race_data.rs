//! RaceDataService - cached access to sessions and schedules

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{LockRegistry, ScheduleCache, SessionCache};
use crate::executor::TimeoutExecutor;
use crate::providers::RaceDataProvider;
use crate::telemetry;
use crate::types::{CacheKey, Event, FastestLap, Schedule, Session};
use crate::{PaddockError, Result};

/// Facade used by request handlers.
///
/// Owns both caches and the executor they share. Handlers never touch the
/// provider directly.
pub struct RaceDataService {
    provider: Arc<dyn RaceDataProvider>,
    sessions: SessionCache<Session>,
    schedules: ScheduleCache<Schedule>,
    schedule_locks: LockRegistry<i32>,
    executor: Arc<TimeoutExecutor>,
}

impl RaceDataService {
    pub(crate) fn new(
        provider: Arc<dyn RaceDataProvider>,
        sessions: SessionCache<Session>,
        schedules: ScheduleCache<Schedule>,
        executor: Arc<TimeoutExecutor>,
    ) -> Self {
        Self {
            provider,
            sessions,
            schedules,
            schedule_locks: LockRegistry::new(),
            executor,
        }
    }

    /// Load a session through the session cache.
    pub async fn session(&self, year: i32, round: u32) -> Result<Arc<Session>> {
        let provider = Arc::clone(&self.provider);
        self.sessions
            .get_or_load(CacheKey::new(year, round), move || async move {
                provider.load_session(year, round).await
            })
            .await
    }

    /// Like [`session`](Self::session), for keys that arrive as text.
    pub async fn session_by_text(&self, year: &str, round: &str) -> Result<Arc<Session>> {
        let key = CacheKey::parse(year, round)?;
        self.session(key.year, key.round).await
    }

    /// Return the season schedule, refreshing it when the cached copy expired.
    ///
    /// Refreshes are coalesced per year. If a refresh is rate limited or
    /// times out and an expired snapshot exists, that snapshot is returned
    /// instead of the error.
    pub async fn schedule(&self, year: i32) -> Result<Arc<Schedule>> {
        if let Some(hit) = self.schedules.get(year) {
            return Ok(hit);
        }

        let load_lock = self.schedule_locks.acquire(&year);
        let _guard = load_lock.lock().await;

        if let Some(hit) = self.schedules.get(year) {
            metrics::counter!(telemetry::COALESCED_TOTAL, "cache" => "schedule").increment(1);
            return Ok(hit);
        }

        let provider = Arc::clone(&self.provider);
        let fetched = self
            .executor
            .run(async move { provider.load_schedule(year).await })
            .await;
        let status = if fetched.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::LOADS_TOTAL, "cache" => "schedule", "status" => status)
            .increment(1);

        match fetched {
            Ok(schedule) => {
                debug!(year, events = schedule.events.len(), "schedule refreshed");
                Ok(self.schedules.put(year, schedule))
            }
            Err(e) if e.allows_stale_fallback() => match self.schedules.get_stale(year) {
                Some(stale) => {
                    metrics::counter!(telemetry::STALE_FALLBACKS_TOTAL).increment(1);
                    warn!(year, error = %e, "schedule refresh failed, serving expired snapshot");
                    Ok(stale)
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// One round from the season schedule.
    pub async fn event(&self, year: i32, round: u32) -> Result<Event> {
        let schedule = self.schedule(year).await?;
        schedule
            .event(round)
            .cloned()
            .ok_or_else(|| PaddockError::NotFound(format!("round {round} of {year}")))
    }

    /// A driver's fastest lap in a session, with sector splits.
    pub async fn fastest_lap(&self, year: i32, round: u32, driver: &str) -> Result<FastestLap> {
        let session = self.session(year, round).await?;
        session.fastest_lap(driver).ok_or_else(|| {
            PaddockError::NotFound(format!("no timed lap for {driver} in {year}/{round}"))
        })
    }

    /// The session cache, for inspection.
    pub fn sessions(&self) -> &SessionCache<Session> {
        &self.sessions
    }

    /// The schedule cache, for inspection.
    pub fn schedules(&self) -> &ScheduleCache<Schedule> {
        &self.schedules
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
