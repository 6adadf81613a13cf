//! Builder for configuring service instances

use std::sync::Arc;
use std::time::Duration;

use super::RaceDataService;
use crate::cache::{DEFAULT_SCHEDULE_TTL, DEFAULT_SESSION_CAPACITY, ScheduleCache, SessionCache};
use crate::config::Config;
use crate::executor::{DEFAULT_DEADLINE, DEFAULT_WORKERS, TimeoutExecutor};
use crate::providers::{HttpProvider, RaceDataProvider};
use crate::{PaddockError, Result};

/// Main entry point for creating service instances.
pub struct Paddock;

impl Paddock {
    /// Create a new builder for configuring the service.
    pub fn builder() -> PaddockBuilder {
        PaddockBuilder::new()
    }
}

/// Builder for configuring service instances.
pub struct PaddockBuilder {
    provider: Option<Arc<dyn RaceDataProvider>>,
    http_base_url: Option<String>,
    cache_capacity: usize,
    schedule_ttl: Duration,
    upstream_timeout: Duration,
    workers: usize,
}

impl PaddockBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            http_base_url: None,
            cache_capacity: DEFAULT_SESSION_CAPACITY,
            schedule_ttl: DEFAULT_SCHEDULE_TTL,
            upstream_timeout: DEFAULT_DEADLINE,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Apply every setting from a loaded [`Config`].
    pub fn config(self, config: &Config) -> Self {
        self.http(&config.upstream.base_url)
            .cache_capacity(config.cache.capacity)
            .schedule_ttl(Duration::from_secs(config.cache.schedule_ttl_secs))
            .upstream_timeout(Duration::from_secs(config.upstream.timeout_secs))
            .workers(config.upstream.workers)
    }

    /// Use a custom upstream provider. Takes precedence over [`http`](Self::http).
    pub fn provider(mut self, provider: Arc<dyn RaceDataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use the bundled HTTP provider against `base_url`.
    pub fn http(mut self, base_url: impl Into<String>) -> Self {
        self.http_base_url = Some(base_url.into());
        self
    }

    /// Maximum number of sessions kept in memory. Default: 6.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Time-to-live for schedule snapshots. Default: 1 hour.
    pub fn schedule_ttl(mut self, ttl: Duration) -> Self {
        self.schedule_ttl = ttl;
        self
    }

    /// Deadline for a single upstream call. Default: 30s.
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Number of upstream calls allowed in flight at once. Default: 4.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Build the service.
    ///
    /// Fails with [`PaddockError::NoProvider`] if neither a provider nor an
    /// HTTP base URL was given, and with [`PaddockError::Configuration`] for
    /// zero capacity, zero workers or a zero timeout.
    pub fn build(self) -> Result<RaceDataService> {
        if self.cache_capacity == 0 {
            return Err(PaddockError::Configuration(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(PaddockError::Configuration(
                "worker pool size must be at least 1".to_string(),
            ));
        }
        if self.upstream_timeout.is_zero() {
            return Err(PaddockError::Configuration(
                "upstream timeout must be greater than zero".to_string(),
            ));
        }

        let provider: Arc<dyn RaceDataProvider> = match (self.provider, self.http_base_url) {
            (Some(provider), _) => provider,
            (None, Some(url)) => Arc::new(HttpProvider::new(url)?),
            (None, None) => return Err(PaddockError::NoProvider),
        };

        let executor = Arc::new(TimeoutExecutor::new(self.workers, self.upstream_timeout));
        let sessions = SessionCache::new(self.cache_capacity, Arc::clone(&executor));
        let schedules = ScheduleCache::new(self.schedule_ttl);

        Ok(RaceDataService::new(provider, sessions, schedules, executor))
    }
}

impl Default for PaddockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
