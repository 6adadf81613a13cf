//! Provider trait for upstream race data.
//!
//! # Error contract
//!
//! Implementations report failures with these variants so the service can
//! react to them:
//! - `RateLimited`: upstream throttled the request
//! - `NotFound`: the year/round does not exist upstream
//! - anything else: unexpected failure, surfaced as an internal error
//!
//! Errors are never cached, so the next call for the same key goes upstream
//! again. Providers must not retry internally; the layer above decides.

use async_trait::async_trait;

use crate::Result;
use crate::types::{Schedule, Session};

/// Source of sessions and season schedules.
///
/// Calls can be slow (tens of seconds for a full session). They run on the
/// [`TimeoutExecutor`](crate::TimeoutExecutor) and may be abandoned by
/// their caller, so implementations should not rely on being awaited to
/// completion.
#[async_trait]
pub trait RaceDataProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Load one session's lap and timing data.
    async fn load_session(&self, year: i32, round: u32) -> Result<Session>;

    /// Load the event calendar for a season.
    async fn load_schedule(&self, year: i32) -> Result<Schedule>;
}
