//! Paddock - coalescing fetch-and-cache layer for race session data
//!
//! Sits between request handlers and a slow, rate-limited race-data
//! provider. Loaded sessions live in a bounded LRU cache where concurrent
//! misses for the same (year, round) share a single upstream load; season
//! schedules live in a TTL cache. Every upstream call runs on a bounded
//! worker pool with a hard deadline.
//!
//! # Example
//!
//! ```rust,no_run
//! use paddock::Paddock;
//!
//! #[tokio::main]
//! async fn main() -> paddock::Result<()> {
//!     let service = Paddock::builder()
//!         .http("http://127.0.0.1:8000")
//!         .cache_capacity(6)
//!         .build()?;
//!
//!     let lap = service.fastest_lap(2024, 8, "LEC").await?;
//!     println!("{} {:.3}s", lap.driver, lap.lap_time_secs);
//!
//!     let schedule = service.schedule(2024).await?;
//!     println!("{} rounds", schedule.events.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod providers;
pub mod service;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::{LockRegistry, ScheduleCache, SessionCache};
pub use config::Config;
pub use error::{PaddockError, Result};
pub use executor::TimeoutExecutor;
pub use providers::{HttpProvider, RaceDataProvider};
pub use service::{Paddock, PaddockBuilder, RaceDataService};
pub use types::{CacheKey, Event, FastestLap, Lap, Schedule, Session};
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};
