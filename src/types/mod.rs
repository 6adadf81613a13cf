//! Public types for the Paddock API.

mod key;
mod schedule;
mod session;

pub use key::CacheKey;
pub use schedule::{Event, Schedule};
pub use session::{FastestLap, Lap, Session};
