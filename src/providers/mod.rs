//! Upstream race-data providers.
//!
//! The caches never talk to the network themselves; they call a
//! [`RaceDataProvider`]. [`HttpProvider`] is the bundled implementation,
//! tests substitute in-memory mocks.

pub mod http;
pub mod traits;

pub use http::HttpProvider;
pub use traits::RaceDataProvider;
