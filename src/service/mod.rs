//! Service facade over the caches and the upstream provider

mod builder;
mod race_data;

pub use builder::{Paddock, PaddockBuilder};
pub use race_data::RaceDataService;
