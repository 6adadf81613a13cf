//! Session cache key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{PaddockError, Result};

/// Identifies one session in the cache: a season and a round within it.
///
/// Keys are always stored in integer form. Textual input (path segments,
/// CLI arguments) goes through [`CacheKey::parse`] so that `"2024"`/`"05"`
/// and `2024`/`5` land on the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub year: i32,
    pub round: u32,
}

impl CacheKey {
    pub const fn new(year: i32, round: u32) -> Self {
        Self { year, round }
    }

    /// Normalize a textual (year, round) pair.
    ///
    /// Surrounding whitespace and leading zeros are accepted; anything that
    /// is not a plain integer is rejected with [`PaddockError::InvalidKey`].
    pub fn parse(year: &str, round: &str) -> Result<Self> {
        let year = parse_component::<i32>("year", year)?;
        let round = parse_component::<u32>("round", round)?;
        Ok(Self { year, round })
    }
}

fn parse_component<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse::<T>()
        .map_err(|_| PaddockError::InvalidKey(format!("{name} must be an integer, got {raw:?}")))
}

impl From<(i32, u32)> for CacheKey {
    fn from((year, round): (i32, u32)) -> Self {
        Self::new(year, round)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.round)
    }
}
