//! Loaded session data.
//!
//! Upstream payloads are decoded once into these structs at load time.
//! Fields the provider may omit are `Option`s rather than sentinel values.

use serde::{Deserialize, Serialize};

/// A loaded snapshot of one session's lap and timing data.
///
/// Stored behind an `Arc` by [`SessionCache`](crate::cache::SessionCache)
/// and never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub year: i32,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Session label as published upstream (e.g. "Qualifying").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(default)]
    pub laps: Vec<Lap>,
}

/// One timed lap. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// Driver abbreviation (e.g. "VER").
    pub driver: String,
    #[serde(default)]
    pub lap_number: Option<u32>,
    #[serde(default)]
    pub lap_time_secs: Option<f64>,
    #[serde(default)]
    pub sector1_secs: Option<f64>,
    #[serde(default)]
    pub sector2_secs: Option<f64>,
    #[serde(default)]
    pub sector3_secs: Option<f64>,
}

/// A driver's fastest lap in a session, with sector splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
    pub driver: String,
    pub lap_number: Option<u32>,
    pub lap_time_secs: f64,
    pub sector1_secs: Option<f64>,
    pub sector2_secs: Option<f64>,
    pub sector3_secs: Option<f64>,
}

impl Session {
    pub fn new(year: i32, round: u32) -> Self {
        Self {
            year,
            round,
            event_name: None,
            session_name: None,
            laps: Vec::new(),
        }
    }

    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    pub fn with_lap(mut self, lap: Lap) -> Self {
        self.laps.push(lap);
        self
    }

    /// All laps driven by `driver` (case-insensitive match).
    pub fn laps_for<'a>(&'a self, driver: &'a str) -> impl Iterator<Item = &'a Lap> + 'a {
        self.laps
            .iter()
            .filter(move |lap| lap.driver.eq_ignore_ascii_case(driver))
    }

    /// The driver's fastest lap, ignoring laps without a lap time.
    ///
    /// Ties keep the earliest lap in session order.
    pub fn fastest_lap(&self, driver: &str) -> Option<FastestLap> {
        let mut best: Option<(&Lap, f64)> = None;
        for lap in self.laps_for(driver) {
            let Some(time) = lap.lap_time_secs.filter(|t| t.is_finite()) else {
                continue;
            };
            if best.is_none_or(|(_, t)| time < t) {
                best = Some((lap, time));
            }
        }
        best.map(|(lap, lap_time_secs)| FastestLap {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            lap_time_secs,
            sector1_secs: lap.sector1_secs,
            sector2_secs: lap.sector2_secs,
            sector3_secs: lap.sector3_secs,
        })
    }
}

impl Lap {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            lap_number: None,
            lap_time_secs: None,
            sector1_secs: None,
            sector2_secs: None,
            sector3_secs: None,
        }
    }

    pub fn number(mut self, n: u32) -> Self {
        self.lap_number = Some(n);
        self
    }

    pub fn time(mut self, secs: f64) -> Self {
        self.lap_time_secs = Some(secs);
        self
    }

    pub fn sectors(mut self, s1: f64, s2: f64, s3: f64) -> Self {
        self.sector1_secs = Some(s1);
        self.sector2_secs = Some(s2);
        self.sector3_secs = Some(s3);
        self
    }
}
