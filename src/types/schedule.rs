//! Season calendar types.

use serde::{Deserialize, Serialize};

/// The ordered list of events for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: i32,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One round of a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub round: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Event date as published upstream (ISO 8601 date, not parsed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Schedule {
    pub fn new(year: i32, events: Vec<Event>) -> Self {
        Self { year, events }
    }

    /// Find an event by round number.
    pub fn event(&self, round: u32) -> Option<&Event> {
        self.events.iter().find(|e| e.round == round)
    }
}

impl Event {
    pub fn new(round: u32, name: impl Into<String>) -> Self {
        Self {
            round,
            name: name.into(),
            country: None,
            location: None,
            date: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}
