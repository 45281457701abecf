// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Relative time windows
//!
//! A [`TimeWindow`] turns a named duration such as `"2 days"` into an absolute
//! cutoff instant. The same windows drive the server-side fetch (coarse) and
//! client-side re-filtering (narrower), so the fetch window must always cover
//! any filter window applied to its results.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A named relative duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    /// The last 24 hours
    OneDay,
    /// The last 48 hours
    TwoDays,
    /// The last 7 days
    OneWeek,
    /// The last 30 days
    OneMonth,
}

impl TimeWindow {
    /// All windows, narrowest first
    pub const ALL: [TimeWindow; 4] = [Self::OneDay, Self::TwoDays, Self::OneWeek, Self::OneMonth];

    /// The widest window, used for fetching when no other is configured
    #[must_use]
    pub const fn widest() -> Self {
        Self::OneMonth
    }

    /// Canonical tag, e.g. `"1 week"`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1 day",
            Self::TwoDays => "2 days",
            Self::OneWeek => "1 week",
            Self::OneMonth => "1 month",
        }
    }

    /// Length of the window
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::OneDay => Duration::days(1),
            Self::TwoDays => Duration::days(2),
            Self::OneWeek => Duration::weeks(1),
            Self::OneMonth => Duration::days(30),
        }
    }

    /// Earliest instant inside the window ending at `reference`
    ///
    /// Saturates at the earliest representable instant.
    #[must_use]
    pub fn cutoff(self, reference: DateTime<Utc>) -> DateTime<Utc> {
        reference
            .checked_sub_signed(self.duration())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether this window is at least as wide as `other`
    #[must_use]
    pub fn covers(self, other: TimeWindow) -> bool {
        self >= other
    }

    /// Check that results fetched with this window can be narrowed to `filter`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WindowTooWide` when `filter` is wider than `self`;
    /// narrowing to it would silently miss commits that were never fetched.
    pub fn ensure_covers(self, filter: TimeWindow) -> Result<(), ConfigError> {
        if self.covers(filter) {
            Ok(())
        } else {
            Err(ConfigError::WindowTooWide {
                filter,
                fetch: self,
            })
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::widest()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match tag.to_ascii_lowercase().as_str() {
            "1 day" | "1d" => Ok(Self::OneDay),
            "2 days" | "2d" => Ok(Self::TwoDays),
            "1 week" | "1w" => Ok(Self::OneWeek),
            "1 month" | "1m" => Ok(Self::OneMonth),
            _ => Err(ConfigError::InvalidConfiguration(format!(
                "unknown time window {s:?} (expected one of \"1 day\", \"2 days\", \"1 week\", \"1 month\")"
            ))),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.as_str().to_string()
    }
}
