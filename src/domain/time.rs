// Minute-precision local timestamps as exchanged with the forecasting service
use chrono::{Duration, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Accepted input layouts, most specific first
const PARSE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A naive local date-time truncated to the minute, rendered `YYYY-MM-DDTHH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTimestamp(NaiveDateTime);

impl LocalTimestamp {
    pub fn new(time: NaiveDateTime) -> Self {
        let truncated = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self(truncated)
    }

    pub fn checked_add_days(&self, days: i64) -> Option<LocalTimestamp> {
        self.0
            .checked_add_signed(Duration::days(days))
            .map(LocalTimestamp)
    }

    /// Uniformly sample a minute in `[start, end]`. Returns `start` for an empty range.
    pub fn random_between<R: Rng + ?Sized>(
        start: LocalTimestamp,
        end: LocalTimestamp,
        rng: &mut R,
    ) -> LocalTimestamp {
        let span = (end.0 - start.0).num_minutes();
        if span <= 0 {
            return start;
        }
        let offset = rng.random_range(0..=span);
        LocalTimestamp(start.0 + Duration::minutes(offset))
    }

    /// Clamp into `[min, max]`; missing bounds are ignored.
    pub fn clamp_to(self, min: Option<LocalTimestamp>, max: Option<LocalTimestamp>) -> LocalTimestamp {
        match (min, max) {
            (Some(min), _) if self < min => min,
            (_, Some(max)) if self > max => max,
            _ => self,
        }
    }
}

impl fmt::Display for LocalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for LocalTimestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PARSE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(LocalTimestamp::new)
            .ok_or_else(|| format!("Invalid timestamp '{}', expected YYYY-MM-DDTHH:MM", s))
    }
}

impl Serialize for LocalTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
