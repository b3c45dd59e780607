//! Points in time, as stored in cache files

use std::fmt::{Display, Formatter};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
///
/// The value is kept as the exact `f64` that was read or computed, so that writing it back to a file
/// and re-parsing it gives a bit-identical value.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds as f64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// Whole seconds since the epoch (the fractional part is dropped)
    pub fn as_epoch_seconds(&self) -> i64 {
        self.0.trunc() as i64
    }

    /// The calendar date this timestamp stands for, or `None` if it does not represent any
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if self.0.is_finite() == false {
            return None;
        }
        let secs = self.0.floor();
        if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
            return None;
        }
        let nanos = ((self.0 - secs) * 1e9).round().min(999_999_999.0) as u32;
        Utc.timestamp_opt(secs as i64, nanos).single()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            None => write!(f, "<invalid date {}>", self.0),
        }
    }
}
