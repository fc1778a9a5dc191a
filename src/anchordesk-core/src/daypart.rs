//! Time-of-day buckets driving tone and pacing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Daypart {
    Morning,
    Day,
    Evening,
    LateNight,
    Overnight,
}

impl Daypart {
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=11 => Daypart::Morning,
            12..=16 => Daypart::Day,
            17..=21 => Daypart::Evening,
            22 | 23 | 0 | 1 => Daypart::LateNight,
            _ => Daypart::Overnight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Morning => "morning",
            Daypart::Day => "day",
            Daypart::Evening => "evening",
            Daypart::LateNight => "late_night",
            Daypart::Overnight => "overnight",
        }
    }

    /// Business-hours dayparts get the longer ad buffer.
    pub fn is_daytime(&self) -> bool {
        matches!(self, Daypart::Morning | Daypart::Day)
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Daypart::Morning => "Good morning",
            Daypart::Day => "Good afternoon",
            _ => "Good evening",
        }
    }
}

impl std::fmt::Display for Daypart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Show pacing derived purely from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    Low,
    Medium,
    MediumHigh,
    High,
}

impl Energy {
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=11 => Energy::Medium,
            12..=16 => Energy::Low,
            17..=21 => Energy::MediumHigh,
            22 | 23 | 0 | 1 => Energy::High,
            _ => Energy::Low,
        }
    }
}

/// Wall-clock inputs for one cycle. `hour` is local time; `now` is the
/// instant used for every cooldown comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleClock {
    pub now: DateTime<Utc>,
    pub hour: u32,
}

impl CycleClock {
    pub fn new(now: DateTime<Utc>, hour: u32) -> Self {
        Self { now, hour: hour % 24 }
    }

    pub fn daypart(&self) -> Daypart {
        Daypart::from_hour(self.hour)
    }

    pub fn energy(&self) -> Energy {
        Energy::from_hour(self.hour)
    }
}
