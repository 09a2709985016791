use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A wall-clock time of day, always rendered as two-digit `HH:MM`.
///
/// The Omlet API stores schedule times as strings and uses `"00:00"`
/// as an "unset" sentinel for fan time slots. Parsing is lenient:
/// `"7:5"`, `"07:05"`, and `"07:05:30"` all yield 07:05.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Midnight, doubling as the API's "slot not configured" sentinel.
    pub const UNSET: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Whether this is the `"00:00"` sentinel.
    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// Lenient parse with a documented fallback for malformed input.
    pub fn parse_or(s: &str, fallback: TimeOfDay) -> TimeOfDay {
        s.parse().unwrap_or(fallback)
    }
}

impl FromStr for TimeOfDay {
    type Err = ();

    /// Accepts `H:M`, `HH:MM`, and `HH:MM:SS` (seconds discarded).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let hour = parts.next().ok_or(())?.trim().parse::<u8>().map_err(|_| ())?;
        let minute = parts
            .next()
            .ok_or(())?
            .trim()
            .parse::<u8>()
            .map_err(|_| ())?;
        Self::new(hour, minute).ok_or(())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}
