//! Wall clock used for run names
//!
//! Sessions read the time through the `Clock` trait so the run name can be
//! pinned, either in tests or from the CLI (`--run-time`):
//!
//! ```text
//! Auto Test | 2024-01-15 10:30:00
//! Auto Test | 2024-01-15 10:30:00.250000
//! ```

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local, NaiveDateTime, Timelike};

/// Prefix of every generated run name
pub const RUN_NAME_PREFIX: &str = "Auto Test | ";

pub trait Clock: Send + Sync {
    /// Current local time, without timezone
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to a fixed time, or real time while unset
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    inner: Arc<RwLock<Option<NaiveDateTime>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed(time: NaiveDateTime) -> Self {
        let clock = Self::new();
        clock.set(time);
        clock
    }

    pub fn set(&self, time: NaiveDateTime) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(time);
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        (*state).unwrap_or_else(|| Local::now().naive_local())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
}

/// `YYYY-MM-DD HH:MM:SS`, with `.ffffff` appended when there are microseconds
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    if time.nanosecond() / 1_000 == 0 {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

pub fn run_name(clock: &dyn Clock) -> String {
    format!("{}{}", RUN_NAME_PREFIX, format_timestamp(&clock.now()))
}

/// Parse a local time (`2024-01-15 10:30:00`, `2024-01-15T10:30:00`)
/// or an RFC 3339 time, which is converted to local time
pub fn parse_time(s: &str) -> Result<NaiveDateTime, ClockError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    Err(ClockError::InvalidTimeFormat(format!(
        "could not parse '{}' as a local time or RFC 3339",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn test_run_name_from_fixed_clock() {
        let clock = MockClock::fixed(at(10, 30, 0, 0));
        assert_eq!(run_name(&clock), "Auto Test | 2024-01-15 10:30:00");
    }

    #[test]
    fn test_run_name_with_microseconds() {
        let clock = MockClock::fixed(at(10, 30, 0, 250_000));
        assert_eq!(run_name(&clock), "Auto Test | 2024-01-15 10:30:00.250000");
    }

    #[test]
    fn test_mock_clock_set_repins() {
        let clock = MockClock::fixed(at(10, 0, 0, 0));
        clock.set(at(11, 0, 0, 0));
        assert_eq!(clock.now(), at(11, 0, 0, 0));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("2024-01-15 10:30:00").unwrap(), at(10, 30, 0, 0));
        assert_eq!(parse_time("2024-01-15T10:30:00.5").unwrap(), at(10, 30, 0, 500_000));
        assert!(parse_time("2024-01-15T10:30:00Z").is_ok());
        assert!(parse_time("yesterday").is_err());
    }
}
