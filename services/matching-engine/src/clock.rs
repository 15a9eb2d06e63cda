//! Day-reset clock
//!
//! GoodForDay orders are purged once per day at a configured wall-clock
//! instant. The clock tracks the last reset and answers whether that
//! instant has been crossed since. Time itself comes through the
//! `TimeSource` trait so tests can drive the clock deterministically.
//!
//! The reset instant is evaluated in the local civil calendar.

use chrono::{DateTime, Local, NaiveTime, Timelike};
use types::errors::ClockError;

/// Default reset time, one minute before a 16:00 close.
pub const DEFAULT_RESET_HOUR: u32 = 15;
pub const DEFAULT_RESET_MINUTE: u32 = 59;

/// Source of the current wall-clock time.
pub trait TimeSource {
    fn now(&self) -> DateTime<Local>;
}

/// Production time source backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Tracks the daily reset instant and the last reset that occurred.
pub struct DayClock {
    reset_time: NaiveTime,
    last_reset: DateTime<Local>,
    source: Box<dyn TimeSource>,
}

impl DayClock {
    /// Create a clock resetting daily at `hour:minute` on the system clock.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ClockError> {
        Self::with_source(hour, minute, Box::new(SystemTimeSource))
    }

    /// Create a clock with an injected time source.
    pub fn with_source(
        hour: u32,
        minute: u32,
        source: Box<dyn TimeSource>,
    ) -> Result<Self, ClockError> {
        let reset_time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(ClockError::InvalidResetTime { hour, minute })?;
        let last_reset = source.now();
        Ok(Self {
            reset_time,
            last_reset,
            source,
        })
    }

    /// Whether a day reset is due: the last reset happened before today's
    /// configured reset instant and the current time is at or past it.
    pub fn should_reset_day(&self) -> bool {
        let now = self.source.now();
        let naive_reset = now.date_naive().and_time(self.reset_time);
        // A reset instant erased by a DST transition is skipped for the day
        let Some(today_reset) = naive_reset.and_local_timezone(Local).earliest() else {
            return false;
        };
        self.last_reset < today_reset && now >= today_reset
    }

    /// Record that a reset has just been performed.
    pub fn mark_reset_occurred(&mut self) {
        self.last_reset = self.source.now();
    }

    /// Change the daily reset instant.
    pub fn set_reset_time(&mut self, hour: u32, minute: u32) -> Result<(), ClockError> {
        self.reset_time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(ClockError::InvalidResetTime { hour, minute })?;
        Ok(())
    }

    pub fn reset_hour(&self) -> u32 {
        self.reset_time.hour()
    }

    pub fn reset_minute(&self) -> u32 {
        self.reset_time.minute()
    }

    pub fn last_reset(&self) -> DateTime<Local> {
        self.last_reset
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_HOUR, DEFAULT_RESET_MINUTE)
            .expect("default reset time is a valid wall-clock time")
    }
}
