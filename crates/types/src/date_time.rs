//! OPC UA timestamps.
//!
//! The wire representation is a signed count of 100-nanosecond intervals
//! since 1601-01-01 00:00 UTC (the Windows FILETIME epoch). Zero is the
//! conventional "no timestamp" value.

use std::time::{SystemTime, UNIX_EPOCH};

/// Ticks per second (one tick = 100 ns).
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Seconds between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_OFFSET_SECONDS: i64 = 11_644_473_600;

/// A point in time as 100 ns ticks since 1601-01-01 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime(i64);

impl DateTime {
    /// The "no timestamp" sentinel.
    pub const NULL: DateTime = DateTime(0);

    /// The current system time.
    pub fn now() -> DateTime {
        DateTime::from(SystemTime::now())
    }

    /// Builds a timestamp from a raw tick count.
    pub const fn from_ticks(ticks: i64) -> DateTime {
        DateTime(ticks)
    }

    /// 100 ns ticks since 1601-01-01 UTC.
    pub const fn ticks(self) -> i64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<SystemTime> for DateTime {
    fn from(time: SystemTime) -> DateTime {
        // Times before the Unix epoch land on the other side of the
        // duration_since error; both arms fold into signed ticks.
        let ticks = match time.duration_since(UNIX_EPOCH) {
            Ok(after) => {
                (after.as_secs() as i64 + UNIX_EPOCH_OFFSET_SECONDS) * TICKS_PER_SECOND
                    + (after.subsec_nanos() / 100) as i64
            }
            Err(err) => {
                let before = err.duration();
                (UNIX_EPOCH_OFFSET_SECONDS - before.as_secs() as i64) * TICKS_PER_SECOND
                    - (before.subsec_nanos() / 100) as i64
            }
        };
        DateTime(ticks)
    }
}
