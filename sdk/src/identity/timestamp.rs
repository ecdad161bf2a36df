//! Ledger timestamps and transaction valid-start generation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rand::Rng;

use super::ParseError;
use crate::config::{VALID_START_BACKDATE_MAX, VALID_START_BACKDATE_MIN};
use crate::proto;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Last valid start handed out by [`Timestamp::generate`] in this process.
static LAST_ISSUED: Mutex<Option<Timestamp>> = parking_lot::const_mutex(None);

/// Seconds and nanoseconds since the Unix epoch.
///
/// `nanos` is always normalized to `0..1_000_000_000`, so the derived
/// ordering (seconds first, then nanos) is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self::from_total_nanos(
            i128::from(seconds) * i128::from(NANOS_PER_SECOND) + i128::from(nanos),
        )
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::new(dt.timestamp(), dt.timestamp_subsec_nanos() as i32)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos as u32).single()
    }

    /// A fresh transaction valid start.
    ///
    /// Wall-clock time, backdated by a random few seconds with nanosecond
    /// resolution to absorb client clock skew. Values handed out by one
    /// process are strictly increasing: if the clock (or the jitter) would
    /// produce a value at or before the last one issued, the last one plus
    /// a nanosecond is used instead.
    pub fn generate() -> Self {
        let backdate = rand::thread_rng().gen_range(
            VALID_START_BACKDATE_MIN.as_nanos()..VALID_START_BACKDATE_MAX.as_nanos(),
        );
        let candidate = Self::now().minus_nanos(backdate as i128);

        let mut last = LAST_ISSUED.lock();
        let issued = match *last {
            Some(prev) if candidate <= prev => prev.plus_nanos(1),
            _ => candidate,
        };
        *last = Some(issued);
        issued
    }

    pub fn plus_nanos(&self, nanos: i128) -> Self {
        Self::from_total_nanos(self.total_nanos() + nanos)
    }

    pub fn minus_nanos(&self, nanos: i128) -> Self {
        Self::from_total_nanos(self.total_nanos() - nanos)
    }

    pub fn plus(&self, duration: Duration) -> Self {
        self.plus_nanos(duration.as_nanos() as i128)
    }

    fn total_nanos(&self) -> i128 {
        i128::from(self.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(self.nanos)
    }

    fn from_total_nanos(total: i128) -> Self {
        let per = i128::from(NANOS_PER_SECOND);
        Self {
            seconds: total.div_euclid(per) as i64,
            nanos: total.rem_euclid(per) as i32,
        }
    }

    pub fn to_proto(&self) -> proto::Timestamp {
        proto::Timestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        }
    }

    pub fn from_proto(pb: &proto::Timestamp) -> Self {
        Self::new(pb.seconds, pb.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    /// Parses `seconds.nanos`. The fractional part is read as a count of
    /// nanoseconds (up to nine digits), matching what `Display` writes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFormat {
            kind: "timestamp",
            input: s.to_string(),
        };
        let (secs, nanos) = s.split_once('.').ok_or_else(invalid)?;
        if nanos.is_empty() || nanos.len() > 9 {
            return Err(invalid());
        }
        let seconds = super::parse_u64(secs)?;
        let nanos = super::parse_u64(nanos)?;
        let seconds = i64::try_from(seconds).map_err(|_| invalid())?;
        Ok(Self {
            seconds,
            nanos: nanos as i32,
        })
    }
}
