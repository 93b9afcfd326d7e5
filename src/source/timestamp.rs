//! Conversion between the Messages store's native timestamps and absolute time.
//!
//! `chat.db` stores `message.date` as nanoseconds elapsed since
//! 2001-01-01T00:00:00. Historically the reference point is interpreted in
//! local time, so [`TimestampCodec::local`] is what the CLI uses.

use std::time::{Duration as StdDuration, UNIX_EPOCH};

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const APPLE_EPOCH_UNIX_SECS: u64 = 978_307_200;

/// Converts between native nanosecond offsets and `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampCodec {
    epoch: DateTime<Utc>,
}

impl TimestampCodec {
    /// Codec anchored at an arbitrary reference epoch.
    pub fn with_epoch(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// Codec anchored at 2001-01-01T00:00:00 UTC.
    pub fn utc() -> Self {
        let epoch = UNIX_EPOCH + StdDuration::from_secs(APPLE_EPOCH_UNIX_SECS);
        Self::with_epoch(DateTime::<Utc>::from(epoch))
    }

    /// Codec anchored at 2001-01-01T00:00:00 in the machine's local time zone.
    ///
    /// Falls back to the UTC anchor if the local midnight does not exist.
    pub fn local() -> Self {
        let naive = NaiveDate::from_ymd_opt(2001, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        match naive.and_then(|n| Local.from_local_datetime(&n).earliest()) {
            Some(local) => Self::with_epoch(local.with_timezone(&Utc)),
            None => Self::utc(),
        }
    }

    /// The reference epoch as an absolute instant.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Native nanosecond offset to absolute time.
    pub fn to_absolute(&self, native: i64) -> DateTime<Utc> {
        self.epoch + Duration::nanoseconds(native)
    }

    /// Absolute time to native nanosecond offset, saturating at the `i64` bounds.
    pub fn to_native(&self, absolute: DateTime<Utc>) -> i64 {
        let delta = absolute.signed_duration_since(self.epoch);
        match delta.num_nanoseconds() {
            Some(ns) => ns,
            None if delta < Duration::zero() => i64::MIN,
            None => i64::MAX,
        }
    }

    /// Native lower bound for messages newer than `days_back` days before `now`.
    ///
    /// A window reaching past the representable range means "everything".
    pub fn cutoff_for(&self, days_back: u32, now: DateTime<Utc>) -> i64 {
        match now.checked_sub_signed(Duration::days(i64::from(days_back))) {
            Some(start) => self.to_native(start),
            None => i64::MIN,
        }
    }
}

impl Default for TimestampCodec {
    fn default() -> Self {
        Self::local()
    }
}
