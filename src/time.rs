//! Nanosecond-precision timestamps.
//!
//! [`NanoTime`] keeps the calendar form used by the file headers (year and
//! day-of-year) and converts to and from nanoseconds since the Unix epoch
//! for arithmetic.

use std::fmt;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Nanosecond-precision UTC timestamp (year + day-of-year + time).
///
/// Field order makes the derived `Ord` chronological for normalised
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NanoTime {
    pub year: u16,
    pub day: u16,        // 1-366
    pub hour: u8,        // 0-23
    pub minute: u8,      // 0-59
    pub second: u8,      // 0-59
    pub nanosecond: u32, // 0-999_999_999
}

impl NanoTime {
    /// 1970-001 00:00:00.000000000
    pub fn epoch() -> Self {
        Self {
            year: 1970,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
        }
    }

    /// Build a timestamp from nanoseconds since the Unix epoch.
    pub fn from_epoch_nanos(nanos: i64) -> Self {
        let secs = nanos.div_euclid(NANOS_PER_SECOND);
        let nanosecond = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
        let days = secs.div_euclid(SECONDS_PER_DAY);
        let sod = secs.rem_euclid(SECONDS_PER_DAY);

        let mut year = 1970 + days.div_euclid(365);
        while days_before_year(year) > days {
            year -= 1;
        }
        while days_before_year(year + 1) <= days {
            year += 1;
        }

        Self {
            year: year as u16,
            day: (days - days_before_year(year) + 1) as u16,
            hour: (sod / 3600) as u8,
            minute: (sod % 3600 / 60) as u8,
            second: (sod % 60) as u8,
            nanosecond,
        }
    }

    /// Build a timestamp from microseconds since the Unix epoch.
    ///
    /// Values beyond the nanosecond range saturate.
    pub fn from_epoch_micros(micros: i64) -> Self {
        Self::from_epoch_nanos(micros.saturating_mul(1_000))
    }

    /// Nanoseconds since the Unix epoch, saturating at the `i64` limits.
    pub fn to_epoch_nanos(self) -> i64 {
        let days = days_before_year(self.year as i64) + self.day as i64 - 1;
        let secs = days * SECONDS_PER_DAY
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64;
        let nanos = secs as i128 * NANOS_PER_SECOND as i128 + self.nanosecond as i128;
        nanos.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Shift by a signed number of nanoseconds, saturating at the
    /// representable range.
    pub fn add_nanos(self, nanos: i64) -> Self {
        Self::from_epoch_nanos(self.to_epoch_nanos().saturating_add(nanos))
    }

    /// Seconds since the Unix epoch as a float.
    pub fn timestamp(self) -> f64 {
        self.to_epoch_nanos() as f64 / NANOS_PER_SECOND as f64
    }
}

impl Default for NanoTime {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for NanoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03} {:02}:{:02}:{:02}.{:09}",
            self.year, self.day, self.hour, self.minute, self.second, self.nanosecond
        )
    }
}

/// Days from 1970-01-01 to January 1st of `year` (proleptic Gregorian).
fn days_before_year(year: i64) -> i64 {
    let leaps = |y: i64| y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400);
    365 * (year - 1970) + leaps(year - 1) - leaps(1969)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanotime_epoch() {
        let nt = NanoTime::epoch();
        assert_eq!(nt.year, 1970);
        assert_eq!(nt.day, 1);
        assert_eq!(nt.to_epoch_nanos(), 0);
        assert_eq!(NanoTime::from_epoch_nanos(0), nt);
    }

    #[test]
    fn test_known_timestamp() {
        // 2017-08-04 (day 216) 12:30:45 UTC
        let nt = NanoTime::from_epoch_micros(1_501_849_845_250_000);
        assert_eq!(nt.year, 2017);
        assert_eq!(nt.day, 216);
        assert_eq!(nt.hour, 12);
        assert_eq!(nt.minute, 30);
        assert_eq!(nt.second, 45);
        assert_eq!(nt.nanosecond, 250_000_000);
        assert_eq!(nt.to_epoch_nanos(), 1_501_849_845_250_000_000);
    }

    #[test]
    fn test_leap_year_boundaries() {
        // 2016-366 is Dec 31st of a leap year
        let nt = NanoTime {
            year: 2016,
            day: 366,
            hour: 23,
            minute: 59,
            second: 59,
            nanosecond: 999_999_999,
        };
        let next = nt.add_nanos(1);
        assert_eq!(next.year, 2017);
        assert_eq!(next.day, 1);
        assert_eq!(next.hour, 0);
        assert_eq!(next.nanosecond, 0);
    }

    #[test]
    fn test_before_epoch() {
        let nt = NanoTime::from_epoch_nanos(-1);
        assert_eq!(nt.year, 1969);
        assert_eq!(nt.day, 365);
        assert_eq!(nt.second, 59);
        assert_eq!(nt.nanosecond, 999_999_999);
        assert_eq!(nt.to_epoch_nanos(), -1);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        for nanos in [i64::MIN, i64::MAX] {
            let nt = NanoTime::from_epoch_nanos(nanos);
            assert_eq!(nt.to_epoch_nanos(), nanos);
            assert_eq!(nt.add_nanos(nanos).to_epoch_nanos(), nanos);
        }
        let max = NanoTime::from_epoch_micros(i64::MAX);
        assert_eq!(max, NanoTime::from_epoch_nanos(i64::MAX));
        assert_eq!(max.year, 2262);
        assert_eq!(NanoTime::from_epoch_micros(i64::MIN).year, 1677);

        let far = NanoTime {
            year: 9999,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
        };
        assert_eq!(far.to_epoch_nanos(), i64::MAX);
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = NanoTime::from_epoch_nanos(1_000);
        let b = NanoTime::from_epoch_nanos(2_000_000_000);
        assert!(a < b);
        assert!(b.add_nanos(-1_999_999_000) == a);
    }

    #[test]
    fn test_display_pads_fields() {
        let nt = NanoTime::from_epoch_micros(1_501_849_845_250_000).add_nanos(-45_000_000_000);
        assert_eq!(nt.to_string(), "2017-216 12:30:00.250000000");
        assert_eq!(NanoTime::epoch().to_string(), "1970-001 00:00:00.000000000");
    }
}
