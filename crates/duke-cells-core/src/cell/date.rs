//! Serial day numbers in the 1900 date system
//!
//! Dates are stored as the number of days since 1899-12-31 (1900-01-01 is
//! serial 1). The 1900 system also counts the non-existent 1900-02-29 as
//! serial 60, so every date from 1900-03-01 on is one day later than a plain
//! day count would give.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial of the phantom 1900-02-29
const PHANTOM_LEAP_DAY: i64 = 60;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).expect("1899-12-31 is a valid date")
}

fn first_day_after_phantom() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 3, 1).expect("1900-03-01 is a valid date")
}

/// Convert a date/time to its serial day number; the time of day becomes the fraction
pub fn date_to_serial(value: NaiveDateTime) -> f64 {
    let mut days = (value.date() - epoch()).num_days();
    if value.date() >= first_day_after_phantom() {
        days += 1;
    }

    let time = value.time();
    let seconds =
        time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1_000_000_000.0;

    days as f64 + seconds / SECONDS_PER_DAY
}

/// Convert a serial day number back to a date/time
///
/// Returns `None` for the phantom 1900-02-29, for negative serials and for
/// values outside the range chrono can represent.
pub fn serial_to_date(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let mut days = serial.trunc() as i64;
    if days == PHANTOM_LEAP_DAY {
        return None;
    }
    if days > PHANTOM_LEAP_DAY {
        days -= 1;
    }

    let millis = (serial.fract() * SECONDS_PER_DAY * 1000.0).round() as i64;
    let date = epoch().checked_add_signed(Duration::days(days))?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_known_serials() {
        assert_eq!(date_to_serial(date(1900, 1, 1)), 1.0);
        assert_eq!(date_to_serial(date(1900, 2, 28)), 59.0);
        assert_eq!(date_to_serial(date(1900, 3, 1)), 61.0);
        assert_eq!(date_to_serial(date(2017, 1, 1)), 42736.0);
    }

    #[test]
    fn test_time_fraction() {
        let noon = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(date_to_serial(noon), 42736.5);
        assert_eq!(serial_to_date(42736.5), Some(noon));
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(1.0), Some(date(1900, 1, 1)));
        assert_eq!(serial_to_date(59.0), Some(date(1900, 2, 28)));
        assert_eq!(serial_to_date(60.0), None); // 1900-02-29 never existed
        assert_eq!(serial_to_date(61.0), Some(date(1900, 3, 1)));
        assert_eq!(serial_to_date(42736.0), Some(date(2017, 1, 1)));
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }
}
