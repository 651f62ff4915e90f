//! Excel date-serial conversion (1900 date system).
//!
//! Serials stay `f64` end to end — they are read as numbers, carried as
//! numbers, and written back as numbers so exports round-trip. Conversion to
//! a calendar date happens only for display.

use chrono::{Duration, NaiveDate};

/// Day 0 of the 1900 date system. Day 1 is 1899-12-31; the off-by-two from
/// 1900-01-01 absorbs Excel's phantom 1900-02-29.
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert an Excel date serial to a calendar date.
///
/// Returns `None` for zero/negative serials and for values outside the
/// representable range. The fractional (time-of-day) part is discarded.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let days = serial.floor() as i64;
    excel_epoch()?.checked_add_signed(Duration::days(days))
}

/// Convert a calendar date back to its Excel serial.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    match excel_epoch() {
        Some(epoch) => (date - epoch).num_days() as f64,
        None => 0.0,
    }
}

/// Format a serial as `DD/MM/YYYY` for display; empty string when the serial
/// does not denote a date.
pub fn format_serial(serial: f64) -> String {
    match serial_to_date(serial) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_serials() {
        assert_eq!(
            serial_to_date(45000.0),
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
        assert_eq!(serial_to_date(1.0), NaiveDate::from_ymd_opt(1899, 12, 31));
        // Post-bug serials line up with real dates
        assert_eq!(serial_to_date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
    }

    #[test]
    fn non_dates_rejected() {
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(-3.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn time_fraction_discarded() {
        assert_eq!(serial_to_date(45000.75), serial_to_date(45000.0));
    }

    #[test]
    fn round_trip() {
        for serial in [1.0, 61.0, 45000.0, 50000.0] {
            let date = serial_to_date(serial).unwrap();
            assert_eq!(date_to_serial(date), serial);
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(format_serial(45000.0), "15/03/2023");
        assert_eq!(format_serial(0.0), "");
        assert_eq!(format_serial(-1.0), "");
    }
}
