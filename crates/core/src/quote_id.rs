//! Quote identifier format: `TKF-YYYYMMDD-NNNN`.
//!
//! The 4-digit suffix is a per-day sequence; allocation lives in the
//! database (an atomic per-day counter), formatting and validation live
//! here.

use chrono::NaiveDate;

/// Prefix shared by all quote ids.
pub const PREFIX: &str = "TKF";

/// The `YYYYMMDD` day key used both in the id and as the counter key.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Format a quote id from a date and that day's sequence number.
pub fn format_id(date: NaiveDate, sequence: u32) -> String {
    format!("{PREFIX}-{}-{sequence:04}", day_key(date))
}

/// Whether `id` matches `TKF-YYYYMMDD-NNNN` (digits only; the date part is
/// not range-checked beyond being eight digits).
pub fn is_valid(id: &str) -> bool {
    let mut parts = id.splitn(3, '-');
    let (Some(prefix), Some(day), Some(seq)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    prefix == PREFIX
        && day.len() == 8
        && day.bytes().all(|b| b.is_ascii_digit())
        && seq.len() == 4
        && seq.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_id(date(2026, 8, 29), 1), "TKF-20260829-0001");
        assert_eq!(format_id(date(2026, 8, 29), 42), "TKF-20260829-0042");
        assert_eq!(format_id(date(2026, 12, 1), 9999), "TKF-20261201-9999");
    }

    #[test]
    fn validates_well_formed_ids() {
        assert!(is_valid("TKF-20260829-0001"));
        assert!(is_valid(&format_id(date(2025, 1, 2), 7)));
    }

    #[test]
    fn rejects_malformed_ids() {
        for id in [
            "",
            "TKF",
            "TKF-20260829",
            "TKF-2026089-0001",
            "TKF-20260829-001",
            "TKF-20260829-00001",
            "QTE-20260829-0001",
            "TKF-2026082a-0001",
            "TKF-20260829-00a1",
        ] {
            assert!(!is_valid(id), "{id:?} should be invalid");
        }
    }
}
