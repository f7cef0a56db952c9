use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// `strftime` pattern of the date column in meter exports.
pub const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y";

/// `strftime` pattern used for every date the pipeline emits.
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

fn date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("regex is valid"))
}

/// Parse a `MM/DD/YYYY` cell into a calendar date.
///
/// Surrounding whitespace is ignored. The month and day must be zero-padded
/// to two digits and the year must have four; chrono alone would accept
/// `2/3/2025`, so the shape is checked before the calendar is.
///
/// Returns `None` for anything else, including impossible dates such as
/// `02/30/2025`.
pub fn parse_meter_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if !date_shape().is_match(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, SOURCE_DATE_FORMAT).ok()
}

/// Render a date the way reports and exports show it (`YYYY-MM-DD`).
pub fn format_date(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_meter_date_valid() {
        assert_eq!(parse_meter_date("02/22/2025"), Some(ymd(2025, 2, 22)));
        assert_eq!(parse_meter_date("12/31/1999"), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_parse_meter_date_trims_whitespace() {
        assert_eq!(parse_meter_date("  02/22/2025\t"), Some(ymd(2025, 2, 22)));
    }

    #[test]
    fn test_parse_meter_date_rejects_unpadded() {
        assert_eq!(parse_meter_date("2/22/2025"), None);
        assert_eq!(parse_meter_date("02/2/2025"), None);
        assert_eq!(parse_meter_date("02/22/25"), None);
    }

    #[test]
    fn test_parse_meter_date_rejects_other_layouts() {
        assert_eq!(parse_meter_date("2025-02-22"), None);
        assert_eq!(parse_meter_date("22.02.2025"), None);
        assert_eq!(parse_meter_date("02/22/2025 00:00"), None);
        assert_eq!(parse_meter_date(""), None);
    }

    #[test]
    fn test_parse_meter_date_rejects_impossible_dates() {
        assert_eq!(parse_meter_date("02/30/2025"), None);
        assert_eq!(parse_meter_date("13/01/2025"), None);
        assert_eq!(parse_meter_date("00/10/2025"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2025, 2, 4)), "2025-02-04");
    }
}
