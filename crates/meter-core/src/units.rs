//! Volumetric unit handling.
//!
//! Meter exports report consumption in CCF (hundreds of cubic feet); the
//! pipeline reports gallons.

/// The only unit token accepted in the unit column (compared after trimming
/// and upper-casing).
pub const SOURCE_UNIT: &str = "CCF";

/// Display name of the target unit.
pub const TARGET_UNIT: &str = "gallons";

/// Gallons in one CCF.
pub const GALLONS_PER_CCF: f64 = 748.052;

/// Convert a CCF quantity to gallons.
pub fn ccf_to_gallons(ccf: f64) -> f64 {
    ccf * GALLONS_PER_CCF
}

/// `true` when `raw` names the source unit, ignoring surrounding whitespace
/// and case.
pub fn is_source_unit(raw: &str) -> bool {
    raw.trim().to_uppercase() == SOURCE_UNIT
}

/// Parse a quantity cell as a finite number.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected even
/// though Rust's float parser accepts them.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccf_to_gallons() {
        assert!((ccf_to_gallons(1.0) - 748.052).abs() < 1e-9);
        assert!((ccf_to_gallons(2.5) - 1870.13).abs() < 1e-6);
        assert_eq!(ccf_to_gallons(0.0), 0.0);
    }

    #[test]
    fn test_is_source_unit_case_and_whitespace() {
        assert!(is_source_unit("CCF"));
        assert!(is_source_unit("ccf"));
        assert!(is_source_unit("  Ccf \t"));
        assert!(!is_source_unit("ccm"));
        assert!(!is_source_unit(""));
        assert!(!is_source_unit("C CF"));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2.5"), Some(2.5));
        assert_eq!(parse_quantity(" 3 "), Some(3.0));
        assert_eq!(parse_quantity("-1"), Some(-1.0));
        assert_eq!(parse_quantity("1e2"), Some(100.0));
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("NaN"), None);
        assert_eq!(parse_quantity("inf"), None);
    }
}
