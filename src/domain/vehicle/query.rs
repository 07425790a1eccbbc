//! YMMT query types and name matching rules
//!
//! Matching rules shared by every repository implementation:
//! - make and model compare case-insensitively
//! - hyphens in model names are equivalent to spaces ("CR-V" matches "CR V",
//!   in either direction)
//! - a trim filter is a case-insensitive prefix match, so "XSE" matches rows
//!   annotated "XSE/XSE V6" in source data

use serde::{Deserialize, Serialize};

/// Natural composite key for a vehicle configuration, trim optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub year: i32,
    pub make: String,
    pub model: String,
}

impl VehicleQuery {
    pub fn new(year: i32, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
        }
    }
}

/// Trim constraint for a query step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimFilter {
    /// Match rows whose trim starts with the given value (case-insensitive)
    Prefix(String),
    /// No trim constraint
    Any,
}

/// Search filter for the specs search route
#[derive(Debug, Clone, Default)]
pub struct SpecSearch {
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
}

/// Canonical form of a model name: lowercased, hyphens folded to spaces,
/// runs of whitespace collapsed.
pub fn normalize_model(model: &str) -> String {
    model
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two model spellings refer to the same model
pub fn model_matches(a: &str, b: &str) -> bool {
    normalize_model(a) == normalize_model(b)
}

/// Whether a make matches, case-insensitively
pub fn make_matches(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether a stored trim satisfies a trim filter
pub fn trim_matches(stored: Option<&str>, filter: &TrimFilter) -> bool {
    match filter {
        TrimFilter::Any => true,
        TrimFilter::Prefix(wanted) => match stored {
            Some(stored) => stored
                .get(..wanted.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(wanted)),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_model_hyphens() {
        assert_eq!(normalize_model("CR-V"), "cr v");
        assert_eq!(normalize_model("CR V"), "cr v");
        assert_eq!(normalize_model("F-150"), "f 150");
    }

    #[test]
    fn test_normalize_model_collapses_whitespace() {
        assert_eq!(normalize_model("  Grand   Cherokee "), "grand cherokee");
    }

    #[test]
    fn test_model_matches_both_directions() {
        assert!(model_matches("CR-V", "CR V"));
        assert!(model_matches("CR V", "CR-V"));
        assert!(model_matches("cr-v", "CR-V"));
        assert!(!model_matches("CR-V", "HR-V"));
    }

    #[test]
    fn test_make_matches_case_insensitive() {
        assert!(make_matches("Toyota", "toyota"));
        assert!(!make_matches("Toyota", "Honda"));
    }

    #[test]
    fn test_trim_prefix_match() {
        let filter = TrimFilter::Prefix("XSE".to_string());
        assert!(trim_matches(Some("XSE"), &filter));
        assert!(trim_matches(Some("XSE/XSE V6"), &filter));
        assert!(trim_matches(Some("xse v6"), &filter));
        assert!(!trim_matches(Some("LE"), &filter));
        assert!(!trim_matches(None, &filter));
    }

    #[test]
    fn test_trim_any_matches_everything() {
        assert!(trim_matches(Some("XSE"), &TrimFilter::Any));
        assert!(trim_matches(None, &TrimFilter::Any));
    }
}
