//! Query-parameter parsing helpers
//!
//! Parameters arrive as strings and are parsed by hand so malformed input
//! maps to the stable `validation_error` code instead of a framework
//! rejection in a different shape.

use crate::api::types::ApiError;

pub fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "Missing required parameter '{}'",
            name
        ))),
    }
}

pub fn parse_i32(value: &str, name: &str) -> Result<i32, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::bad_request(format!("Parameter '{}' must be an integer", name))
    })
}

pub fn parse_opt_i32(value: Option<&str>, name: &str) -> Result<Option<i32>, ApiError> {
    value.map(|v| parse_i32(v, name)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require(None, "year").is_err());
        assert!(require(Some("  "), "year").is_err());
        assert_eq!(require(Some("Toyota"), "make").unwrap(), "Toyota");
    }

    #[test]
    fn test_parse_i32() {
        assert_eq!(parse_i32("2024", "year").unwrap(), 2024);
        assert_eq!(parse_i32(" 2024 ", "year").unwrap(), 2024);

        let err = parse_i32("twenty", "year").unwrap_err();
        assert_eq!(err.response.error.code, "validation_error");
    }

    #[test]
    fn test_parse_opt_i32() {
        assert_eq!(parse_opt_i32(None, "mileage").unwrap(), None);
        assert_eq!(parse_opt_i32(Some("42000"), "mileage").unwrap(), Some(42_000));
        assert!(parse_opt_i32(Some("abc"), "mileage").is_err());
    }
}
