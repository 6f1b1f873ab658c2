//! MCP tool implementations organized by domain.
//!
//! Tools only check that required parameters are present and well-typed,
//! then delegate everything else to the normalizer, client and services.

pub mod catalog;
pub mod hierarchy;
pub mod search;

use serde_json::Value;

use crate::error::AppError;

/// Value of a parameter the tool cannot run without.
///
/// Required parameters deserialize as optional so that a missing one is
/// reported as an `InvalidArgumentError` result instead of a protocol error.
pub(crate) fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value.ok_or_else(|| {
        AppError::InvalidArgument(format!("missing required parameter '{}'", name))
    })
}

/// Integer parameter, or `default` when absent or null.
pub(crate) fn integer_or(value: Option<&Value>, name: &str, default: i64) -> Result<i64, AppError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value.as_i64().ok_or_else(|| {
            AppError::InvalidArgument(format!("{} must be an integer, got {}", name, value))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_missing_is_invalid_argument() {
        assert_eq!(required(Some("79"), "ids").unwrap(), "79");
        match required(None, "ids") {
            Err(AppError::InvalidArgument(message)) => assert!(message.contains("'ids'")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_or() {
        assert_eq!(integer_or(None, "max_results", 10).unwrap(), 10);
        assert_eq!(integer_or(Some(&Value::Null), "max_results", 10).unwrap(), 10);
        assert_eq!(integer_or(Some(&json!(3)), "max_results", 10).unwrap(), 3);
        assert_eq!(integer_or(Some(&json!(-1)), "max_results", 10).unwrap(), -1);

        for bad in [json!(2.5), json!("5"), json!(true)] {
            assert!(matches!(
                integer_or(Some(&bad), "max_results", 10),
                Err(AppError::InvalidArgument(_))
            ));
        }
    }
}
