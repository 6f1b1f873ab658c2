//! View filter for hierarchy queries.

use serde::{Serialize, Serializer};

use crate::error::AppError;
use crate::models::identifier::{normalize, CweId, Identifier};

/// Restricts parent/child relationships to those visible in one CWE view
/// (for example `1000`, Research Concepts).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewFilter(CweId);

impl ViewFilter {
    pub fn new(view_id: CweId) -> Self {
        Self(view_id)
    }

    pub fn view_id(&self) -> &CweId {
        &self.0
    }

    /// Parse an optional caller value. Absent or blank means no filter.
    ///
    /// The view is itself a CWE id, so it goes through the same normalizer;
    /// the `all` sentinel makes no sense here and is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, AppError> {
        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(None),
        };

        match normalize(raw)? {
            Identifier::Id(id) => Ok(Some(Self(id))),
            Identifier::All => Err(AppError::invalid_identifier(raw)),
        }
    }
}

impl std::fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for ViewFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_blank_is_none() {
        assert_eq!(ViewFilter::parse(None).unwrap(), None);
        assert_eq!(ViewFilter::parse(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_view_is_normalized() {
        let view = ViewFilter::parse(Some("CWE-1000")).unwrap().unwrap();
        assert_eq!(view.view_id(), &CweId::new(1000));
        assert_eq!(view.to_string(), "1000");
    }

    #[test]
    fn test_invalid_views() {
        assert!(matches!(
            ViewFilter::parse(Some("research")),
            Err(AppError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            ViewFilter::parse(Some("all")),
            Err(AppError::InvalidIdentifier { .. })
        ));
    }
}
