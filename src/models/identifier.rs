//! CWE identifier normalization.
//!
//! Callers spell identifiers many ways (`79`, `CWE-79`, `cwe79`, ` cwe_79 `).
//! Everything is reduced to the numeric value before it reaches the
//! dispatcher, so upstream paths only ever contain bare decimal numerals
//! or the `all` sentinel.

use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::AppError;

/// Literal token requesting a complete listing.
pub const ALL_SENTINEL: &str = "all";

const CWE_PREFIX: &str = "cwe";

/// A numeric CWE identifier (`79` for CWE-79), kept as canonical decimal
/// digits with no leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CweId(String);

impl CweId {
    pub fn new(value: u32) -> Self {
        Self(value.to_string())
    }

    /// Canonical form of a non-empty run of ASCII digits.
    fn from_digits(digits: &str) -> Self {
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            Self("0".to_string())
        } else {
            Self(significant.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CweId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CweId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A normalized identifier: a single CWE id or the `all` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Id(CweId),
    All,
}

impl Identifier {
    pub fn is_all(&self) -> bool {
        matches!(self, Identifier::All)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Id(id) => id.fmt(f),
            Identifier::All => f.write_str(ALL_SENTINEL),
        }
    }
}

impl FromStr for Identifier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Normalize one raw identifier token.
///
/// Trims whitespace, drops a case-insensitive `CWE` prefix and any other
/// non-digit characters leading the remainder, then requires what is left to
/// be decimal digits. The token `all` (any case) passes through as
/// [`Identifier::All`].
pub fn normalize(raw: &str) -> Result<Identifier, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        return Ok(Identifier::All);
    }

    let rest = strip_prefix_ignore_case(trimmed, CWE_PREFIX);
    let digits = rest.trim_start_matches(|c: char| !c.is_ascii_digit());

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::invalid_identifier(raw));
    }

    Ok(Identifier::Id(CweId::from_digits(digits)))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> &'a str {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &s[prefix.len()..],
        _ => s,
    }
}

/// Ordered identifiers parsed from a comma-separated string.
///
/// Order and duplicates are kept exactly as the caller wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierList(Vec<Identifier>);

/// What a list of identifiers asks the upstream for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Ids(Vec<CweId>),
}

/// Split on commas and normalize each segment. Fails on the first bad segment.
pub fn normalize_list(raw: &str) -> Result<IdentifierList, AppError> {
    raw.split(',')
        .map(normalize)
        .collect::<Result<Vec<_>, _>>()
        .map(IdentifierList)
}

impl IdentifierList {
    pub fn new(identifiers: Vec<Identifier>) -> Self {
        Self(identifiers)
    }

    pub fn as_slice(&self) -> &[Identifier] {
        &self.0
    }

    /// Resolve to either the full listing or concrete ids.
    ///
    /// The sentinel must stand alone; `all,79` is rejected.
    pub fn selection(&self) -> Result<Selection, AppError> {
        if self.0.iter().any(Identifier::is_all) {
            if self.0.len() == 1 {
                return Ok(Selection::All);
            }
            return Err(AppError::invalid_identifier(ALL_SENTINEL));
        }

        let ids = self
            .0
            .iter()
            .filter_map(|identifier| match identifier {
                Identifier::Id(id) => Some(id.clone()),
                Identifier::All => None,
            })
            .collect();
        Ok(Selection::Ids(ids))
    }

    /// The single concrete id, for operations that take exactly one.
    pub fn single(&self, operation: &str) -> Result<CweId, AppError> {
        match self.0.as_slice() {
            [Identifier::Id(id)] => Ok(id.clone()),
            [Identifier::All] => Err(AppError::UnsupportedCardinality {
                operation: operation.to_string(),
                requested: format!("\"{}\"", ALL_SENTINEL),
            }),
            many => Err(AppError::UnsupportedCardinality {
                operation: operation.to_string(),
                requested: format!("{} identifiers", many.len()),
            }),
        }
    }
}

impl std::fmt::Display for IdentifierList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&joined.join(","))
    }
}
