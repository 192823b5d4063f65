//! Data model shared by the discoverer and the paginated rating fetcher
//!
//! Values coming off the wire stay as strings; the conversion helpers here are
//! the single place where they become numbers.

use crate::ValueParseError;
use std::fmt;

/// Display name used when an entry has no primary-typed name
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Name type that marks the display name of an entry
pub const PRIMARY_NAME_TYPE: &str = "primary";

/// Opaque token naming one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One user rating as reported by the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub username: String,

    /// Raw rating text, e.g. "7.5" or "N/A"
    pub rating: String,
}

impl RatingRecord {
    /// Interprets the rating as a number
    pub fn rating_value(&self) -> Result<f64, ValueParseError> {
        self.rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ValueParseError::InvalidRating(self.rating.clone()))
    }
}

/// A name variant attached to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub value: String,
    pub kind: String,
}

impl EntryName {
    pub fn new(value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: kind.into(),
        }
    }
}

/// One page of ratings for one identifier
#[derive(Debug, Clone)]
pub struct RatingBatch {
    pub identifier: Identifier,

    /// 1-based page number this batch was fetched from
    pub page: u32,

    /// Resolved display name, `UNKNOWN` when the feed has no primary name
    pub name: String,

    /// Total rating count declared on the first page
    pub declared_total: u64,

    pub ratings: Vec<RatingRecord>,
}

impl RatingBatch {
    /// Number of ratings on this page whose value parses as a number
    pub fn numeric_ratings(&self) -> usize {
        self.ratings
            .iter()
            .filter(|record| record.rating_value().is_ok())
            .count()
    }
}

/// Returns the first primary-typed name, or the `UNKNOWN` sentinel
pub fn resolve_display_name(names: &[EntryName]) -> String {
    names
        .iter()
        .find(|name| name.kind == PRIMARY_NAME_TYPE)
        .map(|name| name.value.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Parses the feed's declared total rating count
///
/// Any decimal integer is accepted; a negative total counts as 0, so only
/// page 1 is read.
pub fn parse_declared_total(raw: &str) -> Result<u64, ValueParseError> {
    raw.trim()
        .parse::<i64>()
        .map(|total| u64::try_from(total).unwrap_or(0))
        .map_err(|_| ValueParseError::InvalidTotal(raw.to_string()))
}

/// Returns true while `page` still holds ratings for a declared total
///
/// A page exists when `(page - 1) * page_size < total`.
pub fn has_page(page: u32, total: u64, page_size: u64) -> bool {
    u64::from(page.saturating_sub(1)).saturating_mul(page_size) < total
}

/// Number of pages needed to cover `total` ratings
pub fn pages_for_total(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
