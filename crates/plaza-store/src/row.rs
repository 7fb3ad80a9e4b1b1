//! Row-mapping helpers shared by the repositories.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

/// Parse an RFC 3339 timestamp column, surfacing a conversion error through
/// `rusqlite` so it propagates like any other row-decoding failure.
pub(crate) fn parse_timestamp(
    idx: usize,
    value: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
