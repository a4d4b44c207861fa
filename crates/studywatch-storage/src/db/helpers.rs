//! Database helper functions for safe type conversions.

use rusqlite::types::Type;

/// Convert a stored INTEGER into an unsigned setting, returning a rusqlite error on overflow.
pub fn to_unsigned<T: TryFrom<i64>>(idx: usize, value: i64) -> rusqlite::Result<T>
where
    T::Error: std::error::Error + Send + Sync + 'static,
{
    T::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

/// Convert an unsigned setting into the signed INTEGER SQLite stores, saturating at `i64::MAX`.
pub fn to_sql_integer<T: Into<u64>>(value: T) -> i64 {
    i64::try_from(value.into()).unwrap_or(i64::MAX)
}
