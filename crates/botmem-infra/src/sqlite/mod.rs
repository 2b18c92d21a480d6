//! SQLite storage layer.
//!
//! Store implementations backed by SQLite with WAL mode and split
//! read/write connection pools. One module per memory representation.

pub mod archival;
pub mod block;
pub mod graph;
pub mod pool;
pub mod summary;

use botmem_types::error::RepositoryError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime '{s}': {e}")))
}

/// Fixed-width UTC timestamp so text ordering matches time ordering.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Wrap an engine error with the operation that raised it.
pub(crate) fn query_error(op: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| RepositoryError::Query(format!("{op}: {e}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::pool::DatabasePool;

    /// Fresh database in its own temp directory. Keep the `TempDir` alive for the test.
    pub async fn test_pool() -> (DatabasePool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let pool = DatabasePool::open(&db_path).await.unwrap();
        (pool, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_round_trip_is_fixed_width() {
        let now = Utc::now();
        let s = format_datetime(&now);
        assert!(s.ends_with('Z'));
        assert_eq!(s.len(), "2025-01-01T00:00:00.000000Z".len());
        let parsed = parse_datetime(&s).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_query_error_names_operation() {
        let err = query_error("add archival")(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("query error: add archival:"));
    }
}
