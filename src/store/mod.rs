pub mod queries;

use crate::core::QueryError;
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, Row, types::Type};
use std::path::Path;
use tracing::debug;

/// A read-only handle on the market database.
///
/// The handle is opened per command and the connection is closed when it is
/// dropped. Every query against it is a plain read.
pub struct MarketStore {
    conn: Connection,
}

impl MarketStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, QueryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QueryError::DatabaseNotFound(path.to_path_buf()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.pragma_update(None, "query_only", true)?;

        debug!("Opened market database read-only at {}", path.display());
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parses a stored date, which is either `YYYY-MM-DD` or carries a time part.
pub(crate) fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

pub(crate) fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_stored_date(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(QueryError::InvalidDate(raw.clone())),
        )
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let result = MarketStore::open(dir.path().join("missing.db"));
        assert!(matches!(result, Err(QueryError::DatabaseNotFound(_))));
    }

    #[test]
    fn test_store_rejects_writes() {
        let (_dir, store) = fixture::sample_store();
        let result = store
            .conn()
            .execute("DELETE FROM \"oil prices\"", []);
        assert!(result.is_err());

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM \"oil prices\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_parse_stored_date() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 4);
        assert_eq!(parse_stored_date("2021-01-04"), expected);
        assert_eq!(parse_stored_date("2021-01-04 00:00:00"), expected);
        assert_eq!(parse_stored_date("04/01/2021"), None);
        assert_eq!(parse_stored_date("2021"), None);
    }
}
