use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("End date {end} must not be before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("Failed to execute query: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unparseable date value in store: {0}")]
    InvalidDate(String),
}
