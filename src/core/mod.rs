//! Core domain types, configuration and the query seam

pub mod config;
pub mod error;
pub mod log;
pub mod market;
pub mod report;

// Re-export main types for cleaner imports
pub use error::QueryError;
pub use market::{CoinSummary, DateRange, MarketQueries, PricePoint, Series, SnapshotRow, StockIndex};
pub use report::{Report, ReportRows};
