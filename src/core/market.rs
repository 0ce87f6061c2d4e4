//! Market data types and the query seam used by the CLI.

use super::error::QueryError;
use super::report::{Report, ReportRows};
use chrono::NaiveDate;
use std::fmt::Display;

/// Coin id of the cryptocurrency used by the overview and the join reports.
pub const BITCOIN: &str = "bitcoin";

/// The four price series that can be averaged over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Bitcoin,
    Oil,
    Sp500,
    Nifty,
}

impl Series {
    pub const ALL: [Series; 4] = [Series::Bitcoin, Series::Oil, Series::Sp500, Series::Nifty];

    /// Label used when rendering the average for this series.
    pub fn average_label(&self) -> &'static str {
        match self {
            Series::Bitcoin => "Average Bitcoin Price",
            Series::Oil => "Average Oil Price",
            Series::Sp500 => "Average S&P 500 Closing Price",
            Series::Nifty => "Average NIFTY Closing Price",
        }
    }
}

impl Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Series::Bitcoin => "Bitcoin",
                Series::Oil => "Oil",
                Series::Sp500 => "S&P 500",
                Series::Nifty => "NIFTY",
            }
        )
    }
}

/// Stock indices tracked as close columns in the stock price relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockIndex {
    Sp500,
    Nifty,
    Nasdaq,
}

impl StockIndex {
    /// Quoted identifier of the close column for this index.
    ///
    /// Identifiers cannot be bound as parameters, so they only ever come from
    /// this closed mapping.
    pub fn close_column(&self) -> &'static str {
        match self {
            StockIndex::Sp500 => r#""('^GSPC', 'Close')""#,
            StockIndex::Nifty => r#""('^NSEI', 'Close')""#,
            StockIndex::Nasdaq => r#""('^IXIC', 'Close')""#,
        }
    }
}

impl Display for StockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StockIndex::Sp500 => "S&P 500",
                StockIndex::Nifty => "NIFTY",
                StockIndex::Nasdaq => "NASDAQ",
            }
        )
    }
}

/// An inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// One day of the joined market snapshot. The stock relation provides the
/// dates; any other series may be missing on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub date: NaiveDate,
    pub bitcoin_price: Option<f64>,
    pub oil_price: Option<f64>,
    pub sp500_close: Option<f64>,
    pub nifty_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Read-only queries over the market database.
///
/// `None` results mean "no data" (an aggregate over zero rows or an empty
/// report) and are not errors.
pub trait MarketQueries {
    fn average_price(&self, series: Series, range: &DateRange)
    -> Result<Option<f64>, QueryError>;

    fn daily_snapshot(&self, range: &DateRange) -> Result<Vec<SnapshotRow>, QueryError>;

    fn run_report(&self, report: Report) -> Result<Option<ReportRows>, QueryError>;

    fn top_coins(&self, n: u32) -> Result<Vec<CoinSummary>, QueryError>;

    fn coin_price_series(
        &self,
        coin_id: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, QueryError>;
}
