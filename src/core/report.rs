//! The closed catalog of predefined reports.

use chrono::NaiveDate;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    TopMarketCap,
    HighCirculatingSupply,
    AverageOilPriceByYear,
    HighestNasdaqClose,
    BitcoinVsSp500,
}

impl Report {
    pub const ALL: [Report; 5] = [
        Report::TopMarketCap,
        Report::HighCirculatingSupply,
        Report::AverageOilPriceByYear,
        Report::HighestNasdaqClose,
        Report::BitcoinVsSp500,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Report::TopMarketCap => "Top 3 Cryptocurrencies by Market Cap",
            Report::HighCirculatingSupply => "Cryptocurrencies with >90% Circulating Supply",
            Report::AverageOilPriceByYear => "Average Oil Price by Year",
            Report::HighestNasdaqClose => "Highest NASDAQ Closing Price",
            Report::BitcoinVsSp500 => "Correlation: Bitcoin vs S&P 500",
        }
    }

    /// Short name accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Report::TopMarketCap => "top-market-cap",
            Report::HighCirculatingSupply => "high-circulating-supply",
            Report::AverageOilPriceByYear => "oil-by-year",
            Report::HighestNasdaqClose => "highest-nasdaq-close",
            Report::BitcoinVsSp500 => "bitcoin-vs-sp500",
        }
    }

    /// SQL executed for this report. None of the reports take parameters.
    ///
    /// The bitcoin vs S&P 500 report is a plain date join of the two series;
    /// no correlation coefficient is computed.
    pub fn sql(&self) -> &'static str {
        match self {
            Report::TopMarketCap => {
                "SELECT id, name, market_cap_rank, market_cap \
                 FROM Cryptocurrency ORDER BY market_cap DESC LIMIT 3"
            }
            Report::HighCirculatingSupply => {
                "SELECT id, name, symbol, circulating_supply, total_supply \
                 FROM Cryptocurrency \
                 WHERE circulating_supply > (total_supply * 0.9) \
                 ORDER BY name"
            }
            Report::AverageOilPriceByYear => {
                r#"SELECT STRFTIME('%Y', Date) AS year, AVG(Price) AS average_price
                 FROM "oil prices"
                 GROUP BY year
                 HAVING year IS NOT NULL
                 ORDER BY year"#
            }
            Report::HighestNasdaqClose => {
                r#"SELECT MAX("('^IXIC', 'Close')") AS highest_close_price FROM "stock prices""#
            }
            Report::BitcoinVsSp500 => {
                r#"SELECT cp.date AS crypto_date, cp.price AS bitcoin_price,
                        sp."('Date', '')" AS stock_date, sp."('^GSPC', 'Close')" AS gspc_close
                 FROM "Crypto prices" AS cp
                 INNER JOIN "stock prices" AS sp ON date(cp.date) = date(sp."('Date', '')")
                 WHERE cp.coin_name = 'bitcoin'
                 ORDER BY date(cp.date)"#
            }
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketCapRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub market_cap_rank: Option<i64>,
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub circulating_supply: f64,
    pub total_supply: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyAverage {
    pub year: i32,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairedCloseRow {
    pub crypto_date: NaiveDate,
    pub bitcoin_price: Option<f64>,
    pub stock_date: NaiveDate,
    pub gspc_close: Option<f64>,
}

/// Rows produced by a report, one variant per report shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    TopMarketCap(Vec<MarketCapRow>),
    HighCirculatingSupply(Vec<SupplyRow>),
    AverageOilPriceByYear(Vec<YearlyAverage>),
    HighestClose(f64),
    BitcoinVsSp500(Vec<PairedCloseRow>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::TopMarketCap(rows) => rows.len(),
            ReportRows::HighCirculatingSupply(rows) => rows.len(),
            ReportRows::AverageOilPriceByYear(rows) => rows.len(),
            ReportRows::HighestClose(_) => 1,
            ReportRows::BitcoinVsSp500(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
