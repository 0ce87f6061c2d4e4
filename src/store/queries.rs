use super::{MarketStore, date_at};
use crate::core::market::BITCOIN;
use crate::core::report::{MarketCapRow, PairedCloseRow, SupplyRow, YearlyAverage};
use crate::core::{
    CoinSummary, DateRange, MarketQueries, PricePoint, QueryError, Report, ReportRows, Series,
    SnapshotRow, StockIndex,
};
use rusqlite::{Params, Row, params};
use tracing::debug;

const AVG_COIN_PRICE_SQL: &str = r#"
    SELECT AVG(price) FROM "Crypto prices"
    WHERE coin_name = ?1 AND date(date) BETWEEN ?2 AND ?3"#;

const AVG_OIL_PRICE_SQL: &str = r#"
    SELECT AVG(Price) FROM "oil prices"
    WHERE date(Date) BETWEEN ?1 AND ?2"#;

const DAILY_SNAPSHOT_SQL: &str = r#"
    SELECT
        sp."('Date', '')",
        cp.price,
        op.Price,
        sp."('^GSPC', 'Close')",
        sp."('^NSEI', 'Close')"
    FROM "stock prices" AS sp
    LEFT JOIN "oil prices" AS op ON date(op.Date) = date(sp."('Date', '')")
    LEFT JOIN "Crypto prices" AS cp
        ON date(cp.date) = date(sp."('Date', '')") AND cp.coin_name = ?3
    WHERE date(sp."('Date', '')") BETWEEN ?1 AND ?2
    ORDER BY date(sp."('Date', '')")"#;

const TOP_COINS_SQL: &str = "
    SELECT id, COALESCE(name, id) FROM Cryptocurrency
    WHERE id IS NOT NULL
    ORDER BY market_cap_rank ASC NULLS LAST
    LIMIT ?1";

const COIN_PRICE_SERIES_SQL: &str = r#"
    SELECT date, price FROM "Crypto prices"
    WHERE coin_name = ?1 AND date(date) BETWEEN ?2 AND ?3 AND price IS NOT NULL
    ORDER BY date(date)"#;

fn average_index_close_sql(index: StockIndex) -> String {
    format!(
        r#"SELECT AVG({}) FROM "stock prices" WHERE date("('Date', '')") BETWEEN ?1 AND ?2"#,
        index.close_column()
    )
}

fn max_index_close_sql(index: StockIndex) -> String {
    format!(
        r#"SELECT MAX({}) AS highest_close_price FROM "stock prices""#,
        index.close_column()
    )
}

impl MarketStore {
    /// Highest close of `index` across the whole stock relation.
    pub fn max_index_close(&self, index: StockIndex) -> Result<Option<f64>, QueryError> {
        debug!(%index, "Querying highest close");
        let max = self
            .conn()
            .query_row(&max_index_close_sql(index), [], |row| {
                row.get::<_, Option<f64>>(0)
            })?;
        Ok(max)
    }

    fn collect_rows<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, QueryError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl MarketQueries for MarketStore {
    fn average_price(
        &self,
        series: Series,
        range: &DateRange,
    ) -> Result<Option<f64>, QueryError> {
        debug!(%series, %range, "Querying average price");
        let (start, end) = (range.start(), range.end());
        let get_avg = |row: &Row<'_>| row.get::<_, Option<f64>>(0);

        let avg = match series {
            Series::Bitcoin => {
                self.conn()
                    .query_row(AVG_COIN_PRICE_SQL, params![BITCOIN, start, end], get_avg)?
            }
            Series::Oil => self
                .conn()
                .query_row(AVG_OIL_PRICE_SQL, params![start, end], get_avg)?,
            Series::Sp500 => self.conn().query_row(
                &average_index_close_sql(StockIndex::Sp500),
                params![start, end],
                get_avg,
            )?,
            Series::Nifty => self.conn().query_row(
                &average_index_close_sql(StockIndex::Nifty),
                params![start, end],
                get_avg,
            )?,
        };
        Ok(avg)
    }

    fn daily_snapshot(&self, range: &DateRange) -> Result<Vec<SnapshotRow>, QueryError> {
        debug!(%range, "Querying daily snapshot");
        self.collect_rows(
            DAILY_SNAPSHOT_SQL,
            params![range.start(), range.end(), BITCOIN],
            |row| {
                Ok(SnapshotRow {
                    date: date_at(row, 0)?,
                    bitcoin_price: row.get(1)?,
                    oil_price: row.get(2)?,
                    sp500_close: row.get(3)?,
                    nifty_close: row.get(4)?,
                })
            },
        )
    }

    fn run_report(&self, report: Report) -> Result<Option<ReportRows>, QueryError> {
        debug!(report = report.slug(), "Running predefined report");
        let rows = match report {
            Report::TopMarketCap => {
                ReportRows::TopMarketCap(self.collect_rows(report.sql(), [], |row| {
                    Ok(MarketCapRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        market_cap_rank: row.get::<_, Option<f64>>(2)?.map(|rank| rank as i64),
                        market_cap: row.get(3)?,
                    })
                })?)
            }
            Report::HighCirculatingSupply => {
                ReportRows::HighCirculatingSupply(self.collect_rows(report.sql(), [], |row| {
                    Ok(SupplyRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        symbol: row.get(2)?,
                        circulating_supply: row.get(3)?,
                        total_supply: row.get(4)?,
                    })
                })?)
            }
            Report::AverageOilPriceByYear => {
                ReportRows::AverageOilPriceByYear(self.collect_rows(report.sql(), [], |row| {
                    let year: String = row.get(0)?;
                    let year = year.parse::<i32>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(YearlyAverage {
                        year,
                        average_price: row.get(1)?,
                    })
                })?)
            }
            Report::HighestNasdaqClose => match self.max_index_close(StockIndex::Nasdaq)? {
                Some(close) => ReportRows::HighestClose(close),
                None => return Ok(None),
            },
            Report::BitcoinVsSp500 => {
                ReportRows::BitcoinVsSp500(self.collect_rows(report.sql(), [], |row| {
                    Ok(PairedCloseRow {
                        crypto_date: date_at(row, 0)?,
                        bitcoin_price: row.get(1)?,
                        stock_date: date_at(row, 2)?,
                        gspc_close: row.get(3)?,
                    })
                })?)
            }
        };

        debug!(report = report.slug(), rows = rows.len(), "Report finished");
        Ok((!rows.is_empty()).then_some(rows))
    }

    fn top_coins(&self, n: u32) -> Result<Vec<CoinSummary>, QueryError> {
        debug!(n, "Querying top coins by rank");
        self.collect_rows(TOP_COINS_SQL, params![n], |row| {
            Ok(CoinSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    fn coin_price_series(
        &self,
        coin_id: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, QueryError> {
        debug!(coin_id, %range, "Querying coin price series");
        self.collect_rows(
            COIN_PRICE_SERIES_SQL,
            params![coin_id, range.start(), range.end()],
            |row| {
                Ok(PricePoint {
                    date: date_at(row, 0)?,
                    price: row.get(1)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixture;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[test_log::test]
    fn test_average_price_is_arithmetic_mean() {
        let (_dir, store) = fixture::sample_store();

        let btc = store
            .average_price(Series::Bitcoin, &range("2021-01-01", "2021-01-04"))
            .unwrap()
            .unwrap();
        assert!((btc - 340.0 / 3.0).abs() < 1e-9);

        let oil = store
            .average_price(Series::Oil, &range("2021-01-01", "2021-12-31"))
            .unwrap();
        assert_eq!(oil, Some(60.0));

        let sp500 = store
            .average_price(Series::Sp500, &range("2021-01-01", "2021-01-02"))
            .unwrap();
        assert_eq!(sp500, Some(3705.0));

        // NULL closes do not contribute to the mean
        let nifty = store
            .average_price(Series::Nifty, &range("2021-01-01", "2021-01-04"))
            .unwrap();
        assert_eq!(nifty, Some(14025.0));
    }

    #[test_log::test]
    fn test_average_price_no_data() {
        let (_dir, store) = fixture::sample_store();
        let empty = range("2019-01-01", "2019-12-31");
        for series in Series::ALL {
            assert_eq!(store.average_price(series, &empty).unwrap(), None, "{series}");
        }
    }

    #[test_log::test]
    fn test_daily_snapshot_left_joins_on_stock_dates() {
        let (_dir, store) = fixture::sample_store();
        let window = range("2021-01-01", "2021-01-04");
        let rows = store.daily_snapshot(&window).unwrap();

        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date("2021-01-01"), date("2021-01-02"), date("2021-01-04")]
        );
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        assert!(
            rows.iter()
                .all(|r| window.start() <= r.date && r.date <= window.end())
        );

        assert_eq!(
            rows[0],
            SnapshotRow {
                date: date("2021-01-01"),
                bitcoin_price: Some(100.0),
                oil_price: Some(50.0),
                sp500_close: Some(3700.0),
                nifty_close: Some(14000.0),
            }
        );
        assert_eq!(rows[1].oil_price, None);
        assert_eq!(rows[1].bitcoin_price, Some(110.0));
        assert_eq!(rows[2].bitcoin_price, Some(130.0));
        assert_eq!(rows[2].nifty_close, None);
    }

    #[test_log::test]
    fn test_daily_snapshot_outside_data_is_empty() {
        let (_dir, store) = fixture::sample_store();
        let rows = store.daily_snapshot(&range("2030-01-01", "2030-02-01")).unwrap();
        assert!(rows.is_empty());
    }

    #[test_log::test]
    fn test_top_market_cap_report() {
        let (_dir, store) = fixture::sample_store();
        let Some(ReportRows::TopMarketCap(rows)) = store.run_report(Report::TopMarketCap).unwrap()
        else {
            panic!("Expected market cap rows");
        };

        assert!(rows.len() <= 3);
        let ids: Vec<_> = rows.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "tether"]);
        assert!(rows.windows(2).all(|w| w[0].market_cap >= w[1].market_cap));
        assert_eq!(rows[0].market_cap_rank, Some(1));
    }

    #[test_log::test]
    fn test_high_circulating_supply_report() {
        let (_dir, store) = fixture::sample_store();
        let Some(ReportRows::HighCirculatingSupply(rows)) =
            store.run_report(Report::HighCirculatingSupply).unwrap()
        else {
            panic!("Expected supply rows");
        };

        let names: Vec<_> = rows.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Bitcoin", "Ethereum"]);
        assert!(rows.iter().all(|r| r.circulating_supply > 0.9 * r.total_supply));
    }

    #[test_log::test]
    fn test_average_oil_price_by_year_report() {
        let (_dir, store) = fixture::sample_store();
        let Some(ReportRows::AverageOilPriceByYear(rows)) =
            store.run_report(Report::AverageOilPriceByYear).unwrap()
        else {
            panic!("Expected yearly rows");
        };

        assert_eq!(
            rows,
            vec![
                YearlyAverage {
                    year: 2021,
                    average_price: 60.0
                },
                YearlyAverage {
                    year: 2022,
                    average_price: 80.0
                },
            ]
        );
    }

    #[test_log::test]
    fn test_highest_close_reports() {
        let (_dir, store) = fixture::sample_store();
        assert_eq!(
            store.run_report(Report::HighestNasdaqClose).unwrap(),
            Some(ReportRows::HighestClose(13700.0))
        );
        assert_eq!(store.max_index_close(StockIndex::Sp500).unwrap(), Some(4200.0));
        assert_eq!(store.max_index_close(StockIndex::Nifty).unwrap(), Some(15500.0));

        // The report shows the same statement that is executed
        assert_eq!(
            max_index_close_sql(StockIndex::Nasdaq),
            Report::HighestNasdaqClose.sql()
        );
    }

    #[test_log::test]
    fn test_bitcoin_vs_sp500_is_a_raw_join() {
        let (_dir, store) = fixture::sample_store();
        let Some(ReportRows::BitcoinVsSp500(rows)) =
            store.run_report(Report::BitcoinVsSp500).unwrap()
        else {
            panic!("Expected paired rows");
        };

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.crypto_date == r.stock_date));
        assert_eq!(rows[0].bitcoin_price, Some(100.0));
        assert_eq!(rows[0].gspc_close, Some(3700.0));
        assert_eq!(rows[2].crypto_date, date("2021-01-04"));
    }

    #[test_log::test]
    fn test_unpopulated_store_has_no_data() {
        let (_dir, store) = fixture::unpopulated_store();
        let window = range("2021-01-01", "2021-12-31");

        for report in Report::ALL {
            assert_eq!(store.run_report(report).unwrap(), None, "{report}");
        }
        for series in Series::ALL {
            assert_eq!(store.average_price(series, &window).unwrap(), None);
        }
        assert!(store.daily_snapshot(&window).unwrap().is_empty());
        assert!(store.top_coins(3).unwrap().is_empty());
        assert!(
            store
                .coin_price_series("bitcoin", &window)
                .unwrap()
                .is_empty()
        );
    }

    #[test_log::test]
    fn test_missing_relation_is_a_query_failure() {
        let (_dir, store) = fixture::empty_store();
        for report in Report::ALL {
            let result = store.run_report(report);
            assert!(matches!(result, Err(QueryError::Sqlite(_))), "{report}");
        }
        assert!(matches!(store.top_coins(3), Err(QueryError::Sqlite(_))));
    }

    #[test_log::test]
    fn test_top_coins_by_rank() {
        let (_dir, store) = fixture::sample_store();
        let coins = store.top_coins(3).unwrap();
        assert_eq!(
            coins,
            vec![
                CoinSummary {
                    id: "bitcoin".to_string(),
                    name: "Bitcoin".to_string()
                },
                CoinSummary {
                    id: "ethereum".to_string(),
                    name: "Ethereum".to_string()
                },
                CoinSummary {
                    id: "tether".to_string(),
                    name: "Tether".to_string()
                },
            ]
        );
        assert_eq!(store.top_coins(1).unwrap().len(), 1);
        assert!(store.top_coins(0).unwrap().is_empty());
    }

    #[test_log::test]
    fn test_missing_coin_metadata_is_kept_as_none() {
        let (_dir, store) = fixture::sparse_metadata_store();

        let Some(ReportRows::TopMarketCap(rows)) = store.run_report(Report::TopMarketCap).unwrap()
        else {
            panic!("Expected market cap rows");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].id.as_deref(), Some("mystery"));
        assert_eq!(rows[1].name, None);
        assert_eq!(rows[2].id, None);

        let Some(ReportRows::HighCirculatingSupply(rows)) =
            store.run_report(Report::HighCirculatingSupply).unwrap()
        else {
            panic!("Expected supply rows");
        };
        assert_eq!(rows.len(), 3);
        let bitcoin = rows
            .iter()
            .find(|r| r.id.as_deref() == Some("bitcoin"))
            .unwrap();
        assert_eq!(bitcoin.symbol, None);

        // Unnamed coins fall back to their id; coins without an id are skipped
        assert_eq!(
            store.top_coins(5).unwrap(),
            vec![
                CoinSummary {
                    id: "bitcoin".to_string(),
                    name: "Bitcoin".to_string()
                },
                CoinSummary {
                    id: "mystery".to_string(),
                    name: "mystery".to_string()
                },
            ]
        );
    }

    #[test_log::test]
    fn test_coin_price_series_skips_missing_days() {
        let (_dir, store) = fixture::sample_store();
        let points = store
            .coin_price_series("bitcoin", &range("2021-01-01", "2021-01-03"))
            .unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint {
                    date: date("2021-01-01"),
                    price: 100.0
                },
                PricePoint {
                    date: date("2021-01-02"),
                    price: 110.0
                },
            ]
        );
    }

    #[test_log::test]
    fn test_queries_are_idempotent() {
        let (_dir, store) = fixture::sample_store();
        let window = range("2021-01-01", "2021-06-30");

        assert_eq!(
            store.daily_snapshot(&window).unwrap(),
            store.daily_snapshot(&window).unwrap()
        );
        assert_eq!(
            store.average_price(Series::Oil, &window).unwrap(),
            store.average_price(Series::Oil, &window).unwrap()
        );
        for report in Report::ALL {
            assert_eq!(
                store.run_report(report).unwrap(),
                store.run_report(report).unwrap()
            );
        }
    }
}
