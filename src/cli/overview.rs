use super::ui;
use crate::core::{DateRange, MarketQueries, QueryError, Series, SnapshotRow};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

/// Averages of every series plus the joined daily snapshot for one range.
#[derive(Debug)]
pub struct MarketOverview {
    pub range: DateRange,
    pub averages: Vec<(Series, Option<f64>)>,
    pub snapshot: Vec<SnapshotRow>,
}

impl MarketOverview {
    pub fn display_as_table(&self) -> String {
        let mut output = format!(
            "Data for the period: {}\n\n",
            ui::style_text(&self.range.to_string(), ui::StyleType::Title)
        );

        output.push_str(&ui::style_text("Average Prices", ui::StyleType::Label));
        output.push('\n');
        for (series, average) in &self.averages {
            let value = match average {
                Some(v) => ui::style_text(&ui::format_money(*v), ui::StyleType::Value),
                None => ui::style_text("N/A", ui::StyleType::Subtle),
            };
            output.push_str(&format!("  {}: {}\n", series.average_label(), value));
        }

        output.push('\n');
        output.push_str(&ui::style_text("Daily Market Snapshot", ui::StyleType::Label));
        output.push('\n');

        if self.snapshot.is_empty() {
            output.push_str("No market data found for this period.");
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Bitcoin Price"),
            ui::header_cell("Oil Price (USD)"),
            ui::header_cell("S&P 500 Close"),
            ui::header_cell("NIFTY Close"),
        ]);

        let money = |v: f64| ui::format_thousands(v, 2);
        for row in &self.snapshot {
            table.add_row(vec![
                Cell::new(row.date),
                ui::format_optional_cell(row.bitcoin_price, money),
                ui::format_optional_cell(row.oil_price, money),
                ui::format_optional_cell(row.sp500_close, money),
                ui::format_optional_cell(row.nifty_close, money),
            ]);
        }
        output.push_str(&table.to_string());
        output
    }
}

/// Runs the overview queries for `start..=end`.
///
/// The range is checked before anything touches the store.
pub fn build_overview(
    queries: &dyn MarketQueries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MarketOverview, QueryError> {
    let range = DateRange::new(start, end)?;

    let pb = ui::new_progress_bar(Series::ALL.len() as u64 + 1, true);
    pb.set_message("Running queries...");

    let result = (|| -> Result<MarketOverview, QueryError> {
        let mut averages = Vec::with_capacity(Series::ALL.len());
        for series in Series::ALL {
            averages.push((series, queries.average_price(series, &range)?));
            pb.inc(1);
        }
        let snapshot = queries.daily_snapshot(&range)?;
        pb.inc(1);
        Ok(MarketOverview {
            range,
            averages,
            snapshot,
        })
    })();

    pb.finish_and_clear();
    result
}

pub fn run(queries: &dyn MarketQueries, start: NaiveDate, end: NaiveDate) -> Result<()> {
    info!(%start, %end, "Building market overview");
    let overview = build_overview(queries, start, end)?;
    println!("{}", overview.display_as_table());
    Ok(())
}
