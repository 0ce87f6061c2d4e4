use super::ui;
use crate::core::{CoinSummary, DateRange, MarketQueries, PricePoint};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::{debug, info};

/// Daily prices of one coin over a date range.
#[derive(Debug)]
pub struct CoinTrend {
    pub coin: CoinSummary,
    pub range: DateRange,
    pub points: Vec<PricePoint>,
}

impl CoinTrend {
    pub fn display(&self, chart_width: usize) -> String {
        let mut output = format!(
            "Analysis for {} ({})\n\n",
            ui::style_text(&self.coin.name, ui::StyleType::Title),
            self.range
        );

        if self.points.is_empty() {
            output.push_str(&format!(
                "No historical price data available for {} in the selected date range.",
                self.coin.name
            ));
            return output;
        }

        let prices: Vec<f64> = self.points.iter().map(|p| p.price).collect();
        output.push_str(&ui::style_text("Daily Price Trend", ui::StyleType::Label));
        output.push_str(&format!(
            "\n{}\n{} .. {}\n\n",
            ui::style_text(&ui::sparkline(&prices, chart_width), ui::StyleType::Value),
            self.points[0].date,
            self.points[self.points.len() - 1].date,
        ));

        output.push_str(&ui::style_text("Daily Price Table", ui::StyleType::Label));
        output.push('\n');
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Price")]);
        for point in &self.points {
            table.add_row(vec![Cell::new(point.date), ui::number_cell(point.price)]);
        }
        output.push_str(&table.to_string());
        output
    }
}

/// Picks a coin from the top list by name or id. Without a choice the
/// highest ranked coin is used.
pub fn select_coin<'a>(coins: &'a [CoinSummary], wanted: Option<&str>) -> Result<&'a CoinSummary> {
    let Some(wanted) = wanted.map(str::trim) else {
        return coins
            .first()
            .ok_or_else(|| anyhow!("No top cryptocurrencies found in the database."));
    };

    coins
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted) || c.id.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let names: Vec<&str> = coins.iter().map(|c| c.name.as_str()).collect();
            anyhow!(
                "Cryptocurrency '{}' is not among the top coins: {}",
                wanted,
                names.join(", ")
            )
        })
}

pub fn run(
    queries: &dyn MarketQueries,
    top_n: u32,
    coin: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    let range = DateRange::new(start, end)?;
    info!(%range, top_n, "Building coin trend");

    let coins = queries.top_coins(top_n)?;
    if coins.is_empty() {
        println!("No top cryptocurrencies found in the database.");
        return Ok(());
    }
    debug!(count = coins.len(), "Loaded top coins");

    let coin = select_coin(&coins, coin)?.clone();
    let points = queries.coin_price_series(&coin.id, &range)?;
    let trend = CoinTrend {
        coin,
        range,
        points,
    };

    let chart_width = ui::terminal_width().saturating_sub(2).max(10);
    println!("{}", trend.display(chart_width));
    Ok(())
}
