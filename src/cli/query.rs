use super::ui;
use crate::core::{MarketQueries, Report, ReportRows};
use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};
use tracing::info;

/// Prints the catalog of predefined reports.
pub fn list() {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Report"), ui::header_cell("Title")]);
    for report in Report::ALL {
        table.add_row(vec![Cell::new(report.slug()), Cell::new(report.title())]);
    }
    println!("{table}");
}

pub fn run(queries: &dyn MarketQueries, report: Report) -> Result<()> {
    info!(report = report.slug(), "Running report");

    println!("{}\n", ui::style_text(report.title(), ui::StyleType::Title));
    println!("{}\n", ui::style_text(report.sql().trim(), ui::StyleType::Subtle));

    let rows = queries
        .run_report(report)
        .with_context(|| format!("Error executing query: {}", report.title()))?;

    match rows {
        Some(rows) => {
            println!("{}", ui::style_text("Query Results:", ui::StyleType::Label));
            println!("{}", render_rows(&rows));
        }
        None => println!("No results found for this query."),
    }
    Ok(())
}

/// Left aligned text cell. Missing metadata is shown as "N/A".
fn text_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| Cell::new("N/A").fg(Color::DarkGrey), Cell::new)
}

/// Renders report rows as a table in the column order of the report's SQL.
pub fn render_rows(rows: &ReportRows) -> Table {
    let mut table = ui::new_styled_table();
    match rows {
        ReportRows::TopMarketCap(rows) => {
            table.set_header(vec![
                ui::header_cell("ID"),
                ui::header_cell("Name"),
                ui::header_cell("Rank"),
                ui::header_cell("Market Cap"),
            ]);
            for row in rows {
                table.add_row(vec![
                    text_cell(row.id.as_deref()),
                    text_cell(row.name.as_deref()),
                    ui::format_optional_cell(row.market_cap_rank, |r| r.to_string()),
                    ui::format_optional_cell(row.market_cap, |v| ui::format_thousands(v, 0)),
                ]);
            }
        }
        ReportRows::HighCirculatingSupply(rows) => {
            table.set_header(vec![
                ui::header_cell("ID"),
                ui::header_cell("Name"),
                ui::header_cell("Symbol"),
                ui::header_cell("Circulating Supply"),
                ui::header_cell("Total Supply"),
            ]);
            for row in rows {
                table.add_row(vec![
                    text_cell(row.id.as_deref()),
                    text_cell(row.name.as_deref()),
                    ui::format_optional_cell(row.symbol.as_deref(), str::to_uppercase),
                    ui::number_cell(row.circulating_supply),
                    ui::number_cell(row.total_supply),
                ]);
            }
        }
        ReportRows::AverageOilPriceByYear(rows) => {
            table.set_header(vec![ui::header_cell("Year"), ui::header_cell("Average Price")]);
            for row in rows {
                table.add_row(vec![Cell::new(row.year), ui::number_cell(row.average_price)]);
            }
        }
        ReportRows::HighestClose(close) => {
            table.set_header(vec![ui::header_cell("Highest Close Price")]);
            table.add_row(vec![ui::number_cell(*close)]);
        }
        ReportRows::BitcoinVsSp500(rows) => {
            table.set_header(vec![
                ui::header_cell("Crypto Date"),
                ui::header_cell("Bitcoin Price"),
                ui::header_cell("Stock Date"),
                ui::header_cell("S&P 500 Close"),
            ]);
            let number = |v: f64| ui::format_thousands(v, 2);
            for row in rows {
                table.add_row(vec![
                    Cell::new(row.crypto_date),
                    ui::format_optional_cell(row.bitcoin_price, number),
                    Cell::new(row.stock_date),
                    ui::format_optional_cell(row.gspc_close, number),
                ]);
            }
        }
    }
    table
}
