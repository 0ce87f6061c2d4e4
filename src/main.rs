use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use xmarket::core::Report;
use xmarket::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Path to the market database, overrides the configured one
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportArg {
    TopMarketCap,
    HighCirculatingSupply,
    OilByYear,
    HighestNasdaqClose,
    BitcoinVsSp500,
}

impl From<ReportArg> for Report {
    fn from(arg: ReportArg) -> Report {
        match arg {
            ReportArg::TopMarketCap => Report::TopMarketCap,
            ReportArg::HighCirculatingSupply => Report::HighCirculatingSupply,
            ReportArg::OilByYear => Report::AverageOilPriceByYear,
            ReportArg::HighestNasdaqClose => Report::HighestNasdaqClose,
            ReportArg::BitcoinVsSp500 => Report::BitcoinVsSp500,
        }
    }
}

impl From<Commands> for xmarket::AppCommand {
    fn from(cmd: Commands) -> xmarket::AppCommand {
        match cmd {
            Commands::Overview { start, end } => xmarket::AppCommand::Overview { start, end },
            Commands::Reports => xmarket::AppCommand::Reports,
            Commands::Query { report } => xmarket::AppCommand::Query(report.into()),
            Commands::Trend { coin, start, end } => {
                xmarket::AppCommand::Trend { coin, start, end }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display average prices and the daily market snapshot
    Overview {
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List the predefined SQL reports
    Reports,
    /// Run a predefined SQL report
    Query {
        #[arg(value_enum)]
        report: ReportArg,
    },
    /// Display the daily price trend of a top cryptocurrency
    Trend {
        /// Coin name or id, defaults to the highest ranked coin
        #[arg(long)]
        coin: Option<String>,
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xmarket::cli::setup::setup(),
        Some(cmd) => xmarket::run_command(
            cmd.into(),
            cli.config_path.as_deref(),
            cli.database.as_deref(),
        ),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
