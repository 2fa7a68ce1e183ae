use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::debug;
use vnq_md::{lookback_start, normalize, source_by_name, Interval, Quote};

#[derive(Parser)]
#[command(name = "vnq")]
#[command(about = "VN stock quote CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch closing prices once and print them as JSON
    Quote {
        /// Ticker symbol
        #[arg(long, default_value = "ACB")]
        symbol: String,

        /// Window length in days, counted back from --end
        #[arg(long, default_value_t = 365, allow_hyphen_values = true)]
        days: i64,

        /// Last day of the window (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Bar interval (1m | 1H | 1D)
        #[arg(long, default_value = "1D")]
        interval: Interval,

        /// Upstream source name
        #[arg(long, env = "VNQ_SOURCE", default_value = "VCI")]
        source: String,

        /// Override the upstream base URL
        #[arg(long, env = "VNQ_VCI_BASE_URL")]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    let _ = dotenvy::from_filename(".env.local");

    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Quote {
            symbol,
            days,
            end,
            interval,
            source,
            base_url,
        } => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let start = lookback_start(end, days)
                .with_context(|| format!("--days {days} is out of range for --end {end}"))?;

            let src = source_by_name(&source, base_url.as_deref())?;
            debug!(source = src.source_name(), %start, %end, "fetching");

            let frame = Quote::new(symbol.clone(), src)
                .history(
                    &start.format("%Y-%m-%d").to_string(),
                    &end.format("%Y-%m-%d").to_string(),
                    interval,
                )
                .await
                .with_context(|| format!("quote fetch failed for {symbol}"))?;

            let series = normalize(&symbol, &frame);
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
    }

    Ok(())
}
