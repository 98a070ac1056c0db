//! tradeterm CLI: broker lookups and page-state checks from the shell.
//!
//! Commands:
//! - `instrument`: look up one instrument by FIGI
//! - `instruments`: list instruments, optionally filtered
//! - `schedule`: resolve whether an exchange trades on a day
//! - `view`: derive the instrument page state (title, backtest, content) for a day
//! - `logs`: print a robot's log for a day

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradeterm_core::calendar::{format_display, is_selectable, local_midnight_ms};
use tradeterm_core::{
    resolve_trading_day, BrokerApi, Clock, HttpBroker, PageView, SystemClock, TerminalConfig,
};

#[derive(Parser)]
#[command(
    name = "tradeterm",
    about = "tradeterm CLI: broker instrument, schedule and robot log lookups"
)]
struct Cli {
    /// Config file (default: <config dir>/tradeterm/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Broker server base URI.
    #[arg(long, global = true)]
    server_uri: Option<String>,

    /// Broker account id.
    #[arg(long, global = true)]
    account_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an instrument by FIGI.
    Instrument {
        figi: String,
    },
    /// List instruments.
    Instruments {
        /// Only show instruments whose ticker, name or FIGI contains this text.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Resolve whether an exchange trades on a day.
    Schedule {
        exchange: String,

        /// Day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Derive the instrument page state for a day.
    View {
        figi: String,

        /// Day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Print the page state as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the robot log for an instrument and day.
    Logs {
        figi: String,

        /// Day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TerminalConfig::load(cli.config.as_deref())
        .context("loading config")?
        .with_env()
        .with_overrides(cli.server_uri, cli.account_id);
    let broker = HttpBroker::new(&config.server_uri, config.request_timeout())
        .context("building broker client")?;
    let today = SystemClock.today();
    info!(server_uri = %broker.base_uri(), %today, "tradeterm cli");

    match cli.command {
        Commands::Instrument { figi } => run_instrument(&broker, &figi),
        Commands::Instruments { filter } => run_instruments(&broker, filter.as_deref()),
        Commands::Schedule { exchange, date } => {
            let date = parse_date(date.as_deref(), today)?;
            run_schedule(&broker, &exchange, date, today)
        }
        Commands::View { figi, date, json } => {
            let date = parse_date(date.as_deref(), today)?;
            run_view(&broker, &figi, date, today, json)
        }
        Commands::Logs { figi, date } => {
            let date = parse_date(date.as_deref(), today)?;
            run_logs(&broker, &config, &figi, date)
        }
    }
}

fn parse_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match arg {
        None => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD")),
    }
}

fn run_instrument(broker: &dyn BrokerApi, figi: &str) -> Result<()> {
    let Some(inst) = broker.get_instrument(figi)? else {
        bail!("instrument {figi} not found");
    };
    println!("FIGI:       {}", inst.figi);
    println!("Ticker:     {}", inst.ticker);
    println!("Name:       {}", inst.name);
    println!("Exchange:   {}", inst.exchange);
    if let Some(currency) = &inst.currency {
        println!("Currency:   {currency}");
    }
    if let Some(lot) = inst.lot {
        println!("Lot:        {lot}");
    }
    if !inst.is_resolved() {
        println!("WARNING: no ticker, the instrument page would redirect to the listing");
    }
    Ok(())
}

fn run_instruments(broker: &dyn BrokerApi, filter: Option<&str>) -> Result<()> {
    let list = broker.list_instruments()?;
    let query = filter.unwrap_or("");
    let mut shown = 0;
    for inst in list.iter().filter(|i| i.matches(query)) {
        println!("{:<8} {:<32} {}", inst.ticker, inst.name, inst.figi);
        shown += 1;
    }
    println!("{shown} of {} instruments", list.len());
    Ok(())
}

fn run_schedule(
    broker: &dyn BrokerApi,
    exchange: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<()> {
    let resolution = resolve_trading_day(broker, exchange, date, today);
    println!("Exchange:    {exchange}");
    println!("Date:        {}", format_display(date));
    println!("Trading day: {}", resolution.is_trading_day());
    println!("Source:      {resolution:?}");
    Ok(())
}

fn run_view(
    broker: &dyn BrokerApi,
    figi: &str,
    date: NaiveDate,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    if !is_selectable(date, today) {
        bail!(
            "{} cannot be selected: weekends and days after today are not offered",
            format_display(date)
        );
    }
    let inst = match broker.get_instrument(figi)? {
        Some(inst) if inst.is_resolved() => inst,
        _ => bail!("instrument {figi} not found; the page would redirect to the listing"),
    };
    let resolution = resolve_trading_day(broker, &inst.exchange, date, today);
    let view = PageView::derive(&inst, date, today, Some(resolution.is_trading_day()));

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    println!("Title:       {}", view.title);
    println!("Date:        {}", format_display(view.date));
    println!("Backtest:    {}", view.backtest);
    println!("Trading day: {} ({resolution:?})", resolution.is_trading_day());
    println!("Content:     {}", view.content.label());
    Ok(())
}

fn run_logs(
    broker: &dyn BrokerApi,
    config: &TerminalConfig,
    figi: &str,
    date: NaiveDate,
) -> Result<()> {
    let logs = broker.get_robot_logs(
        &config.robot_name,
        &config.account_id,
        figi,
        local_midnight_ms(date),
    )?;
    if logs.is_empty() {
        println!("No log entries for {} on {}", config.robot_name, format_display(date));
        return Ok(());
    }
    for log in &logs {
        println!(
            "{} {:<5} {}",
            log.time.with_timezone(&chrono::Local).format("%H:%M:%S"),
            log.level,
            log.message
        );
    }
    Ok(())
}
