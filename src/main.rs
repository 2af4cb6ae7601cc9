use anyhow::Context;
use api_client::{fetch_daily_history, MarketDataClient, TinkoffClient};
use backtester::{TestReport, Tester};
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, Table};
use configuration::{Config, LoggingConfig};
use core_types::{MaPeriods, StrategyId};
use learner::{LearnReport, Learner, Outcome};
use rust_decimal::Decimal;
use strategies::create_strategy;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the tickertape backtester.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The token usually lives in .env; a missing file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Test(args) => handle_test(args, config).await,
        Commands::Learn(args) => handle_learn(args, config).await,
        Commands::Fetch(args) => handle_fetch(args, config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtests moving-average strategies on daily stock history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one strategy with one pair of windows over the ticker universe.
    Test(TestArgs),
    /// Grid-search window pairs for a strategy and report the best one.
    Learn(LearnArgs),
    /// Download and summarise the daily history of a single ticker.
    Fetch(FetchArgs),
}

#[derive(Parser)]
struct TestArgs {
    /// Strategy to run (e.g., "ma_band", "crossover", "trailing_stop").
    #[arg(long)]
    strategy: StrategyId,

    /// Short moving-average window. Defaults to `strategies.periods.short`.
    #[arg(long)]
    short: Option<usize>,

    /// Long moving-average window. Defaults to `strategies.periods.long`.
    #[arg(long)]
    long: Option<usize>,
}

#[derive(Parser)]
struct LearnArgs {
    /// Overrides `learner.strategy`.
    #[arg(long)]
    strategy: Option<StrategyId>,

    /// Overrides `learner.step`.
    #[arg(long)]
    step: Option<usize>,

    /// Overrides `learner.limit`.
    #[arg(long)]
    limit: Option<usize>,

    /// Evaluate grid cells on all cores.
    #[arg(long)]
    parallel: bool,

    /// Print every estimation sorted by average instead of in grid order.
    #[arg(long)]
    ranked: bool,

    /// Write the full report as JSON to this path.
    #[arg(long)]
    output: Option<String>,
}

#[derive(Parser)]
struct FetchArgs {
    /// The ticker to download (e.g., "AAPL").
    #[arg(long)]
    ticker: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Builds a tester for the configured universe and downloads its history once.
async fn load_tester(config: &Config) -> anyhow::Result<Tester> {
    let client = TinkoffClient::new(&config.api)?;
    let mut tester = Tester::new(
        config.backtest.tickers.clone(),
        config.backtest.period_days,
    )?;
    let loaded = tester
        .load(&client, config.api.window_days, Utc::now())
        .await?;
    println!(
        "Loaded {} of {} tickers over {} days.",
        loaded,
        tester.tickers().len(),
        tester.period_days()
    );
    Ok(tester)
}

async fn handle_test(args: TestArgs, config: Config) -> anyhow::Result<()> {
    let defaults = config.strategies.periods;
    let periods = MaPeriods::new(
        args.short.unwrap_or(defaults.short),
        args.long.unwrap_or(defaults.long),
    );
    let strategy = create_strategy(args.strategy, &config.strategies, periods)?;

    let tester = load_tester(&config).await?;
    let report = tester.test(strategy.as_ref())?;
    print_test_report(&report);
    Ok(())
}

async fn handle_learn(args: LearnArgs, config: Config) -> anyhow::Result<()> {
    let strategy = args.strategy.unwrap_or(config.learner.strategy);
    let step = args.step.unwrap_or(config.learner.step);
    let limit = args.limit.unwrap_or(config.learner.limit);
    let parallel = args.parallel || config.learner.parallel;

    let tester = load_tester(&config).await?;
    let learner = Learner::new(&tester, strategy, config.strategies.clone(), step, limit)
        .with_progress(config.learner.show_progress);
    println!(
        "Learning {} with step {} and limit {} (job {}).",
        strategy,
        step,
        limit,
        learner.job_id()
    );

    let report = if parallel {
        learner.learn_parallel()?
    } else {
        learner.learn()?
    };
    print_learn_report(&report, args.ranked);

    if let Some(path) = args.output {
        std::fs::write(&path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path))?;
        println!("Report written to {}.", path);
    }
    Ok(())
}

async fn handle_fetch(args: FetchArgs, config: Config) -> anyhow::Result<()> {
    let client = TinkoffClient::new(&config.api)?;
    let instrument = client.resolve_instrument(&args.ticker).await?;
    let series = fetch_daily_history(
        &client,
        &instrument.figi,
        config.backtest.period_days,
        config.api.window_days,
        Utc::now(),
    )
    .await?;

    let mut table = Table::new();
    table.set_header(vec!["Ticker", "FIGI", "Name", "Bars", "First", "Last", "Last close"]);
    table.add_row(vec![
        instrument.ticker,
        instrument.figi,
        instrument.name,
        series.len().to_string(),
        series.first_date().map(|d| d.to_string()).unwrap_or_default(),
        series.last_date().map(|d| d.to_string()).unwrap_or_default(),
        series
            .bars()
            .last()
            .map(|b| b.close.to_string())
            .unwrap_or_default(),
    ]);
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Reporting
// ==============================================================================

fn print_test_report(report: &TestReport) {
    let mut table = Table::new();
    table.set_header(vec!["Ticker", "Trades", "Estimate"]);
    for estimate in &report.tickers {
        table.add_row(vec![
            Cell::new(&estimate.ticker),
            Cell::new(estimate.trades),
            estimate_cell(estimate.estimate),
        ]);
    }
    for skipped in &report.skipped {
        table.add_row(vec![
            Cell::new(&skipped.ticker),
            Cell::new("-"),
            Cell::new(format!("skipped: {}", skipped.reason)).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}: average {} over {} trades.",
        report.strategy,
        report.periods,
        report.average.round_dp(4),
        report.total_trades()
    );
}

fn print_learn_report(report: &LearnReport, ranked: bool) {
    let estimations = if ranked {
        report.ranked()
    } else {
        report.estimations.iter().collect()
    };
    let best = report.best.map(|b| b.periods);

    let mut table = Table::new();
    table.set_header(vec!["Periods", "Average", "Trades", "Skipped"]);
    for estimation in estimations {
        let periods = Cell::new(estimation.periods);
        let periods = if Some(estimation.periods) == best {
            periods.fg(Color::Green)
        } else {
            periods
        };
        let row = match &estimation.outcome {
            Outcome::Completed {
                average,
                trades,
                skipped_tickers,
            } => vec![
                periods,
                estimate_cell(*average),
                Cell::new(trades),
                Cell::new(skipped_tickers),
            ],
            Outcome::Failed { reason } => vec![
                periods,
                Cell::new(format!("failed: {}", reason)).fg(Color::Red),
                Cell::new("-"),
                Cell::new("-"),
            ],
        };
        table.add_row(row);
    }
    println!("{table}");

    match report.best {
        Some(best) => println!(
            "Best {}: {} with average {}.",
            report.strategy,
            best.periods,
            best.average.round_dp(4)
        ),
        None => println!("No window pair beat breakeven for {}.", report.strategy),
    }
    if report.failures() > 0 {
        println!("{} cells failed.", report.failures());
    }
}

fn estimate_cell(estimate: Decimal) -> Cell {
    let cell = Cell::new(estimate.round_dp(4));
    if estimate > Decimal::ONE {
        cell.fg(Color::Green)
    } else if estimate < Decimal::ONE {
        cell.fg(Color::Red)
    } else {
        cell
    }
}
