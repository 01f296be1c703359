//! Dividend Planner CLI
//!
//! Command-line interface for projecting a dividend reinvestment plan and
//! solving for the savings needed to reach a target income

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dividend_planner::market::MarketAnalysis;
use dividend_planner::{
    CsvMarketData, GoalPlan, GoalSolver, MarketAnalyzer, MarketSnapshot, PayoutFrequency,
    PayoutSchedule, PlannerConfig, ProjectionEngine, ProjectionResult,
};

#[derive(Debug, Parser)]
#[command(
    name = "dividend_planner",
    version,
    about = "Dividend reinvestment projection and income-goal planner"
)]
struct Cli {
    /// JSON settings file (flags override its values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ticker symbol
    #[arg(long, global = true)]
    ticker: Option<String>,

    /// Analysis and investment period in years (1-10)
    #[arg(long, global = true)]
    years: Option<u32>,

    /// Dividend withholding tax in percent
    #[arg(long, global = true)]
    tax_percent: Option<f64>,

    /// Payout frequency: weekly, monthly, quarterly, semiannual, annual
    #[arg(long, global = true)]
    frequency: Option<PayoutFrequency>,

    /// Monthly growth rate in percent, replacing the estimate
    #[arg(long, global = true, allow_negative_numbers = true)]
    growth: Option<f64>,

    /// Directory holding <TICKER>_prices.csv, <TICKER>_dividends.csv and fx.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the market analysis the engine would use
    Estimate,

    /// Project the value of the current plan
    Project {
        /// Initial investment
        #[arg(long)]
        initial: Option<f64>,

        /// Additional investment every month
        #[arg(long)]
        monthly: Option<f64>,

        /// Write every simulated month to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Solve for the capital and monthly savings behind a target income
    Goal {
        /// Net monthly dividend income wanted at the end of the period
        #[arg(long)]
        target: Option<f64>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut analyzer = MarketAnalyzer::new(CsvMarketData::new(&config.data_dir));
    let analysis = analyzer
        .analyze(&config.ticker, config.years)
        .with_context(|| format!("failed to analyze {}", config.ticker))?;
    let snapshot = config.apply_growth_override(analysis.snapshot)?;
    let schedule = analysis.schedule(config.frequency)?;

    println!("Dividend Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("========================\n");
    print_market_summary(&config, &analysis, &snapshot, &schedule);

    match &cli.command {
        Command::Estimate => print_dividend_history(&analysis),
        Command::Project { csv, .. } => {
            let engine = ProjectionEngine::new(config.projection_config());
            let result = engine.project(&snapshot, &schedule)?;
            print_projection(&config, &result);
            if let Some(path) = csv {
                write_projection_csv(path, &result)?;
                println!("\nFull results written to: {}", path.display());
            }
        }
        Command::Goal { .. } => {
            let plan = GoalSolver::new(config.goal_config())
                .solve(&snapshot)
                .context("goal cannot be reached with the current trend")?;
            print_goal(&config, &snapshot, &schedule, &plan);
        }
    }

    Ok(())
}

/// Merge the optional config file with command-line overrides
fn build_config(cli: &Cli) -> Result<PlannerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlannerConfig::default(),
    };

    if let Some(ticker) = &cli.ticker {
        config.ticker = ticker.clone();
    }
    if let Some(years) = cli.years {
        config.years = years;
    }
    if let Some(tax_percent) = cli.tax_percent {
        config.tax_rate = tax_percent / 100.0;
    }
    if let Some(frequency) = cli.frequency {
        config.frequency = frequency;
    }
    if let Some(growth) = cli.growth {
        config.growth_override = Some(growth);
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    match &cli.command {
        Command::Project { initial, monthly, .. } => {
            if let Some(initial) = initial {
                config.initial_capital = *initial;
            }
            if let Some(monthly) = monthly {
                config.monthly_contribution = *monthly;
            }
        }
        Command::Goal { target } => {
            if let Some(target) = target {
                config.target_monthly_income = *target;
            }
        }
        Command::Estimate => {}
    }

    config.validate()?;
    Ok(config)
}

fn print_market_summary(
    config: &PlannerConfig,
    analysis: &MarketAnalysis,
    snapshot: &MarketSnapshot,
    schedule: &PayoutSchedule,
) {
    println!("Ticker: {} ({} years)", analysis.ticker, config.years);
    if let Some(warning) = analysis.growth.warning() {
        println!("  WARNING: {}", warning);
    }
    println!("  Unit price:        {:>16.0}", snapshot.unit_price_local());
    println!(
        "  Dividend / payout: {:>16.0} ({}{})",
        schedule.per_payout_amount,
        schedule.frequency,
        if schedule.approximation_mode { ", paid monthly" } else { "" }
    );
    println!("  Annual dividend:   {:>16.0}", schedule.annual_dividend_amount);
    println!("  Exchange rate:     {:>16.2}", snapshot.currency_rate());
    println!(
        "  Monthly trend:     {:>+15.2}%{}",
        snapshot.growth_rate_per_period(),
        if config.growth_override.is_some() {
            format!(" (estimate {:+.2}%)", analysis.growth.growth_rate_per_period)
        } else {
            String::new()
        }
    );
    println!();
}

fn print_dividend_history(analysis: &MarketAnalysis) {
    println!("Recent dividends (newest first):");
    println!("{:>12} {:>12}", "Date", "Amount");
    println!("{}", "-".repeat(25));
    for event in analysis.recent_dividends() {
        println!("{:>12} {:>12.4}", event.date.to_string(), event.amount);
    }
    println!(
        "\nTrend derived from {:.1} years of monthly closes: {:+.2}%/month",
        analysis.growth.actual_years, analysis.growth.growth_rate_per_period
    );
}

fn print_projection(config: &PlannerConfig, result: &ProjectionResult) {
    println!("Projection Results ({} months):", result.months());
    println!(
        "{:>5} {:>12} {:>14} {:>14} {:>16} {:>16}",
        "Month", "Price", "Shares", "Net Div", "Invested", "Asset"
    );
    println!("{}", "-".repeat(82));
    for row in &result.cashflows {
        println!(
            "{:>5} {:>12.2} {:>14.4} {:>14.0} {:>16.0} {:>16.0}",
            row.month,
            row.unit_price,
            row.shares_held,
            row.net_dividend,
            row.total_invested,
            row.asset_value
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Total invested:        {:>16.0}", summary.final_invested);
    println!("  Final asset value:     {:>16.0}", summary.final_asset);
    println!("  Return on investment:  {:>+15.2}%", summary.roi * 100.0);
    println!("  Dividends received:    {:>16.0} (after tax)", summary.accumulated_net_dividends);
    println!("  Price impact:          {:>+16.0}", summary.price_impact);

    match summary.break_even_month {
        Some(month) => println!(
            "\nBreak-even reached in month {}: accumulated dividends exceed capital invested.",
            month
        ),
        None => println!(
            "\nBreak-even not reached within {} years: dividends trail the capital invested.",
            config.years
        ),
    }
}

fn print_goal(
    config: &PlannerConfig,
    snapshot: &MarketSnapshot,
    schedule: &PayoutSchedule,
    plan: &GoalPlan,
) {
    println!(
        "To receive {:.0} per month after {} years:",
        config.target_monthly_income, config.years
    );
    println!("  Required portfolio value:  {:>16.0}", plan.required_future_capital);
    println!("  Invest every month:        {:>16.0}", plan.required_monthly_contribution);

    println!("\n1. Future price and dividend");
    println!("  Current price:             {:>16.0}", snapshot.unit_price_local());
    println!("  Monthly trend:             {:>+15.2}%", snapshot.growth_rate_per_period());
    println!("  Price in {} years:         {:>16.0}", config.years, plan.estimated_future_price);
    println!(
        "  Dividend in {} years:      {:>16.2} per year, {:.2} per {} payout",
        config.years,
        plan.estimated_future_dividend_per_share,
        plan.future_per_payout_amount(schedule),
        schedule.frequency
    );
    println!("\n2. Shares needed");
    println!("  Shares:                    {:>16.0}", plan.needed_shares.trunc());
    println!("\n3. Monthly savings");
    println!(
        "  Compounded at {:.2}%/month (trend + dividend yield) for {} months.",
        plan.total_monthly_return_rate * 100.0,
        config.horizon_months()
    );
}

fn write_projection_csv(path: &Path, result: &ProjectionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for row in &result.cashflows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
