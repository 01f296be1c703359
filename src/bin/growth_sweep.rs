//! Run the same plan under a range of monthly growth assumptions
//!
//! Outputs one CSV row per growth rate for sensitivity analysis

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;
use serde::Serialize;

use dividend_planner::{
    CsvMarketData, MarketAnalyzer, PayoutFrequency, PlannerConfig, ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(
    name = "growth_sweep",
    about = "Projection sensitivity to the monthly growth rate"
)]
struct Args {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    ticker: Option<String>,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    frequency: Option<PayoutFrequency>,

    /// Lowest monthly growth rate, percent
    #[arg(long, default_value_t = -3.0, allow_negative_numbers = true)]
    from: f64,

    /// Highest monthly growth rate, percent
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    to: f64,

    /// Step between growth rates, percent
    #[arg(long, default_value_t = 0.25)]
    step: f64,

    #[arg(long, default_value = "growth_sweep_output.csv")]
    output: PathBuf,
}

/// One row of sweep output
#[derive(Debug, Serialize)]
struct SweepRow {
    growth_rate: f64,
    final_invested: f64,
    final_asset: f64,
    total_profit: f64,
    roi_pct: f64,
    net_dividends: f64,
    price_impact: f64,
    break_even_month: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if !args.step.is_finite() || args.step <= 0.0 || args.to < args.from {
        bail!("need from <= to and a positive step");
    }

    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(ticker) = &args.ticker {
        config.ticker = ticker.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(frequency) = args.frequency {
        config.frequency = frequency;
    }
    config.validate()?;

    let start = Instant::now();
    println!("Loading market data for {}...", config.ticker);

    let mut analyzer = MarketAnalyzer::new(CsvMarketData::new(&config.data_dir));
    let analysis = analyzer.analyze(&config.ticker, config.years)?;
    let schedule = analysis.schedule(config.frequency)?;
    println!(
        "Estimated trend {:+.2}%/month, {:.0} per payout",
        analysis.growth.growth_rate_per_period, schedule.per_payout_amount
    );

    let steps = ((args.to - args.from) / args.step).round() as usize;
    let rates: Vec<f64> = (0..=steps).map(|i| args.from + i as f64 * args.step).collect();

    println!("Running {} projections...", rates.len());
    let proj_start = Instant::now();
    let runner = ScenarioRunner::new(analysis.snapshot, schedule);
    let results = runner.run_growth_sweep(config.projection_config(), &rates);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for (rate, result) in results {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                warn!("growth {:+.2}%: {}", rate, e);
                continue;
            }
        };
        let summary = result.summary();
        writer.serialize(SweepRow {
            growth_rate: rate,
            final_invested: summary.final_invested,
            final_asset: summary.final_asset,
            total_profit: summary.total_profit,
            roi_pct: summary.roi * 100.0,
            net_dividends: summary.accumulated_net_dividends,
            price_impact: summary.price_impact,
            break_even_month: summary.break_even_month,
        })?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());
    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
