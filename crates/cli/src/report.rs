//! Console summaries and JSON export of simulator output.

use std::path::Path;

use anyhow::{Context, Result};
use rollover_core::{config::WindowStep, format_month, Config, Strategy};
use rollover_engine::{
    fixed_return::{SpyValuePoint, UbsValuePoint},
    metrics::ReturnStats,
    FixedReturnReport, HistoricalReport, SweepSummary,
};
use serde::Serialize;

#[derive(Serialize)]
struct HistoricalExport<'a> {
    summary: SweepSummary,
    #[serde(flatten)]
    report: &'a HistoricalReport,
}

#[derive(Serialize)]
struct FixedExport<'a> {
    spy_series: Vec<SpyValuePoint>,
    ubs_series: Vec<UbsValuePoint>,
    #[serde(flatten)]
    report: &'a FixedReturnReport,
}

/// Write the sweep and its summary as JSON.
pub fn write_historical(path: &Path, report: &HistoricalReport) -> Result<()> {
    let export = HistoricalExport {
        summary: report.summary(),
        report,
    };
    write_json(path, &export)
}

/// Write both fixed-return series as JSON.
pub fn write_fixed(path: &Path, report: &FixedReturnReport) -> Result<()> {
    let export = FixedExport {
        spy_series: report.spy_series(),
        ubs_series: report.ubs_series(),
        report,
    };
    write_json(path, &export)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote results");
    Ok(())
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn pct_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), pct)
}

fn print_stats(label: &str, stats: Option<&ReturnStats>) {
    println!("\n=== {label} Summary ===");
    match stats {
        Some(s) => {
            println!("Min annualized return: {}", pct(s.min));
            println!("Max annualized return: {}", pct(s.max));
            println!("Average annualized return: {}", pct(s.mean));
            println!("Std dev of annualized return: {}", pct(s.std_dev));
        }
        None => println!("No defined returns"),
    }
}

/// Print the sweep summary.
pub fn print_historical(config: &Config, report: &HistoricalReport) {
    let summary = report.summary();
    let unit = match config.historical.window_step {
        WindowStep::Monthly => "months",
        WindowStep::January => "years",
    };

    println!(
        "Total {}-month windows simulated: {}",
        config.plan.horizon_months, summary.windows
    );
    if let (Some(first), Some(last)) = (report.windows.first(), report.windows.last()) {
        println!(
            "Window starts: {} to {}",
            format_month(first.start),
            format_month(last.start)
        );
    }
    if !report.failures.is_empty() {
        println!("Failed windows: {}", report.failures.len());
    }
    if report.skipped_gaps > 0 {
        println!("Windows skipped for data gaps: {}", report.skipped_gaps);
    }

    print_stats(Strategy::BuyAndHold.label(), summary.spy.as_ref());
    print_stats(Strategy::BonusRollover.label(), summary.ubs.as_ref());

    println!("\n=== Strategy Comparison ===");
    println!("{} wins: {} {unit}", Strategy::BuyAndHold.label(), summary.spy_wins);
    println!("{} wins: {} {unit}", Strategy::BonusRollover.label(), summary.ubs_wins);
    if summary.ties > 0 {
        println!("Ties: {} {unit}", summary.ties);
    }
    if summary.undefined > 0 {
        println!("Undefined: {} {unit}", summary.undefined);
    }
    println!("SPY win rate: {:.1}%", summary.spy_win_rate * 100.0);
    println!("UBS Bonus win rate: {:.1}%", summary.ubs_win_rate * 100.0);
    if let Some(best) = summary.best_spread {
        println!("Best window for UBS Bonus: {} ({:+.2} pts)", format_month(best.start), best.spread * 100.0);
    }
    if let Some(worst) = summary.worst_spread {
        println!("Worst window for UBS Bonus: {} ({:+.2} pts)", format_month(worst.start), worst.spread * 100.0);
    }
}

/// Print the fixed-return comparison.
pub fn print_fixed(config: &Config, report: &FixedReturnReport) {
    let plan = &config.plan;
    println!("Simulation Parameters:");
    println!("  SPY Average Yearly Return: {}", pct(report.spy_rate));
    println!("  UBS Average Yearly Return: {}", pct(report.ubs_rate));
    println!("  Monthly Investment: ${:.2}", plan.monthly_amount);
    println!("  Investment Period: First {} months", plan.accumulation_months);
    println!("  Total Period: {} months", plan.horizon_months);

    for run in [&report.spy, &report.ubs] {
        println!("\n=== {} Summary ===", run.strategy.label());
        println!("Final portfolio value: ${:.2}", run.final_value);
        println!("Total return: {}", pct_or_na(run.total_return().ok()));
        println!("Annualized return: {}", pct_or_na(run.annualized_return().ok()));
    }

    println!("\n=== Strategy Comparison ===");
    match report.winner() {
        Some(strategy) => println!("{} wins by ${:.2}", strategy.label(), report.margin()),
        None => println!("Both strategies have the same final value"),
    }
}
