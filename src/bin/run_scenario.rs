//! Run a scenario projection from a JSON spec and export the monthly ledger
//!
//! Outputs the unified ledger as CSV for comparison in a spreadsheet, plus a
//! summary of the derived KPIs. With --compare, also reports the break-even
//! period between the two scenarios.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use lifecast::{
    break_even, burn_rate, deflate, net_present_value, total_cost_of_ownership, BreakEven,
    RateResolver, RateSpec, Scenario, ScenarioSpec, SimulationResult,
};

#[derive(Debug, Parser)]
#[command(about = "Project a financial scenario month by month")]
struct Args {
    /// Scenario spec file (JSON)
    scenario: PathBuf,

    /// Second scenario to compare for break-even
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Output CSV path for the unified ledger
    #[arg(long, default_value = "ledger.csv")]
    output: PathBuf,

    /// Report an extra column of real dollars deflated to this base period
    #[arg(long)]
    deflate_base: Option<u32>,

    /// Effective annual inflation rate used with --deflate-base
    #[arg(long, default_value_t = 0.025)]
    inflation: f64,

    /// Trailing window (months) for the burn rate summary
    #[arg(long, default_value_t = 12)]
    burn_window: usize,
}

fn load_scenario(path: &Path) -> anyhow::Result<(Scenario, RateResolver)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec: ScenarioSpec = serde_json::from_reader(file)
        .with_context(|| format!("parsing scenario spec {}", path.display()))?;
    Ok(spec.into_scenario())
}

fn write_ledger_csv(
    path: &Path,
    result: &SimulationResult,
    real_net: Option<&[f64]>,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let domains: Vec<String> = result
        .ledger
        .domains()
        .iter()
        .map(|d| d.to_string())
        .collect();

    let mut header = vec!["period".to_string(), "date".to_string()];
    header.extend(domains.iter().cloned());
    header.push("net".to_string());
    header.push("cumulative_net".to_string());
    if real_net.is_some() {
        header.push("real_net".to_string());
    }
    writer.write_record(&header)?;

    for row in result.ledger.rows() {
        let mut record = vec![row.period.to_string(), row.date.to_string()];
        for domain in &domains {
            record.push(format!("{:.2}", row.by_domain.get(domain).copied().unwrap_or(0.0)));
        }
        record.push(format!("{:.2}", row.net));
        record.push(format!("{:.2}", row.cumulative_net));
        if let Some(real) = real_net {
            record.push(format!("{:.2}", real[row.period as usize]));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (scenario, resolver) = load_scenario(&args.scenario)?;
    let name = scenario.name.clone();

    let start = Instant::now();
    let result = lifecast::run(&scenario, &resolver)?;
    println!(
        "Projected '{}' over {} periods in {:?}",
        name,
        result.ledger.len(),
        start.elapsed()
    );

    let real_net = match args.deflate_base {
        Some(base) => {
            let inflation =
                resolver.resolve(&RateSpec::constant(args.inflation), &result.timeline)?;
            Some(deflate::deflate_net(&result.ledger, &inflation, base)?)
        }
        None => None,
    };

    write_ledger_csv(&args.output, &result, real_net.as_deref())?;
    println!("Ledger written to {}", args.output.display());

    // KPI summary
    let last = result
        .ledger
        .rows()
        .last()
        .context("ledger has no rows")?;
    println!("\nScenario summary:");
    println!("  Cumulative net at horizon end: {:.2}", last.cumulative_net);
    println!(
        "  NPV at {:.2}% discount: {:.2}",
        scenario.annual_discount_rate * 100.0,
        net_present_value(&result.ledger, scenario.annual_discount_rate)?
    );
    if let Some(final_burn) = burn_rate(&result.ledger, args.burn_window).last() {
        println!(
            "  Trailing {}-month burn rate at horizon end: {:.2}",
            args.burn_window, final_burn
        );
    }
    for series in &result.series {
        println!(
            "  {} cost over full horizon: {:.2}",
            series.domain(),
            total_cost_of_ownership(series, result.ledger.len() as u32)
        );
    }

    if let Some(compare_path) = &args.compare {
        let (other, other_resolver) = load_scenario(compare_path)?;
        let other_name = other.name.clone();
        let other_result = lifecast::run(&other, &other_resolver)?;
        match break_even(&result.ledger, &other_result.ledger)? {
            BreakEven::At(period) => {
                let date = result.timeline.date_of(period);
                println!(
                    "\n'{}' breaks even against '{}' at period {}{}",
                    name,
                    other_name,
                    period,
                    date.map(|d| format!(" ({})", d)).unwrap_or_default()
                );
            }
            BreakEven::NotWithinHorizon => {
                println!("\nNo break-even between '{}' and '{}' within the horizon", name, other_name);
            }
        }
    }

    Ok(())
}
