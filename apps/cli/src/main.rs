#![deny(warnings)]

//! Headless CLI for running a rice farm scenario and printing its breakdown.

use anyhow::{Context, Result};
use rice_core::*;
use rice_econ::ScenarioModel;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod samples {
    include!(concat!(env!("OUT_DIR"), "/samples.rs"));
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: Option<PathBuf>,
    sample: Option<String>,
    defaults: Option<PathBuf>,
    yield_scenario: Option<String>,
    price_scenario: Option<String>,
    json: bool,
    version: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => out.scenario = it.next().map(PathBuf::from),
            "--sample" => out.sample = it.next(),
            "--defaults" => out.defaults = it.next().map(PathBuf::from),
            "--yield" => out.yield_scenario = it.next(),
            "--price" => out.price_scenario = it.next(),
            "--json" => out.json = true,
            "--version" => out.version = true,
            _ => {}
        }
    }
    out
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_scenario(text: &str, json: bool) -> Result<ScenarioInput> {
    let input = if json {
        serde_json::from_str(text)?
    } else {
        serde_yaml::from_str(text)?
    };
    Ok(input)
}

fn load_scenario(path: &Path) -> Result<ScenarioInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    parse_scenario(&text, is_json(path))
        .with_context(|| format!("parsing scenario {}", path.display()))
}

/// Parse one of the sample farms bundled from `assets/scenarios`.
fn load_sample(name: &str) -> Result<ScenarioInput> {
    match samples::SAMPLES.iter().find(|(stem, _)| *stem == name) {
        Some((_, text)) => {
            parse_scenario(text, false).with_context(|| format!("parsing sample {name}"))
        }
        None => {
            let known: Vec<_> = samples::SAMPLES.iter().map(|(stem, _)| *stem).collect();
            anyhow::bail!("unknown sample {name:?} (available: {})", known.join(", "))
        }
    }
}

fn load_overrides(path: &Path) -> Result<CostOverrides> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading cost overrides {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("parsing cost overrides {}", path.display()))
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `$1,234.56`, with a leading minus for losses.
fn format_usd(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let text = format!("{:.2}", rounded.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

fn format_pct(pct: Decimal) -> String {
    format!("{:.2}%", round_cents(pct))
}

fn write_lines(out: &mut String, lines: &[CostLine]) -> std::fmt::Result {
    for line in lines {
        writeln!(out, "    {:<44} {:>16}", line.name, format_usd(line.amount))?;
    }
    Ok(())
}

fn render_report(r: &ScenarioResult) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let s = &r.inputs_summary;
    writeln!(out, "Selected Scenario Inputs Summary")?;
    writeln!(out, "  Farm size (acres):            {}", s.farm_size_acres)?;
    writeln!(out, "  Land tenure:                  {}", s.land_tenure)?;
    writeln!(
        out,
        "  Ratoon crop:                  {}",
        if s.ratoon_cultivation { "Yes" } else { "No" }
    )?;
    writeln!(
        out,
        "  Main crop yield (cwt/acre):   {} [{}]",
        s.active_yield_cwt_per_acre, s.active_yield_scenario
    )?;
    match s.ratoon_yield_cwt_per_acre {
        Some(y) => writeln!(out, "  Ratoon crop yield (cwt/acre): {y}")?,
        None => writeln!(out, "  Ratoon crop yield (cwt/acre): N/A")?,
    }
    writeln!(
        out,
        "  Rice price ($/cwt):           {} [{}]",
        format_usd(s.active_price_per_cwt),
        s.active_price_scenario
    )?;

    let rev = &r.revenue;
    writeln!(out, "\nRevenue")?;
    writeln!(out, "  Main crop revenue:            {}", format_usd(rev.main_crop_revenue))?;
    if s.ratoon_cultivation {
        writeln!(out, "  Ratoon crop revenue:          {}", format_usd(rev.ratoon_crop_revenue))?;
    }
    writeln!(
        out,
        "  Government program payments:  {}",
        format_usd(rev.government_program_payments)
    )?;
    writeln!(
        out,
        "  Total gross annual revenue:   {}",
        format_usd(rev.total_gross_annual_revenue)
    )?;

    let est = &r.establishment_costs;
    writeln!(out, "\nEstablishment Costs (one-time or infrequent)")?;
    write_lines(&mut out, &est.items)?;
    writeln!(
        out,
        "  Total establishment costs:    {}",
        format_usd(est.total_establishment_costs)
    )?;

    let op = &r.operational_expenditures;
    writeln!(out, "\nAnnual Operational Expenditures")?;
    writeln!(
        out,
        "  Main crop variable costs:     {}",
        format_usd(op.total_main_crop_variable_costs)
    )?;
    writeln!(
        out,
        "  Ratoon crop variable costs:   {}",
        format_usd(op.total_ratoon_crop_variable_costs)
    )?;
    writeln!(out, "  Fixed costs:")?;
    write_lines(&mut out, &op.fixed_costs)?;
    writeln!(
        out,
        "  Total annual fixed costs:     {}",
        format_usd(op.total_annual_fixed_costs)
    )?;
    writeln!(
        out,
        "  Total operational costs:      {}",
        format_usd(op.total_annual_operational_costs)
    )?;

    let p = &r.profitability;
    writeln!(out, "\nProfitability")?;
    writeln!(out, "  Gross profit (revenue - VC):  {}", format_usd(p.gross_profit))?;
    writeln!(out, "  Net profit before tax:        {}", format_usd(p.net_profit_before_tax))?;

    writeln!(out, "\nReturn on Investment")?;
    writeln!(
        out,
        "  Annual operational ROI:       {}",
        format_pct(r.roi.annual_operational_roi_pct)
    )?;
    if est.total_establishment_costs > Decimal::ZERO {
        writeln!(
            out,
            "  ROI on establishment (simplified annual): {}",
            format_pct(r.roi.roi_on_establishment_pct)
        )?;
    } else {
        writeln!(out, "  ROI on establishment (simplified annual): N/A (no establishment costs)")?;
    }
    Ok(out)
}

/// Load, override, validate and run the scenario described by `args`.
fn run(args: Args) -> Result<ScenarioResult> {
    let mut input = match (&args.scenario, &args.sample) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(name)) => load_sample(name)?,
        (None, None) => ScenarioInput::reference(),
    };
    if let Some(name) = args.yield_scenario {
        input.yield_scenarios.active = name;
    }
    if let Some(name) = args.price_scenario {
        input.price_scenarios.active = name;
    }
    validate_input(&input)?;

    let mut defaults = CostDefaults::agrilife();
    if let Some(path) = &args.defaults {
        defaults = defaults.with_overrides(&load_overrides(path)?)?;
    }
    validate_cost_defaults(&defaults)?;

    Ok(ScenarioModel::new(defaults).run(&input)?)
}

fn main() -> Result<()> {
    // Logging setup; stdout carries the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.version {
        println!(
            "rice-scenario {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(scenario = ?args.scenario, defaults = ?args.defaults, "starting CLI");

    let json = args.json;
    let result = run(args)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result)?);
    }
    Ok(())
}
