use clap::Args;
use serde::Serialize;
use serde_json::Value;

use loan_sim_core::config::SimulatorConfig;
use loan_sim_core::limits::{BandSource, EffectiveBand};
use loan_sim_core::simulation::describe_band;
use loan_sim_core::Percent;

/// Arguments for listing rate bands
#[derive(Args)]
pub struct LimitsArgs {
    /// Show only the band for this installment count
    #[arg(long, short = 'n')]
    pub installments: Option<u32>,
}

#[derive(Serialize)]
struct BandRow {
    installment_count: u32,
    min_rate_pct: Percent,
    max_rate_pct: Percent,
    source: BandSource,
    hint: String,
}

pub fn run_limits(
    args: LimitsArgs,
    config: &SimulatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let table = config.rate_limit_table()?;

    let bands: Vec<EffectiveBand> = match args.installments {
        Some(n) => vec![table
            .band_for(n)
            .ok_or_else(|| format!("no rate band configured for {n} installments"))?],
        None => table.effective_bands(),
    };

    let rows: Vec<BandRow> = bands
        .into_iter()
        .map(|b| BandRow {
            installment_count: b.installment_count,
            min_rate_pct: b.band.min_rate_pct,
            max_rate_pct: b.band.max_rate_pct,
            source: b.source,
            hint: describe_band(b.installment_count, &table).unwrap_or_default(),
        })
        .collect();

    Ok(serde_json::to_value(rows)?)
}
