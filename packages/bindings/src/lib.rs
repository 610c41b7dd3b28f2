use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use loan_sim_core::config::SimulatorConfig;
use loan_sim_core::limits::EffectiveBand;
use loan_sim_core::simulation::{self, SimulationRequest};
use loan_sim_core::{report, round_cents, Money, Percent};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// A request plus the deployment config it runs under.
///
/// The request fields sit at the top level; `config` may be omitted.
#[derive(Deserialize)]
struct SimulationCall {
    #[serde(flatten)]
    request: SimulationRequest,
    #[serde(default)]
    config: SimulatorConfig,
}

#[derive(Deserialize)]
struct ScheduleCall {
    #[serde(flatten)]
    call: SimulationCall,
    simulation_date: NaiveDate,
}

#[derive(Deserialize)]
struct InstallmentCall {
    principal: Money,
    installment_count: u32,
    rate_pct: Percent,
    #[serde(default)]
    extra_days: u32,
    #[serde(default)]
    monthly_index_rate_pct: Percent,
}

#[derive(Serialize)]
struct InstallmentAmount {
    installment_amount: Money,
    installment_amount_rounded: Money,
}

fn parse_call(input_json: &str) -> NapiResult<SimulationCall> {
    let call: SimulationCall = serde_json::from_str(input_json).map_err(to_napi_error)?;
    call.config.check().map_err(to_napi_error)?;
    Ok(call)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_simulation(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let table = call.config.rate_limit_table().map_err(to_napi_error)?;
    let outcome = simulation::validate_with_policy(&call.request, &table, &call.config.policy());
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

#[napi]
pub fn simulate(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let table = call.config.rate_limit_table().map_err(to_napi_error)?;
    let output = simulation::simulate(&call.request, &table, &call.config.policy())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// The bare formula, without rate-band validation.
#[napi]
pub fn compute_installment(input_json: String) -> NapiResult<String> {
    let input: InstallmentCall = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let count = NonZeroU32::new(input.installment_count)
        .ok_or_else(|| to_napi_error("installment_count must be at least 1"))?;
    let amount = simulation::compute_installment(
        input.principal,
        input.rate_pct,
        count,
        input.extra_days,
        input.monthly_index_rate_pct,
    )
    .map_err(to_napi_error)?;
    let output = InstallmentAmount {
        installment_amount: amount,
        installment_amount_rounded: round_cents(amount),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate limits
// ---------------------------------------------------------------------------

/// Bands in effect under a config document (`"{}"` for the defaults).
#[napi]
pub fn rate_limit_table(config_json: String) -> NapiResult<String> {
    let config = SimulatorConfig::from_json(&config_json).map_err(to_napi_error)?;
    let table = config.rate_limit_table().map_err(to_napi_error)?;
    let bands: Vec<EffectiveBand> = table.effective_bands();
    serde_json::to_string(&bands).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[napi]
pub fn payment_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleCall = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let call = input.call;
    call.config.check().map_err(to_napi_error)?;
    let table = call.config.rate_limit_table().map_err(to_napi_error)?;
    let output = report::simulate_schedule(
        &call.request,
        &table,
        &call.config.policy(),
        input.simulation_date,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
