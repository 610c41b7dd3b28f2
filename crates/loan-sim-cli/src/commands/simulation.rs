use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_sim_core::config::SimulatorConfig;
use loan_sim_core::report;
use loan_sim_core::simulation::{self, extra_days_until, SimulationRequest};

use crate::input;
use crate::input::values::{parse_date_arg, parse_money_arg, parse_percent_arg};

/// Arguments for a single loan simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON request file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed (`1000.50` or `1.000,50`)
    #[arg(long, value_parser = parse_money_arg)]
    pub principal: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, short = 'n')]
    pub installments: Option<u32>,

    /// Interest rate per period, in percent (`15.5` or `15,5%`)
    #[arg(long, value_parser = parse_percent_arg)]
    pub rate: Option<Decimal>,

    /// Days past the regular first due date charged pro rata
    #[arg(long, conflicts_with = "first_due")]
    pub extra_days: Option<u32>,

    /// Requested first due date; extra days are derived from it
    #[arg(long, value_parser = parse_date_arg)]
    pub first_due: Option<NaiveDate>,

    /// Monthly price-index rate, in percent
    #[arg(long, value_parser = parse_percent_arg)]
    pub monthly_index: Option<Decimal>,

    /// Simulation date (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

/// Arguments for a payment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub simulation: SimulateArgs,
}

impl SimulateArgs {
    fn simulation_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Build the request from a file, piped stdin, or individual flags.
    ///
    /// Config defaults for pro-rata days and the price index only fill in
    /// flag-built requests; file and stdin requests are taken as written.
    fn request(
        &self,
        config: &SimulatorConfig,
    ) -> Result<SimulationRequest, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if self.principal.is_none() && self.installments.is_none() && self.rate.is_none() {
            if let Some(request) = input::stdin::read_stdin::<SimulationRequest>()? {
                return Ok(request);
            }
        }

        let (Some(principal), Some(installments), Some(rate)) =
            (self.principal, self.installments, self.rate)
        else {
            return Err(
                "--principal, --installments and --rate (or --input <file.json> / stdin) required"
                    .into(),
            );
        };

        let extra_days = match (self.extra_days, self.first_due) {
            (Some(days), _) => days,
            (None, Some(first_due)) => extra_days_until(self.simulation_date(), first_due)?,
            (None, None) => config.default_extra_days,
        };
        let monthly_index = self
            .monthly_index
            .unwrap_or_else(|| config.monthly_index_pct());

        log::debug!(
            "request from flags: {principal} over {installments} at {rate}%, \
             {extra_days} extra day(s), index {monthly_index}%"
        );
        Ok(SimulationRequest::new(principal, installments, rate)
            .with_extra_days(extra_days)
            .with_monthly_index(monthly_index))
    }
}

pub fn run_simulate(
    args: SimulateArgs,
    config: &SimulatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.request(config)?;
    let table = config.rate_limit_table()?;
    let result = simulation::simulate(&request, &table, &config.policy())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(
    args: SimulateArgs,
    config: &SimulatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.request(config)?;
    let table = config.rate_limit_table()?;
    let outcome = simulation::validate_with_policy(&request, &table, &config.policy());
    Ok(serde_json::to_value(outcome)?)
}

pub fn run_schedule(
    args: ScheduleArgs,
    config: &SimulatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let args = args.simulation;
    let request = args.request(config)?;
    let table = config.rate_limit_table()?;
    let result =
        report::simulate_schedule(&request, &table, &config.policy(), args.simulation_date())?;
    Ok(serde_json::to_value(result)?)
}
