mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::limits::LimitsArgs;
use commands::simulation::{ScheduleArgs, SimulateArgs};

/// Loan installment simulator
#[derive(Parser)]
#[command(
    name = "loansim",
    version,
    about = "Loan installment simulator",
    long_about = "Validates loan simulations against the per-installment interest-rate \
                  bands and computes the installment amount with decimal precision. \
                  Supports pro-rata days, price-index adjustment, administrator \
                  rate-limit overrides and payment schedules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Simulator config file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a simulation and compute the installment amount
    Simulate(SimulateArgs),
    /// Validate a simulation without computing it
    Validate(SimulateArgs),
    /// Show the interest-rate bands in effect
    Limits(LimitsArgs),
    /// Simulate and lay out the payment schedule
    Schedule(ScheduleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match input::config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulation::run_simulate(args, &config),
        Commands::Validate(args) => commands::simulation::run_validate(args, &config),
        Commands::Limits(args) => commands::limits::run_limits(args, &config),
        Commands::Schedule(args) => commands::simulation::run_schedule(args, &config),
        Commands::Version => {
            println!("loansim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
