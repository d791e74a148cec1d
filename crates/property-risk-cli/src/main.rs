mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortize::AmortizeArgs;
use commands::simulation::{DefaultsArgs, SimulateArgs};

/// Monte Carlo risk simulation for leveraged rental property
#[derive(Parser)]
#[command(
    name = "prisk",
    version,
    about = "Monte Carlo risk simulation for leveraged rental property",
    long_about = "Simulates thousands of randomized multi-year holding periods for a \
                  rental property financed with an amortizing mortgage, and reports \
                  return distributions, VaR / CVaR, Sharpe / Sortino and representative \
                  scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Monte Carlo risk simulation
    Simulate(SimulateArgs),
    /// Derive default uncertainty ranges from a base state
    Defaults(DefaultsArgs),
    /// Monthly payment and yearly amortization schedule for a loan
    Amortize(AmortizeArgs),
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
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulation::run_simulate(args),
        Commands::Defaults(args) => commands::simulation::run_defaults(args),
        Commands::Amortize(args) => commands::amortize::run_amortize(args),
        Commands::Version => {
            println!("prisk {}", env!("CARGO_PKG_VERSION"));
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
