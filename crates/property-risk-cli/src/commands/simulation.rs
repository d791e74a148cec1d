use clap::Args;
use serde_json::Value;

use property_risk_core::monte_carlo::{
    create_default_uncertainty_parameters, run_monte_carlo_simulation_with_progress, BaseState,
    SimulationConfig,
};
use property_risk_core::reporting::generate_summary_text;

use crate::input;

/// Arguments for a Monte Carlo risk simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON or YAML simulation config
    #[arg(long)]
    pub input: Option<String>,

    /// Number of trials (overrides the config)
    #[arg(long)]
    pub simulations: Option<u32>,

    /// Projection horizon in years (overrides the config)
    #[arg(long)]
    pub years: Option<u32>,

    /// Seed for a reproducible run (overrides the config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target return for Sharpe / Sortino, in percent
    #[arg(long)]
    pub risk_free_rate: Option<f64>,

    /// Trials per progress report
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Print a plain-text digest instead of the full result
    #[arg(long)]
    pub summary: bool,

    /// Suppress the progress indicator on stderr
    #[arg(long, short)]
    pub quiet: bool,
}

/// Arguments for deriving default uncertainty ranges
#[derive(Args)]
pub struct DefaultsArgs {
    /// Path to a JSON or YAML base state
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config: SimulationConfig =
        input::read_document(args.input.as_deref(), "simulation")?;
    apply_overrides(&mut config, &args);

    let show_progress = !args.quiet && atty::is(atty::Stream::Stderr);
    let mut last_shown = -1_i64;
    let mut sink = |percent: f64| {
        let whole = percent.floor() as i64;
        if show_progress && whole != last_shown {
            eprint!("\rSimulating... {whole:>3}%");
            last_shown = whole;
        }
    };

    let outcome = run_monte_carlo_simulation_with_progress(&config, &mut sink, None);
    if show_progress {
        eprintln!();
    }
    let result = outcome?;

    if args.summary {
        return Ok(Value::String(generate_summary_text(&result)));
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_defaults(args: DefaultsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base: BaseState =
        input::read_document(args.input.as_deref(), "default uncertainty ranges")?;
    let params = create_default_uncertainty_parameters(&base);
    Ok(serde_json::to_value(params)?)
}

fn apply_overrides(config: &mut SimulationConfig, args: &SimulateArgs) {
    if let Some(n) = args.simulations {
        config.simulations = n;
    }
    if let Some(y) = args.years {
        config.years = Some(y);
    }
    if let Some(s) = args.seed {
        config.seed = Some(s);
    }
    if let Some(rf) = args.risk_free_rate {
        config.risk_free_rate = rf;
    }
    if let Some(c) = args.chunk_size {
        config.chunk_size = c;
    }
}
