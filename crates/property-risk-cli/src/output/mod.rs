pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Metric distributions of a simulation result, in display order.
pub const DISTRIBUTION_FIELDS: [&str; 6] = [
    "annualized_return",
    "total_return",
    "total_cash_flow",
    "final_equity",
    "total_appreciation",
    "total_principal_paydown",
];

/// Summary statistics of a distribution, in display order.
pub const STAT_FIELDS: [&str; 9] = [
    "mean", "std_dev", "min", "p10", "p25", "p50", "p75", "p90", "max",
];

/// Dispatch output to the appropriate formatter. Plain-text results (the
/// `--summary` digest) are printed as-is in every format.
pub fn format_output(format: &OutputFormat, value: &Value) {
    if let Value::String(text) = value {
        println!("{text}");
        return;
    }
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// True when the value is a full simulation result.
pub fn is_simulation_result(value: &Value) -> bool {
    value.get("annualized_return").is_some() && value.get("risk_metrics").is_some()
}
