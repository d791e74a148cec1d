use std::fmt::Write;

use super::format::{format_currency, format_percentage, group_thousands};
use crate::monte_carlo::simulation::SimulationResult;

/// Render a plain-text digest of a simulation result, one fact per line.
pub fn generate_summary_text(result: &SimulationResult) -> String {
    let ar = &result.annualized_return;
    let risk = &result.risk_metrics;
    let scenarios = &result.scenarios;
    let meta = &result.metadata;

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "Monte Carlo risk summary ({} trials over {} years)",
        group_thousands(meta.simulations as u128),
        meta.years
    );
    let _ = writeln!(
        out,
        "Median annualized return: {}",
        format_percentage(ar.p50)
    );
    let _ = writeln!(
        out,
        "80% of outcomes between {} and {} a year",
        format_percentage(ar.p10),
        format_percentage(ar.p90)
    );
    let _ = writeln!(
        out,
        "Probability of loss: {}",
        format_percentage(risk.probability_of_loss)
    );
    let _ = writeln!(
        out,
        "95% VaR: {} a year; CVaR: {}",
        format_percentage(risk.value_at_risk_95),
        format_percentage(risk.conditional_var_95)
    );
    let _ = writeln!(
        out,
        "Sharpe ratio: {:.2}; Sortino ratio: {:.2}",
        risk.sharpe_ratio, risk.sortino_ratio
    );
    let _ = writeln!(
        out,
        "Total return: expected {}, worst {}, best {}",
        format_currency(scenarios.expected.outcome.total_return),
        format_currency(scenarios.worst.outcome.total_return),
        format_currency(scenarios.best.outcome.total_return)
    );
    let _ = writeln!(
        out,
        "Median final equity: {}",
        format_currency(result.final_equity.p50)
    );
    let _ = writeln!(
        out,
        "Cash-flow drawdown (95th percentile): {}",
        format_currency(risk.max_drawdown)
    );
    let _ = write!(
        out,
        "Completed in {} ms",
        group_thousands(meta.elapsed_ms as u128)
    );

    if !result.warnings.is_empty() {
        out.push_str("\nWarnings:");
        for w in &result.warnings {
            let _ = write!(out, "\n  - {w}");
        }
    }

    out
}
