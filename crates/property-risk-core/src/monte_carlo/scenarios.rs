use serde::{Deserialize, Serialize};

use super::statistics::{percentile_sorted, sorted_copy};
use super::trial::TrialOutcome;
use crate::error::PropertyRiskError;
use crate::PropertyRiskResult;

/// A representative trial and where it sits in the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Zero-based index of the selected trial
    pub trial_index: usize,
    /// Total-return percentile the trial was chosen for
    pub target_percentile: f64,
    pub outcome: TrialOutcome,
}

/// Worst, pessimistic (P25), expected (P50), optimistic (P75) and best trials
/// ranked by total return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub worst: Scenario,
    pub pessimistic: Scenario,
    pub expected: Scenario,
    pub optimistic: Scenario,
    pub best: Scenario,
}

/// Pick the trial whose total return is closest to each target percentile.
///
/// `outcome_at` rebuilds the full outcome for a trial index. Ties go to the
/// lowest index so the selection is deterministic.
pub fn select_scenarios<F>(
    total_returns: &[f64],
    outcome_at: F,
) -> PropertyRiskResult<ScenarioSet>
where
    F: Fn(usize) -> TrialOutcome,
{
    if total_returns.is_empty() {
        return Err(PropertyRiskError::InsufficientData(
            "At least one trial is required to select scenarios".into(),
        ));
    }
    let sorted = sorted_copy(total_returns);

    let pick = |p: f64| {
        let target = percentile_sorted(&sorted, p);
        let trial_index = closest_index(total_returns, target);
        Scenario {
            trial_index,
            target_percentile: p,
            outcome: outcome_at(trial_index),
        }
    };

    Ok(ScenarioSet {
        worst: pick(0.0),
        pessimistic: pick(25.0),
        expected: pick(50.0),
        optimistic: pick(75.0),
        best: pick(100.0),
    })
}

fn closest_index(values: &[f64], target: f64) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        // Strict comparison keeps the first occurrence on ties
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    best_idx
}
