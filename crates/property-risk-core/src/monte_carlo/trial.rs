use rand::Rng;
use serde::{Deserialize, Serialize};

use super::inputs::{BaseState, UncertaintyParameters};
use super::projection::{project, YearRecord};
use super::sampling::{sample_parameters, SampledParameters};
use crate::error::PropertyRiskError;
use crate::types::{Money, Percent};
use crate::PropertyRiskResult;

/// Summary of one simulated investment scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub total_cash_flow: Money,
    pub total_principal_paydown: Money,
    pub total_appreciation: Money,
    pub final_equity: Money,
    /// Cash flow + appreciation + principal paydown
    pub total_return: Money,
    /// Compound annual return on the initial investment, in percent
    pub annualized_return: Percent,
    /// Largest peak-to-trough fall in cumulative cash flow, in dollars
    pub max_drawdown: Money,
}

/// Simulate a single trial: sample every uncertain variable, project the
/// pro forma and reduce it to a `TrialOutcome`.
pub fn run_trial<R: Rng + ?Sized>(
    base: &BaseState,
    params: &UncertaintyParameters,
    years: u32,
    rng: &mut R,
) -> PropertyRiskResult<TrialOutcome> {
    let sampled = sample_parameters(base, params, rng);
    evaluate_trial(base, &sampled, years)
}

/// Reduce the projection of an already sampled parameter set.
pub fn evaluate_trial(
    base: &BaseState,
    sampled: &SampledParameters,
    years: u32,
) -> PropertyRiskResult<TrialOutcome> {
    if years < 1 {
        return Err(PropertyRiskError::invalid("years", "Must be at least 1"));
    }
    let records = project(base, sampled, years);
    summarize(base, sampled, &records)
}

fn summarize(
    base: &BaseState,
    sampled: &SampledParameters,
    records: &[YearRecord],
) -> PropertyRiskResult<TrialOutcome> {
    let years = records.len() as u32;
    let total_cash_flow: Money = records.iter().map(|r| r.cash_flow).sum();
    let total_principal_paydown: Money = records.iter().map(|r| r.principal_paid).sum();
    let final_value = records
        .last()
        .map(|r| r.property_value)
        .unwrap_or(sampled.purchase_price);
    let total_appreciation = final_value - sampled.purchase_price;

    let down_payment_equity = sampled.purchase_price - base.loan_amount;
    let final_equity = total_principal_paydown + total_appreciation + down_payment_equity;
    let total_return = total_cash_flow + total_appreciation + total_principal_paydown;

    let annualized_return = annualized_return(total_return, base.initial_investment, years)?;

    Ok(TrialOutcome {
        total_cash_flow,
        total_principal_paydown,
        total_appreciation,
        final_equity,
        total_return,
        annualized_return,
        max_drawdown: cash_flow_drawdown(records),
    })
}

/// `((1 + total_return / investment)^(1/years) - 1) * 100`.
///
/// A growth factor at or below zero means the whole investment (or more) was
/// lost; that is reported as -100% rather than a NaN from a fractional power.
pub fn annualized_return(
    total_return: Money,
    initial_investment: Money,
    years: u32,
) -> PropertyRiskResult<Percent> {
    if initial_investment <= 0.0 {
        return Err(PropertyRiskError::invalid(
            "initial_investment",
            "Initial investment must be positive",
        ));
    }
    if years < 1 {
        return Err(PropertyRiskError::invalid("years", "Must be at least 1"));
    }
    let growth = 1.0 + total_return / initial_investment;
    if growth <= 0.0 {
        return Ok(-100.0);
    }
    Ok((growth.powf(1.0 / years as f64) - 1.0) * 100.0)
}

/// Largest decline of cumulative cash flow from its running peak. The peak
/// starts at zero, the position at acquisition.
fn cash_flow_drawdown(records: &[YearRecord]) -> Money {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for r in records {
        peak = peak.max(r.cumulative_cash_flow);
        max_dd = max_dd.max(peak - r.cumulative_cash_flow);
    }
    max_dd
}
