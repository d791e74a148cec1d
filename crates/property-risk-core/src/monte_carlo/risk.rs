use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::statistics::{mean_and_std_dev, percentile_sorted, sorted_copy};
use crate::error::PropertyRiskError;
use crate::types::{Money, Percent};
use crate::PropertyRiskResult;

/// Percentile of the per-trial drawdown population reported as `max_drawdown`.
pub const DRAWDOWN_PERCENTILE: f64 = 95.0;

/// Risk metrics derived from the population of trial returns.
///
/// Return-based figures are in the units of the input samples (annualized
/// return in percent). VaR and CVaR are reported as signed returns: a
/// negative value is a loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Share of trials losing money, 0-100
    pub probability_of_loss: Percent,
    /// 5th percentile of returns
    pub value_at_risk_95: f64,
    /// 1st percentile of returns
    pub value_at_risk_99: f64,
    /// Mean of returns at or below the 95% VaR threshold
    pub conditional_var_95: f64,
    /// Mean of returns at or below the 99% VaR threshold
    pub conditional_var_99: f64,
    /// 95% VaR assuming normally distributed returns
    pub parametric_var_95: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub downside_deviation: f64,
    /// 95th percentile of per-trial peak-to-trough cumulative cash-flow
    /// declines, in dollars
    pub max_drawdown: Money,
}

/// Share of trials whose total return is negative, 0-100.
pub fn probability_of_loss(total_returns: &[Money]) -> Percent {
    if total_returns.is_empty() {
        return 0.0;
    }
    let losses = total_returns.iter().filter(|&&r| r < 0.0).count();
    100.0 * losses as f64 / total_returns.len() as f64
}

/// Compute risk metrics from trial returns and per-trial drawdowns.
///
/// Probability of loss is counted on `total_returns` (dollars), since a tiny
/// dollar loss can round to an annualized return of exactly zero.
///
/// `risk_free_rate` is the target return (same units as the samples) used for
/// Sharpe, Sortino and downside deviation. A zero denominator yields a ratio
/// of 0 rather than an infinity or NaN.
pub fn compute_risk(
    return_samples: &[f64],
    total_returns: &[Money],
    drawdowns: &[Money],
    risk_free_rate: f64,
) -> PropertyRiskResult<RiskMetrics> {
    if return_samples.is_empty() {
        return Err(PropertyRiskError::InsufficientData(
            "At least one return sample is required for risk metrics".into(),
        ));
    }

    let sorted = sorted_copy(return_samples);
    let (mean, std_dev) = mean_and_std_dev(return_samples);

    let probability_of_loss = probability_of_loss(total_returns);

    let value_at_risk_95 = percentile_sorted(&sorted, 5.0);
    let value_at_risk_99 = percentile_sorted(&sorted, 1.0);
    let conditional_var_95 = tail_mean(&sorted, value_at_risk_95);
    let conditional_var_99 = tail_mean(&sorted, value_at_risk_99);

    let parametric_var_95 = if std_dev > 0.0 {
        Normal::new(mean, std_dev)
            .map(|dist| dist.inverse_cdf(0.05))
            .unwrap_or(mean)
    } else {
        mean
    };

    let downside_deviation = downside_deviation(return_samples, risk_free_rate);
    let excess = mean - risk_free_rate;
    let sharpe_ratio = if std_dev > 0.0 { excess / std_dev } else { 0.0 };
    let sortino_ratio = if downside_deviation > 0.0 {
        excess / downside_deviation
    } else {
        0.0
    };

    let max_drawdown = if drawdowns.is_empty() {
        0.0
    } else {
        percentile_sorted(&sorted_copy(drawdowns), DRAWDOWN_PERCENTILE)
    };

    Ok(RiskMetrics {
        probability_of_loss,
        value_at_risk_95,
        value_at_risk_99,
        conditional_var_95,
        conditional_var_99,
        parametric_var_95,
        sharpe_ratio,
        sortino_ratio,
        downside_deviation,
        max_drawdown,
    })
}

/// Mean of the samples at or below `threshold`. The interpolated threshold
/// can sit below every sample only when it equals the minimum, so the tail is
/// never empty for a non-empty input; the threshold itself is the fallback.
fn tail_mean(sorted: &[f64], threshold: f64) -> f64 {
    let tail: Vec<f64> = sorted
        .iter()
        .copied()
        .take_while(|&r| r <= threshold)
        .collect();
    if tail.is_empty() {
        threshold
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    }
}

/// Root-mean-square shortfall below `target`, over the samples below target.
fn downside_deviation(returns: &[f64], target: f64) -> f64 {
    let (sum_sq, count) = returns
        .iter()
        .filter(|&&r| r < target)
        .fold((0.0_f64, 0_usize), |(s, c), &r| {
            let diff = r - target;
            (s + diff * diff, c + 1)
        });
    if count == 0 {
        0.0
    } else {
        (sum_sq / count as f64).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spread_returns() -> Vec<f64> {
        // -50 .. 49 in steps of 1
        (0..100).map(|i| i as f64 - 50.0).collect()
    }

    /// Risk metrics where the dollar returns share the sign of the rates.
    fn risk_of(returns: &[f64], risk_free_rate: f64) -> RiskMetrics {
        compute_risk(returns, returns, &[], risk_free_rate).unwrap()
    }

    #[test]
    fn test_probability_of_loss_counts_negative() {
        let r = risk_of(&spread_returns(), 0.0);
        assert_eq!(r.probability_of_loss, 50.0);
    }

    #[test]
    fn test_probability_of_loss_uses_dollar_returns() {
        // A one-cent loss annualizes to 0% but is still a loss
        let rates = [0.0, 5.0, 5.0, 5.0];
        let dollars = [-0.01, 1_000.0, 1_000.0, 1_000.0];
        let r = compute_risk(&rates, &dollars, &[], 0.0).unwrap();
        assert_eq!(r.probability_of_loss, 25.0);
        assert_eq!(probability_of_loss(&[]), 0.0);
    }

    #[test]
    fn test_all_positive_returns() {
        let r = risk_of(&[1.0, 2.0, 3.0], 0.0);
        assert_eq!(r.probability_of_loss, 0.0);
        assert_eq!(r.downside_deviation, 0.0);
        assert_eq!(r.sortino_ratio, 0.0);
        assert!(r.sharpe_ratio > 0.0);
    }

    #[test]
    fn test_var_is_type7_percentile() {
        let r = risk_of(&spread_returns(), 0.0);
        // rank = 0.05 * 99 = 4.95 -> -46 + 0.95 = -45.05
        assert!((r.value_at_risk_95 - (-45.05)).abs() < 1e-9);
        // rank = 0.99 -> -50 + 0.99
        assert!((r.value_at_risk_99 - (-49.01)).abs() < 1e-9);
    }

    #[test]
    fn test_cvar_is_tail_mean() {
        let r = risk_of(&spread_returns(), 0.0);
        // Samples <= -45.05 are -50..=-46
        assert!((r.conditional_var_95 - (-48.0)).abs() < 1e-9);
        assert_eq!(r.conditional_var_99, -50.0);
        assert!(r.conditional_var_95 <= r.value_at_risk_95);
        assert!(r.conditional_var_99 <= r.value_at_risk_99);
    }

    #[test]
    fn test_zero_variance_ratios_are_zero() {
        let r = risk_of(&[5.0; 100], 0.0);
        assert_eq!(r.sharpe_ratio, 0.0);
        assert_eq!(r.sortino_ratio, 0.0);
        assert_eq!(r.parametric_var_95, 5.0);
        assert!(r.sharpe_ratio.is_finite());
    }

    #[test]
    fn test_downside_deviation_only_below_target() {
        // Below zero: -3 and -4 -> sqrt((9 + 16) / 2)
        let r = risk_of(&[-3.0, -4.0, 10.0, 20.0], 0.0);
        assert!((r.downside_deviation - 12.5_f64.sqrt()).abs() < 1e-12);
        let mean = (-3.0 - 4.0 + 10.0 + 20.0) / 4.0;
        assert!((r.sortino_ratio - mean / 12.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_risk_free_rate_shifts_target() {
        let r0 = risk_of(&[1.0, 3.0, 5.0, 7.0], 0.0);
        let r4 = risk_of(&[1.0, 3.0, 5.0, 7.0], 4.0);
        assert!(r4.sharpe_ratio < r0.sharpe_ratio);
        assert!(r4.downside_deviation > 0.0);
    }

    #[test]
    fn test_parametric_var_below_mean() {
        let r = risk_of(&spread_returns(), 0.0);
        assert!(r.parametric_var_95 < -0.5);
    }

    #[test]
    fn test_max_drawdown_percentile() {
        let drawdowns: Vec<f64> = (0..=100).map(|i| i as f64 * 10.0).collect();
        let r = compute_risk(&[1.0], &[1.0], &drawdowns, 0.0).unwrap();
        assert!((r.max_drawdown - 950.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(compute_risk(&[], &[], &[], 0.0).is_err());
    }
}
