use serde::{Deserialize, Serialize};

use crate::error::PropertyRiskError;
use crate::PropertyRiskResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Distribution summary for one simulated metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// A single histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sorted copy of the samples (IEEE total order).
pub fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Compute the percentile value from a **sorted** slice using linear
/// interpolation between the closest ranks (type 7).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    if lower == upper {
        return lo;
    }
    // Stays within [lo, hi] so percentiles never cross
    let frac = rank - lower as f64;
    (lo + (hi - lo) * frac).max(lo).min(hi)
}

/// Mean and population standard deviation in one pass (Welford).
pub fn mean_and_std_dev(samples: &[f64]) -> (f64, f64) {
    let mut count = 0.0_f64;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;
    for &x in samples {
        count += 1.0;
        let delta = x - mean;
        mean += delta / count;
        m2 += delta * (x - mean);
    }
    if count == 0.0 {
        return (0.0, 0.0);
    }
    (mean, (m2 / count).max(0.0).sqrt())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reduce a raw sample population to its distribution summary.
pub fn reduce(samples: &[f64]) -> PropertyRiskResult<MetricDistribution> {
    if samples.is_empty() {
        return Err(PropertyRiskError::InsufficientData(
            "Cannot summarise an empty sample population".into(),
        ));
    }
    let sorted = sorted_copy(samples);
    let (mean, std_dev) = mean_and_std_dev(samples);

    Ok(MetricDistribution {
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p10: percentile_sorted(&sorted, 10.0),
        p25: percentile_sorted(&sorted, 25.0),
        p50: percentile_sorted(&sorted, 50.0),
        p75: percentile_sorted(&sorted, 75.0),
        p90: percentile_sorted(&sorted, 90.0),
    })
}

/// Build a histogram with `num_bins` equal-width bins.
pub fn histogram(samples: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    if samples.is_empty() || num_bins == 0 {
        return Vec::new();
    }
    let sorted = sorted_copy(samples);
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];

    // Handle case where all values are the same
    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| {
            let lower = min_val + i as f64 * bin_width;
            let upper = if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            };
            HistogramBin {
                lower,
                upper,
                count: 0,
                frequency: 0.0,
            }
        })
        .collect();

    for &val in &sorted {
        let idx = (((val - min_val) / bin_width).floor() as usize).min(num_bins - 1);
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
