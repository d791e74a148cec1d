use rand::Rng;
use serde::{Deserialize, Serialize};

use super::inputs::{BaseState, Distribution, UncertaintyParameters};
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Scalar sampling
// ---------------------------------------------------------------------------

/// Sample a single value from the given distribution using the provided RNG.
///
/// Triangular draws use the inverse CDF and always land in `[min, max]`.
/// Normal draws use the Box–Muller transform on two uniforms. Degenerate
/// distributions return their fixed point without consuming extra precision.
pub fn sample<R: Rng + ?Sized>(dist: &Distribution, rng: &mut R) -> f64 {
    match *dist {
        Distribution::Triangular { min, mode, max } => {
            let u: f64 = rng.gen();
            triangular_inverse_cdf(min, mode, max, u)
        }
        Distribution::Normal { mean, std_dev } => {
            // 1 - [0, 1) = (0, 1], so ln(u1) is finite
            let u1: f64 = 1.0 - rng.gen::<f64>();
            let u2: f64 = rng.gen();
            if std_dev == 0.0 {
                return mean;
            }
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            mean + std_dev * z
        }
    }
}

/// Inverse CDF of the triangular distribution at `u` in `[0, 1]`.
fn triangular_inverse_cdf(min: f64, mode: f64, max: f64, u: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        return min;
    }
    let split = (mode - min) / range;
    let x = if u < split {
        min + (u * range * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * range * (max - mode)).sqrt()
    };
    x.clamp(min, max)
}

// ---------------------------------------------------------------------------
// Per-trial parameter draw
// ---------------------------------------------------------------------------

/// One draw of every uncertain variable, after physical floors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledParameters {
    /// Year-1 monthly rent (floored at 0)
    pub initial_monthly_rent: Money,
    /// Floored at -100%
    pub rent_growth: Rate,
    /// Floored at -100%
    pub expense_growth: Rate,
    /// Floored at -100%
    pub appreciation_rate: Rate,
    /// Clamped to [0, 1]
    pub vacancy_rate: Rate,
    /// Floored at 0
    pub maintenance_multiplier: f64,
    /// Floored at 0
    pub purchase_price: Money,
    /// True when the raw vacancy draw fell outside [0, 1]
    pub vacancy_clamped: bool,
}

impl SampledParameters {
    /// The deterministic parameter set at each distribution's mean.
    pub fn at_means(base: &BaseState, params: &UncertaintyParameters) -> Self {
        Self::from_raw(
            base,
            RawDraw {
                initial_rent: params.initial_rent.mean(),
                rent_growth: params.rent_growth.mean(),
                expense_growth: params.expense_growth.mean(),
                appreciation_rate: params.appreciation_rate.mean(),
                vacancy_rate: params.vacancy_rate.mean(),
                maintenance_multiplier: params.maintenance_multiplier.mean(),
                purchase_price: params.purchase_price.as_ref().map(Distribution::mean),
            },
        )
    }

    fn from_raw(base: &BaseState, raw: RawDraw) -> Self {
        SampledParameters {
            initial_monthly_rent: raw.initial_rent.max(0.0),
            rent_growth: raw.rent_growth.max(-1.0),
            expense_growth: raw.expense_growth.max(-1.0),
            appreciation_rate: raw.appreciation_rate.max(-1.0),
            vacancy_rate: raw.vacancy_rate.clamp(0.0, 1.0),
            maintenance_multiplier: raw.maintenance_multiplier.max(0.0),
            purchase_price: raw.purchase_price.unwrap_or(base.purchase_price).max(0.0),
            vacancy_clamped: !(0.0..=1.0).contains(&raw.vacancy_rate),
        }
    }
}

struct RawDraw {
    initial_rent: f64,
    rent_growth: f64,
    expense_growth: f64,
    appreciation_rate: f64,
    vacancy_rate: f64,
    maintenance_multiplier: f64,
    purchase_price: Option<f64>,
}

/// Draw one value per uncertain variable.
///
/// The draw order is fixed (initial rent, rent growth, expense growth,
/// appreciation, vacancy, maintenance multiplier, purchase price) so a seeded
/// generator reproduces the same trial. Normal draws can leave the physical
/// domain of a variable; those are truncated rather than redrawn: vacancy to
/// [0, 1], growth and appreciation rates to at least -100%, and rent,
/// maintenance multiplier and price to at least zero.
pub fn sample_parameters<R: Rng + ?Sized>(
    base: &BaseState,
    params: &UncertaintyParameters,
    rng: &mut R,
) -> SampledParameters {
    let raw = RawDraw {
        initial_rent: sample(&params.initial_rent, rng),
        rent_growth: sample(&params.rent_growth, rng),
        expense_growth: sample(&params.expense_growth, rng),
        appreciation_rate: sample(&params.appreciation_rate, rng),
        vacancy_rate: sample(&params.vacancy_rate, rng),
        maintenance_multiplier: sample(&params.maintenance_multiplier, rng),
        purchase_price: params.purchase_price.as_ref().map(|d| sample(d, rng)),
    };
    SampledParameters::from_raw(base, raw)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::inputs::create_default_uncertainty_parameters;
    use crate::monte_carlo::test_support::sample_base;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::Triangular;
    use statrs::statistics::Distribution as _;

    const SEED: u64 = 42;

    #[test]
    fn test_triangular_bounds_and_mean() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let dist = Distribution::Triangular {
            min: 1.0,
            mode: 2.0,
            max: 5.0,
        };
        let n = 100_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let x = sample(&dist, &mut rng);
            assert!((1.0..=5.0).contains(&x), "x={x} out of bounds");
            sum += x;
        }
        let mean = sum / n as f64;
        let analytic = Triangular::new(1.0, 5.0, 2.0).unwrap().mean().unwrap();
        assert!((analytic - 8.0 / 3.0).abs() < 1e-12);
        assert!(
            (mean - analytic).abs() < 0.02,
            "mean={mean}, expected={analytic}"
        );
    }

    #[test]
    fn test_inverse_cdf_endpoints() {
        assert_eq!(triangular_inverse_cdf(1.0, 2.0, 5.0, 0.0), 1.0);
        assert_eq!(triangular_inverse_cdf(1.0, 2.0, 5.0, 1.0), 5.0);
        // u at the split point lands on the mode
        let split = (2.0 - 1.0) / (5.0 - 1.0);
        assert!((triangular_inverse_cdf(1.0, 2.0, 5.0, split) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_cdf_mode_at_edges() {
        // Right-angled triangles must not divide by zero
        for u in [0.0, 0.3, 0.999] {
            let x = triangular_inverse_cdf(0.0, 0.0, 1.0, u);
            assert!((0.0..=1.0).contains(&x));
            let y = triangular_inverse_cdf(0.0, 1.0, 1.0, u);
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn test_degenerate_triangular_returns_fixed_point() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let dist = Distribution::fixed(0.042);
        for _ in 0..1_000 {
            assert_eq!(sample(&dist, &mut rng), 0.042);
        }
    }

    #[test]
    fn test_zero_std_dev_normal_returns_mean() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let dist = Distribution::Normal {
            mean: 0.035,
            std_dev: 0.0,
        };
        for _ in 0..1_000 {
            assert_eq!(sample(&dist, &mut rng), 0.035);
        }
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let dist = Distribution::Normal {
            mean: 100.0,
            std_dev: 10.0,
        };
        let n = 50_000;
        let draws: Vec<f64> = (0..n).map(|_| sample(&dist, &mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 100.0).abs() < 0.5, "mean={mean}");
        assert!((var.sqrt() - 10.0).abs() < 0.5, "std_dev={}", var.sqrt());
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let dist = Distribution::Normal {
            mean: 0.0,
            std_dev: 1.0,
        };
        let mut a = StdRng::seed_from_u64(SEED);
        let mut b = StdRng::seed_from_u64(SEED);
        for _ in 0..100 {
            assert_eq!(
                sample(&dist, &mut a).to_bits(),
                sample(&dist, &mut b).to_bits()
            );
        }
    }

    #[test]
    fn test_vacancy_clamped_to_zero() {
        let base = sample_base();
        let mut params = create_default_uncertainty_parameters(&base);
        params.vacancy_rate = Distribution::fixed(-0.10);
        let mut rng = StdRng::seed_from_u64(SEED);
        let s = sample_parameters(&base, &params, &mut rng);
        assert_eq!(s.vacancy_rate, 0.0);
        assert!(s.vacancy_clamped);
    }

    #[test]
    fn test_appreciation_floored_at_total_loss() {
        let base = sample_base();
        let mut params = create_default_uncertainty_parameters(&base);
        params.appreciation_rate = Distribution::fixed(-1.7);
        let mut rng = StdRng::seed_from_u64(SEED);
        let s = sample_parameters(&base, &params, &mut rng);
        assert_eq!(s.appreciation_rate, -1.0);
    }

    #[test]
    fn test_purchase_price_defaults_to_base() {
        let base = sample_base();
        let params = create_default_uncertainty_parameters(&base);
        let mut rng = StdRng::seed_from_u64(SEED);
        let s = sample_parameters(&base, &params, &mut rng);
        assert_eq!(s.purchase_price, base.purchase_price);
    }

    #[test]
    fn test_at_means_uses_distribution_means() {
        let base = sample_base();
        let params = create_default_uncertainty_parameters(&base);
        let s = SampledParameters::at_means(&base, &params);
        assert!((s.vacancy_rate - 0.17 / 3.0).abs() < 1e-12);
        assert_eq!(s.appreciation_rate, 0.035);
        assert!(!s.vacancy_clamped);
    }
}
