pub mod inputs;
pub mod progress;
pub mod projection;
pub mod risk;
pub mod sampling;
pub mod scenarios;
pub mod simulation;
pub mod statistics;
pub mod trial;

pub use inputs::{
    create_default_uncertainty_parameters, BaseState, Distribution, SimulationConfig,
    UncertaintyParameters,
};
pub use progress::{CancellationToken, NoProgress, ProgressSink};
pub use projection::{
    amortization_schedule, monthly_payment, project, AmortizationSchedule, AmortizationYear,
    YearRecord,
};
pub use risk::RiskMetrics;
pub use sampling::{sample, sample_parameters, SampledParameters};
pub use scenarios::{Scenario, ScenarioSet};
pub use simulation::{
    expected_case_projection, run_monte_carlo_simulation,
    run_monte_carlo_simulation_with_progress, SimulationResult,
};
pub use statistics::{HistogramBin, MetricDistribution};
pub use trial::{run_trial, TrialOutcome};

#[cfg(test)]
pub(crate) mod test_support {
    use super::inputs::{BaseState, Distribution, UncertaintyParameters};
    use super::sampling::SampledParameters;

    /// $400k purchase, 80% LTV at 6.5% over 30 years, $2,500/month rent.
    pub fn sample_base() -> BaseState {
        BaseState {
            purchase_price: 400_000.0,
            initial_monthly_rent: 2_500.0,
            annual_taxes: 4_800.0,
            annual_insurance: 1_500.0,
            annual_maintenance: 2_400.0,
            annual_management: 2_400.0,
            annual_capex: 1_800.0,
            loan_amount: 320_000.0,
            annual_interest_rate: 0.065,
            loan_term_months: 360,
            initial_investment: 80_000.0,
            projection_years: 10,
        }
    }

    pub fn fixed_params(base: &BaseState) -> SampledParameters {
        SampledParameters {
            initial_monthly_rent: base.initial_monthly_rent,
            rent_growth: 0.03,
            expense_growth: 0.02,
            appreciation_rate: 0.03,
            vacancy_rate: 0.05,
            maintenance_multiplier: 1.0,
            purchase_price: base.purchase_price,
            vacancy_clamped: false,
        }
    }

    /// Degenerate distributions matching [`fixed_params`].
    pub fn fixed_uncertainty(base: &BaseState) -> UncertaintyParameters {
        UncertaintyParameters {
            rent_growth: Distribution::fixed(0.03),
            initial_rent: Distribution::fixed(base.initial_monthly_rent),
            expense_growth: Distribution::fixed(0.02),
            appreciation_rate: Distribution::fixed(0.03),
            vacancy_rate: Distribution::fixed(0.05),
            maintenance_multiplier: Distribution::fixed(1.0),
            purchase_price: None,
        }
    }
}
