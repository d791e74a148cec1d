use property_risk_core::monte_carlo::{
    amortization_schedule, expected_case_projection, monthly_payment, project, BaseState,
    SampledParameters, SimulationConfig,
};

fn base_state() -> BaseState {
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

fn flat_params(base: &BaseState) -> SampledParameters {
    SampledParameters {
        initial_monthly_rent: base.initial_monthly_rent,
        rent_growth: 0.0,
        expense_growth: 0.0,
        appreciation_rate: 0.0,
        vacancy_rate: 0.0,
        maintenance_multiplier: 1.0,
        purchase_price: base.purchase_price,
        vacancy_clamped: false,
    }
}

// ===========================================================================
// Amortization
// ===========================================================================

#[test]
fn test_monthly_payment_30yr_mortgage() {
    let pmt = monthly_payment(320_000.0, 0.065, 360);
    assert!((pmt - 2_022.62).abs() < 0.01, "payment {pmt}");
}

#[test]
fn test_full_term_principal_sums_to_loan() {
    let schedule = amortization_schedule(320_000.0, 0.065, 360);
    assert_eq!(schedule.years.len(), 30);
    let principal: f64 = schedule.years.iter().map(|y| y.principal).sum();
    assert!((principal - 320_000.0).abs() < 1e-6);
    let last = schedule.years.last().unwrap();
    assert!(last.ending_balance.abs() < 1e-6);
    // Total paid = principal + interest
    let paid: f64 = schedule.years.iter().map(|y| y.payments).sum();
    assert!((paid - (320_000.0 + schedule.total_interest)).abs() < 1e-4);
}

#[test]
fn test_interest_share_falls_over_time() {
    let schedule = amortization_schedule(320_000.0, 0.065, 360);
    let first = &schedule.years[0];
    let last = &schedule.years[29];
    assert!(first.interest > first.principal);
    assert!(last.interest < last.principal);
}

#[test]
fn test_zero_rate_loan_is_straight_line() {
    let pmt = monthly_payment(120_000.0, 0.0, 120);
    assert!((pmt - 1_000.0).abs() < 1e-9);
    let schedule = amortization_schedule(120_000.0, 0.0, 120);
    assert_eq!(schedule.total_interest, 0.0);
    for y in &schedule.years {
        assert!((y.principal - 12_000.0).abs() < 1e-6);
    }
}

// ===========================================================================
// Pro forma
// ===========================================================================

#[test]
fn test_flat_projection_repeats_year_one() {
    let base = base_state();
    let records = project(&base, &flat_params(&base), 5);
    assert_eq!(records.len(), 5);
    for r in &records {
        assert!((r.gross_rent - 30_000.0).abs() < 1e-9);
        assert!((r.expenses - 12_900.0).abs() < 1e-9);
        assert!((r.noi - 17_100.0).abs() < 1e-9);
        assert!((r.property_value - 400_000.0).abs() < 1e-9);
    }
    // Cumulative cash flow is the running sum
    let sum: f64 = records.iter().map(|r| r.cash_flow).sum();
    assert!((records[4].cumulative_cash_flow - sum).abs() < 1e-6);
}

#[test]
fn test_debt_service_stops_after_term() {
    let mut base = base_state();
    base.loan_term_months = 24;
    let records = project(&base, &flat_params(&base), 4);
    assert!(records[1].debt_service > 0.0);
    assert!(records[1].loan_balance.abs() < 1e-6);
    assert_eq!(records[2].debt_service, 0.0);
    assert_eq!(records[3].debt_service, 0.0);
}

#[test]
fn test_expected_case_uses_distribution_means() {
    let config = SimulationConfig::new(base_state());
    let records = expected_case_projection(&config).unwrap();
    assert_eq!(records.len(), 10);
    // Default year-1 rent is Tri(0.90R, R, 1.05R), mean 0.9833R
    let expected_rent = 2_500.0 * (0.90 + 1.0 + 1.05) / 3.0 * 12.0;
    assert!((records[0].gross_rent - expected_rent).abs() < 1e-6);
}

#[test]
fn test_expected_case_rejects_invalid_config() {
    let mut config = SimulationConfig::new(base_state());
    config.years = Some(0);
    assert!(expected_case_projection(&config).is_err());
}
