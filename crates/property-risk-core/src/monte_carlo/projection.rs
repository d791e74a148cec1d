use serde::{Deserialize, Serialize};

use super::inputs::{BaseState, MAX_PROJECTION_YEARS};
use super::sampling::SampledParameters;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One year of a projected pro forma.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// 1-based projection year
    pub year: u32,
    /// Scheduled annual rent before vacancy
    pub gross_rent: Money,
    /// Rent actually collected after vacancy
    pub effective_rent: Money,
    /// Operating expenses (taxes, insurance, management, capex, maintenance)
    pub expenses: Money,
    /// Net operating income
    pub noi: Money,
    /// Mortgage payments made during the year
    pub debt_service: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// Outstanding loan balance at year end
    pub loan_balance: Money,
    /// Property value at year end
    pub property_value: Money,
    /// NOI - debt service
    pub cash_flow: Money,
    /// Running sum of cash flow since acquisition
    pub cumulative_cash_flow: Money,
}

/// Year-by-year amortization summary for a loan, without any operating
/// assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub payments: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// Full amortization schedule aggregated by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub years: Vec<AmortizationYear>,
}

// ---------------------------------------------------------------------------
// Mortgage helpers
// ---------------------------------------------------------------------------

/// Standard fixed-rate mortgage payment: P * r / (1 - (1+r)^-n)
///
/// The discount factor is built from `ln_1p`/`exp_m1` so rates too small for
/// `(1+r)^n - 1` to resolve still give a finite payment; anything that does
/// not resolve falls back to straight-line amortisation.
pub fn monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    if principal <= 0.0 || term_months == 0 {
        return 0.0;
    }
    let months = term_months as f64;
    let straight_line = principal / months;
    let monthly_rate = annual_rate / 12.0;
    if monthly_rate == 0.0 {
        return straight_line;
    }
    let discount = -(-months * monthly_rate.ln_1p()).exp_m1();
    let payment = principal * monthly_rate / discount;
    if discount > 0.0 && payment.is_finite() {
        payment
    } else {
        straight_line
    }
}

/// Running state of an amortizing loan, advanced one month at a time.
#[derive(Debug, Clone, Copy)]
struct LoanState {
    balance: Money,
    payment: Money,
    monthly_rate: Rate,
    months_remaining: u32,
}

struct MonthStep {
    payment: Money,
    interest: Money,
    principal: Money,
}

impl LoanState {
    fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        LoanState {
            balance: principal.max(0.0),
            payment: monthly_payment(principal, annual_rate, term_months),
            monthly_rate: annual_rate / 12.0,
            months_remaining: term_months,
        }
    }

    /// Apply one monthly payment. Principal is clamped to [0, balance] so the
    /// balance never turns negative; once the term is over nothing is paid.
    fn step(&mut self) -> MonthStep {
        if self.months_remaining == 0 || self.balance <= 0.0 {
            return MonthStep {
                payment: 0.0,
                interest: 0.0,
                principal: 0.0,
            };
        }
        self.months_remaining -= 1;

        let interest = self.balance * self.monthly_rate;
        let mut principal = (self.payment - interest).clamp(0.0, self.balance);
        // Final scheduled payment retires whatever rounding left behind
        if self.months_remaining == 0 {
            principal = self.balance;
        }
        self.balance -= principal;

        MonthStep {
            payment: interest + principal,
            interest,
            principal,
        }
    }
}

/// Amortize a loan over its full term, aggregated by year.
pub fn amortization_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> AmortizationSchedule {
    let mut loan = LoanState::new(principal, annual_rate, term_months);
    let num_years = term_months.div_ceil(12);
    let mut years = Vec::with_capacity(num_years as usize);
    let mut total_interest = 0.0;

    for year in 1..=num_years {
        let mut row = AmortizationYear {
            year,
            payments: 0.0,
            interest: 0.0,
            principal: 0.0,
            ending_balance: 0.0,
        };
        for _ in 0..12 {
            let m = loan.step();
            row.payments += m.payment;
            row.interest += m.interest;
            row.principal += m.principal;
        }
        row.ending_balance = loan.balance;
        total_interest += row.interest;
        years.push(row);
    }

    AmortizationSchedule {
        monthly_payment: loan.payment,
        total_interest,
        years,
    }
}

// ---------------------------------------------------------------------------
// Pro forma
// ---------------------------------------------------------------------------

/// Project a year-by-year pro forma for one sampled parameter set.
///
/// Rent compounds from the sampled year-1 rent, expenses compound from the
/// base budget (maintenance scaled by the sampled multiplier), and the loan
/// amortizes month by month with its balance carried across years. Debt
/// service stops once the loan term is exhausted.
pub fn project(base: &BaseState, sampled: &SampledParameters, years: u32) -> Vec<YearRecord> {
    let mut records = Vec::with_capacity(years.min(MAX_PROJECTION_YEARS) as usize);
    let mut loan = LoanState::new(
        base.loan_amount,
        base.annual_interest_rate,
        base.loan_term_months,
    );

    let base_expenses = base.base_annual_expenses(sampled.maintenance_multiplier);
    let mut gross_rent = sampled.initial_monthly_rent * 12.0;
    let mut expenses = base_expenses;
    let mut property_value = sampled.purchase_price;
    let mut cumulative_cash_flow = 0.0;

    for year in 1..=years {
        if year > 1 {
            gross_rent *= 1.0 + sampled.rent_growth;
            expenses *= 1.0 + sampled.expense_growth;
        }
        property_value *= 1.0 + sampled.appreciation_rate;

        let effective_rent = gross_rent * (1.0 - sampled.vacancy_rate);
        let noi = effective_rent - expenses;

        let mut debt_service = 0.0;
        let mut interest_paid = 0.0;
        let mut principal_paid = 0.0;
        for _ in 0..12 {
            let m = loan.step();
            debt_service += m.payment;
            interest_paid += m.interest;
            principal_paid += m.principal;
        }

        let cash_flow = noi - debt_service;
        cumulative_cash_flow += cash_flow;

        records.push(YearRecord {
            year,
            gross_rent,
            effective_rent,
            expenses,
            noi,
            debt_service,
            interest_paid,
            principal_paid,
            loan_balance: loan.balance,
            property_value,
            cash_flow,
            cumulative_cash_flow,
        });
    }

    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::test_support::{fixed_params, sample_base};

    #[test]
    fn test_monthly_payment_reference() {
        // 320k at 6.5% over 30 years
        let pmt = monthly_payment(320_000.0, 0.065, 360);
        assert!((pmt - 2_022.62).abs() < 0.01, "pmt={pmt}");
    }

    #[test]
    fn test_monthly_payment_zero_rate_is_straight_line() {
        let pmt = monthly_payment(120_000.0, 0.0, 120);
        assert_eq!(pmt, 1_000.0);
    }

    #[test]
    fn test_monthly_payment_vanishing_rate_is_finite() {
        let pmt = monthly_payment(320_000.0, 1e-17, 360);
        assert!(pmt.is_finite());
        assert!((pmt - 320_000.0 / 360.0).abs() < 1e-6, "pmt={pmt}");

        let schedule = amortization_schedule(320_000.0, 1e-17, 360);
        // Principal amortizes evenly instead of being retired in month one
        assert!((schedule.years[0].principal - 320_000.0 / 30.0).abs() < 1e-6);
        assert!((schedule.years[1].principal - 320_000.0 / 30.0).abs() < 1e-6);
        let total: f64 = schedule.years.iter().map(|y| y.principal).sum();
        assert!((total - 320_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_monthly_payment_no_loan() {
        assert_eq!(monthly_payment(0.0, 0.065, 360), 0.0);
        assert_eq!(monthly_payment(100_000.0, 0.065, 0), 0.0);
    }

    #[test]
    fn test_full_term_principal_equals_loan() {
        let schedule = amortization_schedule(320_000.0, 0.065, 360);
        let principal: f64 = schedule.years.iter().map(|y| y.principal).sum();
        assert!(
            (principal - 320_000.0).abs() < 1e-6,
            "principal={principal}"
        );
        assert_eq!(schedule.years.len(), 30);
        assert_eq!(schedule.years.last().unwrap().ending_balance, 0.0);
    }

    #[test]
    fn test_schedule_interest_declines() {
        let schedule = amortization_schedule(320_000.0, 0.065, 360);
        let first = &schedule.years[0];
        let last = &schedule.years[29];
        assert!(first.interest > last.interest);
        assert!(first.principal < last.principal);
        // Total paid = principal + interest
        let paid: f64 = schedule.years.iter().map(|y| y.payments).sum();
        assert!((paid - (320_000.0 + schedule.total_interest)).abs() < 1e-4);
    }

    #[test]
    fn test_partial_final_year() {
        // 18-month loan: second year has only six payments
        let schedule = amortization_schedule(18_000.0, 0.0, 18);
        assert_eq!(schedule.years.len(), 2);
        assert_eq!(schedule.years[0].payments, 12_000.0);
        assert_eq!(schedule.years[1].payments, 6_000.0);
        assert_eq!(schedule.years[1].ending_balance, 0.0);
    }

    #[test]
    fn test_year_one_pro_forma() {
        let base = sample_base();
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 1);
        let y1 = &records[0];

        // 2,500 * 12 = 30,000 gross, 5% vacancy
        assert!((y1.gross_rent - 30_000.0).abs() < 1e-9);
        assert!((y1.effective_rent - 28_500.0).abs() < 1e-9);
        // 4,800 + 1,500 + 2,400 + 1,800 + 2,400 * 1.0
        assert!((y1.expenses - 12_900.0).abs() < 1e-9);
        assert!((y1.noi - 15_600.0).abs() < 1e-9);

        let pmt = monthly_payment(320_000.0, 0.065, 360);
        assert!((y1.debt_service - 12.0 * pmt).abs() < 1e-6);
        assert!((y1.cash_flow - (y1.noi - y1.debt_service)).abs() < 1e-9);
        assert!((y1.interest_paid + y1.principal_paid - y1.debt_service).abs() < 1e-6);
        assert!((y1.property_value - 400_000.0 * 1.03).abs() < 1e-6);
    }

    #[test]
    fn test_growth_compounds() {
        let base = sample_base();
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 3);
        let r3 = &records[2];
        assert!((r3.gross_rent - 30_000.0 * 1.03_f64.powi(2)).abs() < 1e-6);
        assert!((r3.expenses - 12_900.0 * 1.02_f64.powi(2)).abs() < 1e-6);
        assert!((r3.property_value - 400_000.0 * 1.03_f64.powi(3)).abs() < 1e-6);
    }

    #[test]
    fn test_balance_carried_between_years() {
        let base = sample_base();
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 5);
        let paid: f64 = records.iter().map(|r| r.principal_paid).sum();
        let last = records.last().unwrap();
        assert!((base.loan_amount - paid - last.loan_balance).abs() < 1e-6);
        for pair in records.windows(2) {
            assert!(pair[1].loan_balance < pair[0].loan_balance);
        }
    }

    #[test]
    fn test_debt_service_stops_after_term() {
        let mut base = sample_base();
        base.loan_term_months = 60;
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 8);

        for r in &records[..5] {
            assert!(r.debt_service > 0.0);
        }
        for r in &records[5..] {
            assert_eq!(r.debt_service, 0.0);
            assert_eq!(r.principal_paid, 0.0);
            assert_eq!(r.loan_balance, 0.0);
            assert_eq!(r.cash_flow, r.noi);
        }
        let paid: f64 = records.iter().map(|r| r.principal_paid).sum();
        assert!((paid - base.loan_amount).abs() < 1e-6);
    }

    #[test]
    fn test_all_cash_purchase() {
        let mut base = sample_base();
        base.loan_amount = 0.0;
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 3);
        for r in &records {
            assert_eq!(r.debt_service, 0.0);
            assert_eq!(r.principal_paid, 0.0);
        }
    }

    #[test]
    fn test_cumulative_cash_flow() {
        let base = sample_base();
        let sampled = fixed_params(&base);
        let records = project(&base, &sampled, 4);
        let total: f64 = records.iter().map(|r| r.cash_flow).sum();
        assert!((records[3].cumulative_cash_flow - total).abs() < 1e-9);
    }
}
