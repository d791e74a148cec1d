use serde::{Deserialize, Serialize};

use crate::error::PropertyRiskError;
use crate::types::{Money, Percent, Rate};
use crate::PropertyRiskResult;

/// Longest accepted amortization term (100 years).
pub const MAX_LOAN_TERM_MONTHS: u32 = 1_200;

/// Longest accepted projection horizon.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Largest accepted trial count.
pub const MAX_SIMULATIONS: u32 = 10_000_000;

// ---------------------------------------------------------------------------
// Base state
// ---------------------------------------------------------------------------

/// Fixed financial description of the property being simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseState {
    /// Acquisition price
    pub purchase_price: Money,
    /// Monthly rent at acquisition
    pub initial_monthly_rent: Money,
    /// Annual property taxes
    pub annual_taxes: Money,
    /// Annual insurance premium
    pub annual_insurance: Money,
    /// Annual maintenance budget (scaled by the sampled maintenance multiplier)
    pub annual_maintenance: Money,
    /// Annual property management fees
    pub annual_management: Money,
    /// Annual capital expenditure reserve
    pub annual_capex: Money,
    /// Mortgage principal
    pub loan_amount: Money,
    /// Annual mortgage interest rate (e.g. 0.065 = 6.5%)
    pub annual_interest_rate: Rate,
    /// Amortization term in months
    pub loan_term_months: u32,
    /// Total cash invested at acquisition (down payment plus closing costs)
    pub initial_investment: Money,
    /// Projection horizon in years
    pub projection_years: u32,
}

impl BaseState {
    /// Sum of the annual operating expense lines before any growth.
    pub fn base_annual_expenses(&self, maintenance_multiplier: f64) -> Money {
        self.annual_taxes
            + self.annual_insurance
            + self.annual_management
            + self.annual_capex
            + self.annual_maintenance * maintenance_multiplier
    }

    pub(crate) fn validate(&self) -> PropertyRiskResult<()> {
        if !(self.purchase_price.is_finite() && self.purchase_price > 0.0) {
            return Err(PropertyRiskError::invalid(
                "purchase_price",
                "Purchase price must be positive",
            ));
        }
        if !(self.initial_investment.is_finite() && self.initial_investment > 0.0) {
            return Err(PropertyRiskError::invalid(
                "initial_investment",
                "Initial investment must be positive",
            ));
        }
        if !(self.loan_amount.is_finite() && self.loan_amount >= 0.0) {
            return Err(PropertyRiskError::invalid(
                "loan_amount",
                "Loan amount cannot be negative",
            ));
        }
        if !(self.annual_interest_rate.is_finite() && self.annual_interest_rate >= 0.0) {
            return Err(PropertyRiskError::invalid(
                "annual_interest_rate",
                "Interest rate cannot be negative",
            ));
        }
        if self.loan_amount > 0.0 && self.loan_term_months == 0 {
            return Err(PropertyRiskError::invalid(
                "loan_term_months",
                "Loan term must be at least one month when a loan is present",
            ));
        }
        if self.loan_term_months > MAX_LOAN_TERM_MONTHS {
            return Err(PropertyRiskError::invalid(
                "loan_term_months",
                format!("Loan term cannot exceed {MAX_LOAN_TERM_MONTHS} months"),
            ));
        }

        let expense_lines = [
            ("initial_monthly_rent", self.initial_monthly_rent),
            ("annual_taxes", self.annual_taxes),
            ("annual_insurance", self.annual_insurance),
            ("annual_maintenance", self.annual_maintenance),
            ("annual_management", self.annual_management),
            ("annual_capex", self.annual_capex),
        ];
        for (field, value) in expense_lines {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PropertyRiskError::invalid(
                    field,
                    "Must be a finite, non-negative amount",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Probability distribution for one uncertain variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Distribution {
    Triangular { min: f64, mode: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
}

impl Distribution {
    /// A degenerate distribution that always samples `value`.
    pub fn fixed(value: f64) -> Self {
        Distribution::Triangular {
            min: value,
            mode: value,
            max: value,
        }
    }

    /// Analytic mean of the distribution.
    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            Distribution::Normal { mean, .. } => mean,
        }
    }

    /// Reject malformed parameters, naming `field` in the error.
    pub fn validate(&self, field: &str) -> PropertyRiskResult<()> {
        match *self {
            Distribution::Triangular { min, mode, max } => {
                if !(min.is_finite() && mode.is_finite() && max.is_finite()) {
                    return Err(PropertyRiskError::invalid(
                        field,
                        "Triangular parameters must be finite",
                    ));
                }
                if min > max {
                    return Err(PropertyRiskError::invalid(
                        field,
                        format!("Triangular min ({min}) exceeds max ({max})"),
                    ));
                }
                if mode < min || mode > max {
                    return Err(PropertyRiskError::invalid(
                        field,
                        format!("Triangular mode ({mode}) must lie within [{min}, {max}]"),
                    ));
                }
            }
            Distribution::Normal { mean, std_dev } => {
                if !(mean.is_finite() && std_dev.is_finite()) {
                    return Err(PropertyRiskError::invalid(
                        field,
                        "Normal parameters must be finite",
                    ));
                }
                if std_dev < 0.0 {
                    return Err(PropertyRiskError::invalid(
                        field,
                        format!("Normal std_dev ({std_dev}) cannot be negative"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The uncertain inputs of a trial, one distribution per variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyParameters {
    /// Annual rent growth rate
    pub rent_growth: Distribution,
    /// Monthly rent in year 1
    pub initial_rent: Distribution,
    /// Annual operating expense growth rate
    pub expense_growth: Distribution,
    /// Annual property appreciation rate
    pub appreciation_rate: Distribution,
    /// Vacancy and collection loss as a share of gross rent
    pub vacancy_rate: Distribution,
    /// Multiplier applied to the maintenance budget
    pub maintenance_multiplier: Distribution,
    /// Purchase price; the base price is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Distribution>,
}

impl UncertaintyParameters {
    pub(crate) fn validate(&self) -> PropertyRiskResult<()> {
        self.rent_growth.validate("rent_growth")?;
        self.initial_rent.validate("initial_rent")?;
        self.expense_growth.validate("expense_growth")?;
        self.appreciation_rate.validate("appreciation_rate")?;
        self.vacancy_rate.validate("vacancy_rate")?;
        self.maintenance_multiplier.validate("maintenance_multiplier")?;
        if let Some(price) = &self.purchase_price {
            price.validate("purchase_price")?;
        }
        Ok(())
    }
}

/// Derive market-typical uncertainty ranges around a base state.
///
/// Rent growth and expense growth centre on 3% a year, appreciation on 3.5%
/// with a 2.5% standard deviation, vacancy on 5% with a long right tail up to
/// 12%. Year-1 rent can land 10% below or 5% above the quoted rent. The
/// purchase price is left fixed at the base price.
pub fn create_default_uncertainty_parameters(base: &BaseState) -> UncertaintyParameters {
    let rent = base.initial_monthly_rent;
    UncertaintyParameters {
        rent_growth: Distribution::Triangular {
            min: -0.02,
            mode: 0.03,
            max: 0.06,
        },
        initial_rent: Distribution::Triangular {
            min: rent * 0.90,
            mode: rent,
            max: rent * 1.05,
        },
        expense_growth: Distribution::Triangular {
            min: 0.01,
            mode: 0.03,
            max: 0.05,
        },
        appreciation_rate: Distribution::Normal {
            mean: 0.035,
            std_dev: 0.025,
        },
        vacancy_rate: Distribution::Triangular {
            min: 0.0,
            mode: 0.05,
            max: 0.12,
        },
        maintenance_multiplier: Distribution::Triangular {
            min: 0.8,
            mode: 1.0,
            max: 1.5,
        },
        purchase_price: None,
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

/// Top-level input for a property risk simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub base_state: BaseState,
    /// Uncertainty ranges; derived from the base state when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyParameters>,
    /// Number of trials (minimum 1).
    #[serde(default = "default_simulations")]
    pub simulations: u32,
    /// Projection horizon; `base_state.projection_years` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    /// Optional seed for reproducibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Target return for Sharpe / Sortino, in percent.
    #[serde(default)]
    pub risk_free_rate: Percent,
    /// Trials per chunk between progress reports.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
}

fn default_simulations() -> u32 {
    10_000
}

fn default_chunk_size() -> u32 {
    250
}

impl SimulationConfig {
    pub fn new(base_state: BaseState) -> Self {
        SimulationConfig {
            base_state,
            uncertainty: None,
            simulations: default_simulations(),
            years: None,
            seed: None,
            risk_free_rate: 0.0,
            chunk_size: default_chunk_size(),
        }
    }

    /// Horizon actually simulated.
    pub fn effective_years(&self) -> u32 {
        self.years.unwrap_or(self.base_state.projection_years)
    }

    /// Uncertainty ranges actually simulated.
    pub fn effective_uncertainty(&self) -> UncertaintyParameters {
        self.uncertainty
            .clone()
            .unwrap_or_else(|| create_default_uncertainty_parameters(&self.base_state))
    }

    /// Check every input before any trial runs.
    pub fn validate(&self) -> PropertyRiskResult<()> {
        if self.simulations < 1 {
            return Err(PropertyRiskError::invalid("simulations", "Must be at least 1"));
        }
        if self.simulations > MAX_SIMULATIONS {
            return Err(PropertyRiskError::invalid(
                "simulations",
                format!("Cannot exceed {MAX_SIMULATIONS}"),
            ));
        }
        let years = self.effective_years();
        if years < 1 {
            return Err(PropertyRiskError::invalid("years", "Must be at least 1"));
        }
        if years > MAX_PROJECTION_YEARS {
            return Err(PropertyRiskError::invalid(
                "years",
                format!("Cannot exceed {MAX_PROJECTION_YEARS}"),
            ));
        }
        if self.chunk_size < 1 {
            return Err(PropertyRiskError::invalid("chunk_size", "Must be at least 1"));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PropertyRiskError::invalid("risk_free_rate", "Must be finite"));
        }
        self.base_state.validate()?;
        if let Some(u) = &self.uncertainty {
            u.validate()?;
        }
        Ok(())
    }
}
