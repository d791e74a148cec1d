use clap::Args;
use serde_json::Value;

use property_risk_core::monte_carlo::amortization_schedule;
use property_risk_core::monte_carlo::inputs::MAX_LOAN_TERM_MONTHS;

/// Arguments for a loan amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: f64,

    /// Annual interest rate as a decimal (0.065 = 6.5%)
    #[arg(long)]
    pub rate: f64,

    /// Term in months
    #[arg(long, default_value_t = 360)]
    pub term_months: u32,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if !(args.principal.is_finite() && args.principal >= 0.0) {
        return Err("--principal must be a finite, non-negative amount".into());
    }
    if !(args.rate.is_finite() && args.rate >= 0.0) {
        return Err("--rate cannot be negative".into());
    }
    if args.term_months == 0 {
        return Err("--term-months must be at least 1".into());
    }
    if args.term_months > MAX_LOAN_TERM_MONTHS {
        return Err(format!("--term-months cannot exceed {MAX_LOAN_TERM_MONTHS}").into());
    }
    let schedule = amortization_schedule(args.principal, args.rate, args.term_months);
    Ok(serde_json::to_value(schedule)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_json_shape() {
        let value = run_amortize(AmortizeArgs {
            principal: 320_000.0,
            rate: 0.065,
            term_months: 360,
        })
        .unwrap();
        let pmt = value["monthly_payment"].as_f64().unwrap();
        assert!((pmt - 2_022.62).abs() < 0.01);
        assert_eq!(value["years"].as_array().unwrap().len(), 30);
    }

    #[test]
    fn test_rejects_zero_term() {
        let err = run_amortize(AmortizeArgs {
            principal: 100_000.0,
            rate: 0.05,
            term_months: 0,
        })
        .unwrap_err();
        assert!(err.to_string().contains("term-months"));
    }

    #[test]
    fn test_rejects_overlong_term() {
        let err = run_amortize(AmortizeArgs {
            principal: 100_000.0,
            rate: 0.05,
            term_months: u32::MAX,
        })
        .unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }
}
