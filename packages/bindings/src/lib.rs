use napi::bindgen_prelude::AsyncTask;
use napi::{Env, Result as NapiResult, Task};
use napi_derive::napi;

use property_risk_core::monte_carlo::inputs::MAX_LOAN_TERM_MONTHS;
use property_risk_core::monte_carlo::{self, BaseState, SimulationConfig, SimulationResult};
use property_risk_core::reporting;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn simulate_json(config_json: &str) -> NapiResult<String> {
    let config: SimulationConfig = serde_json::from_str(config_json).map_err(to_napi_error)?;
    let result = monte_carlo::run_monte_carlo_simulation(&config).map_err(to_napi_error)?;
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn run_monte_carlo_simulation(config_json: String) -> NapiResult<String> {
    simulate_json(&config_json)
}

/// Simulation run on the libuv thread pool; resolves with the result JSON.
pub struct SimulationTask {
    config_json: String,
}

impl Task for SimulationTask {
    type Output = String;
    type JsValue = String;

    fn compute(&mut self) -> NapiResult<Self::Output> {
        simulate_json(&self.config_json)
    }

    fn resolve(&mut self, _env: Env, output: Self::Output) -> NapiResult<Self::JsValue> {
        Ok(output)
    }
}

#[napi(ts_return_type = "Promise<string>")]
pub fn run_monte_carlo_simulation_async(config_json: String) -> AsyncTask<SimulationTask> {
    AsyncTask::new(SimulationTask { config_json })
}

#[napi]
pub fn create_default_uncertainty_parameters(base_state_json: String) -> NapiResult<String> {
    let base: BaseState = serde_json::from_str(&base_state_json).map_err(to_napi_error)?;
    let params = monte_carlo::create_default_uncertainty_parameters(&base);
    serde_json::to_string(&params).map_err(to_napi_error)
}

#[napi]
pub fn expected_case_projection(config_json: String) -> NapiResult<String> {
    let config: SimulationConfig = serde_json::from_str(&config_json).map_err(to_napi_error)?;
    let records = monte_carlo::expected_case_projection(&config).map_err(to_napi_error)?;
    serde_json::to_string(&records).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
) -> NapiResult<String> {
    if term_months > MAX_LOAN_TERM_MONTHS {
        return Err(to_napi_error(format!(
            "termMonths cannot exceed {MAX_LOAN_TERM_MONTHS}"
        )));
    }
    let schedule = monte_carlo::amortization_schedule(principal, annual_rate, term_months);
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_summary_text(result_json: String) -> NapiResult<String> {
    let result: SimulationResult = serde_json::from_str(&result_json).map_err(to_napi_error)?;
    Ok(reporting::generate_summary_text(&result))
}

#[napi]
pub fn format_currency(value: f64) -> String {
    reporting::format_currency(value)
}

#[napi]
pub fn format_percentage(value: f64) -> String {
    reporting::format_percentage(value)
}
