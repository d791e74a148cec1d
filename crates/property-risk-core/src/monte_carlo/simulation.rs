use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::inputs::{BaseState, SimulationConfig, UncertaintyParameters};
use super::progress::{CancellationToken, NoProgress, ProgressSink};
use super::projection::{project, YearRecord};
use super::risk::{compute_risk, RiskMetrics};
use super::sampling::{sample_parameters, SampledParameters};
use super::scenarios::{select_scenarios, ScenarioSet};
use super::statistics::{histogram, reduce, HistogramBin, MetricDistribution};
use super::trial::{evaluate_trial, TrialOutcome};
use crate::error::PropertyRiskError;
use crate::types::RunMetadata;
use crate::PropertyRiskResult;

const HISTOGRAM_BINS: usize = 20;

/// Share of trials with a clamped vacancy draw above which a warning is raised.
const VACANCY_CLAMP_WARNING_SHARE: f64 = 0.05;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Output of a property risk simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Compound annual return on the initial investment, in percent
    pub annualized_return: MetricDistribution,
    /// Cash flow + appreciation + principal paydown over the horizon
    pub total_return: MetricDistribution,
    pub total_cash_flow: MetricDistribution,
    pub final_equity: MetricDistribution,
    pub total_appreciation: MetricDistribution,
    pub total_principal_paydown: MetricDistribution,
    pub risk_metrics: RiskMetrics,
    pub scenarios: ScenarioSet,
    /// 20-bin histogram of annualized return
    pub annualized_return_histogram: Vec<HistogramBin>,
    /// Deterministic pro forma at each distribution's mean
    pub expected_case: Vec<YearRecord>,
    pub warnings: Vec<String>,
    pub metadata: RunMetadata,
}

/// Per-metric sample arrays, one entry per trial in trial order.
#[derive(Debug, Default)]
struct TrialSamples {
    total_cash_flow: Vec<f64>,
    total_principal_paydown: Vec<f64>,
    total_appreciation: Vec<f64>,
    final_equity: Vec<f64>,
    total_return: Vec<f64>,
    annualized_return: Vec<f64>,
    max_drawdown: Vec<f64>,
    vacancy_clamped: u32,
}

impl TrialSamples {
    /// Reserve room for `n` trials up front; an allocation the host cannot
    /// satisfy is reported instead of aborting the process.
    fn try_with_capacity(n: usize) -> PropertyRiskResult<Self> {
        let mut samples = TrialSamples::default();
        for column in [
            &mut samples.total_cash_flow,
            &mut samples.total_principal_paydown,
            &mut samples.total_appreciation,
            &mut samples.final_equity,
            &mut samples.total_return,
            &mut samples.annualized_return,
            &mut samples.max_drawdown,
        ] {
            column.try_reserve_exact(n).map_err(|e| {
                PropertyRiskError::Unrecoverable(format!(
                    "Cannot allocate sample storage for {n} trials: {e}"
                ))
            })?;
        }
        Ok(samples)
    }

    fn len(&self) -> usize {
        self.total_return.len()
    }

    fn push(&mut self, o: &TrialOutcome) {
        self.total_cash_flow.push(o.total_cash_flow);
        self.total_principal_paydown.push(o.total_principal_paydown);
        self.total_appreciation.push(o.total_appreciation);
        self.final_equity.push(o.final_equity);
        self.total_return.push(o.total_return);
        self.annualized_return.push(o.annualized_return);
        self.max_drawdown.push(o.max_drawdown);
    }

    fn append(&mut self, mut other: TrialSamples) {
        self.total_cash_flow.append(&mut other.total_cash_flow);
        self.total_principal_paydown
            .append(&mut other.total_principal_paydown);
        self.total_appreciation.append(&mut other.total_appreciation);
        self.final_equity.append(&mut other.final_equity);
        self.total_return.append(&mut other.total_return);
        self.annualized_return.append(&mut other.annualized_return);
        self.max_drawdown.append(&mut other.max_drawdown);
        self.vacancy_clamped += other.vacancy_clamped;
    }

    /// Rebuild the outcome of trial `i` from the metric arrays.
    fn outcome_at(&self, i: usize) -> TrialOutcome {
        TrialOutcome {
            total_cash_flow: self.total_cash_flow[i],
            total_principal_paydown: self.total_principal_paydown[i],
            total_appreciation: self.total_appreciation[i],
            final_equity: self.final_equity[i],
            total_return: self.total_return[i],
            annualized_return: self.annualized_return[i],
            max_drawdown: self.max_drawdown[i],
        }
    }
}

/// Shared, read-only inputs of every trial in a run.
struct TrialContext<'a> {
    base: &'a BaseState,
    params: &'a UncertaintyParameters,
    years: u32,
}

/// A contiguous block of trials with its own generator seed.
#[derive(Debug, Clone, Copy)]
struct ChunkPlan {
    index: usize,
    seed: u64,
    trials: u32,
}

// ---------------------------------------------------------------------------
// Chunk planning and execution
// ---------------------------------------------------------------------------

/// Split the run into chunks, drawing each chunk's seed in order from the
/// master generator. Chunk results therefore do not depend on which thread
/// runs them.
fn plan_chunks(master_seed: u64, simulations: u32, chunk_size: u32) -> Vec<ChunkPlan> {
    let mut master = StdRng::seed_from_u64(master_seed);
    let num_chunks = simulations.div_ceil(chunk_size);
    (0..num_chunks)
        .map(|i| {
            let done = i * chunk_size;
            ChunkPlan {
                index: i as usize,
                seed: master.next_u64(),
                trials: chunk_size.min(simulations - done),
            }
        })
        .collect()
}

fn run_chunk(ctx: &TrialContext<'_>, plan: &ChunkPlan) -> PropertyRiskResult<TrialSamples> {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut samples = TrialSamples::try_with_capacity(plan.trials as usize)?;
    for _ in 0..plan.trials {
        let sampled = sample_parameters(ctx.base, ctx.params, &mut rng);
        if sampled.vacancy_clamped {
            samples.vacancy_clamped += 1;
        }
        let outcome = evaluate_trial(ctx.base, &sampled, ctx.years)?;
        samples.push(&outcome);
    }
    Ok(samples)
}

fn check_cancelled(
    cancel: Option<&CancellationToken>,
    completed: u32,
    total: u32,
) -> PropertyRiskResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => {
            info!(completed, total, "simulation cancelled");
            Err(PropertyRiskError::Cancelled { completed, total })
        }
        _ => Ok(()),
    }
}

fn percent_complete(completed: u32, total: u32) -> f64 {
    completed as f64 / total as f64 * 100.0
}

#[cfg(not(feature = "parallel"))]
fn execute_chunks<S: ProgressSink + ?Sized>(
    ctx: &TrialContext<'_>,
    plans: &[ChunkPlan],
    total: u32,
    progress: &mut S,
    cancel: Option<&CancellationToken>,
) -> PropertyRiskResult<TrialSamples> {
    let mut samples = TrialSamples::try_with_capacity(total as usize)?;
    let mut completed = 0u32;

    for plan in plans {
        check_cancelled(cancel, completed, total)?;
        samples.append(run_chunk(ctx, plan)?);
        completed += plan.trials;
        debug!(chunk = plan.index, completed, total, "chunk complete");
        progress.report(percent_complete(completed, total));
    }

    Ok(samples)
}

/// Runs one wave of chunks per rayon worker at a time. Progress and
/// cancellation are handled on the calling thread between waves, so the sink
/// never crosses threads.
#[cfg(feature = "parallel")]
fn execute_chunks<S: ProgressSink + ?Sized>(
    ctx: &TrialContext<'_>,
    plans: &[ChunkPlan],
    total: u32,
    progress: &mut S,
    cancel: Option<&CancellationToken>,
) -> PropertyRiskResult<TrialSamples> {
    use rayon::prelude::*;

    let wave = rayon::current_num_threads().max(1);
    let mut samples = TrialSamples::try_with_capacity(total as usize)?;
    let mut completed = 0u32;

    for group in plans.chunks(wave) {
        check_cancelled(cancel, completed, total)?;
        let results: Vec<PropertyRiskResult<TrialSamples>> =
            group.par_iter().map(|plan| run_chunk(ctx, plan)).collect();
        for chunk in results {
            let chunk = chunk?;
            completed += chunk.len() as u32;
            samples.append(chunk);
        }
        debug!(
            first_chunk = group[0].index,
            chunks = group.len(),
            completed,
            total,
            "wave complete"
        );
        progress.report(percent_complete(completed, total));
    }

    Ok(samples)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a Monte Carlo risk simulation for a rental property.
///
/// Each trial samples every uncertain variable, projects the loan and
/// operating cash flows over the horizon and records its totals. The
/// populations are reduced to percentile distributions, risk metrics and
/// representative scenarios. All inputs are validated before any trial runs.
pub fn run_monte_carlo_simulation(
    config: &SimulationConfig,
) -> PropertyRiskResult<SimulationResult> {
    run_monte_carlo_simulation_with_progress(config, &mut NoProgress, None)
}

/// [`run_monte_carlo_simulation`] with progress reports after every chunk
/// and cooperative cancellation between chunks. A cancelled run returns
/// [`PropertyRiskError::Cancelled`] and no partial result.
pub fn run_monte_carlo_simulation_with_progress<S: ProgressSink + ?Sized>(
    config: &SimulationConfig,
    progress: &mut S,
    cancel: Option<&CancellationToken>,
) -> PropertyRiskResult<SimulationResult> {
    let start = Instant::now();

    config.validate()?;
    let params = config.effective_uncertainty();
    params.validate()?;

    let base = &config.base_state;
    let years = config.effective_years();
    let (seed, seeded) = match config.seed {
        Some(s) => (s, true),
        None => (StdRng::from_entropy().next_u64(), false),
    };

    info!(
        simulations = config.simulations,
        years,
        seed,
        seeded,
        chunk_size = config.chunk_size,
        "starting property risk simulation"
    );

    let ctx = TrialContext {
        base,
        params: &params,
        years,
    };
    let plans = plan_chunks(seed, config.simulations, config.chunk_size);
    let samples = execute_chunks(&ctx, &plans, config.simulations, progress, cancel)?;

    let result = assemble(config, &params, years, &samples, seed, seeded, start)?;

    info!(
        simulations = result.metadata.simulations,
        elapsed_ms = result.metadata.elapsed_ms,
        p50_annualized_return = result.annualized_return.p50,
        probability_of_loss = result.risk_metrics.probability_of_loss,
        "property risk simulation complete"
    );

    Ok(result)
}

/// Deterministic pro forma with every uncertain variable at its mean.
pub fn expected_case_projection(config: &SimulationConfig) -> PropertyRiskResult<Vec<YearRecord>> {
    config.validate()?;
    let params = config.effective_uncertainty();
    params.validate()?;
    let sampled = SampledParameters::at_means(&config.base_state, &params);
    Ok(project(&config.base_state, &sampled, config.effective_years()))
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn assemble(
    config: &SimulationConfig,
    params: &UncertaintyParameters,
    years: u32,
    samples: &TrialSamples,
    seed: u64,
    seeded: bool,
    start: Instant,
) -> PropertyRiskResult<SimulationResult> {
    let risk_metrics = compute_risk(
        &samples.annualized_return,
        &samples.total_return,
        &samples.max_drawdown,
        config.risk_free_rate,
    )?;
    let scenarios = select_scenarios(&samples.total_return, |i| samples.outcome_at(i))?;

    let expected_sampled = SampledParameters::at_means(&config.base_state, params);
    let expected_case = project(&config.base_state, &expected_sampled, years);
    let warnings = collect_warnings(&config.base_state, &expected_case, samples);

    let elapsed_ms = start.elapsed().as_millis() as u64;

    Ok(SimulationResult {
        annualized_return: reduce(&samples.annualized_return)?,
        total_return: reduce(&samples.total_return)?,
        total_cash_flow: reduce(&samples.total_cash_flow)?,
        final_equity: reduce(&samples.final_equity)?,
        total_appreciation: reduce(&samples.total_appreciation)?,
        total_principal_paydown: reduce(&samples.total_principal_paydown)?,
        risk_metrics,
        scenarios,
        annualized_return_histogram: histogram(&samples.annualized_return, HISTOGRAM_BINS),
        expected_case,
        warnings,
        metadata: RunMetadata::new(config.simulations, years, seed, seeded, elapsed_ms),
    })
}

fn collect_warnings(
    base: &BaseState,
    expected_case: &[YearRecord],
    samples: &TrialSamples,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let n = samples.len().max(1) as f64;

    if samples.vacancy_clamped as f64 / n > VACANCY_CLAMP_WARNING_SHARE {
        warnings.push(format!(
            "{} of {} trials clamped a vacancy draw outside 0-100%; review the vacancy range",
            samples.vacancy_clamped,
            samples.len()
        ));
    }

    if let Some(year1) = expected_case.first() {
        if year1.debt_service > 0.0 {
            let dscr = year1.noi / year1.debt_service;
            if dscr < 1.0 {
                warnings.push(format!(
                    "Expected year-1 DSCR {dscr:.2}x is below 1.00x; rent misses debt service"
                ));
            }
        }
    }

    let ltv = base.loan_amount / base.purchase_price;
    if ltv > 0.90 {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 90%; highly leveraged acquisition",
            ltv * 100.0
        ));
    }

    for w in &warnings {
        warn!(warning = %w, "simulation warning");
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
