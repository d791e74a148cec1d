use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dollar amounts. The simulation runs in IEEE-754 doubles throughout.
pub type Money = f64;

/// Rates expressed as decimals (0.05 = 5%). Reported return metrics are the
/// exception and are expressed in percent.
pub type Rate = f64;

/// Percent values (7.5 = 7.5%).
pub type Percent = f64;

/// Metadata attached to every simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Number of trials executed
    pub simulations: u32,
    /// Projection horizon in years
    pub years: u32,
    /// Master seed actually used (drawn from entropy when none was supplied)
    pub seed: u64,
    /// Whether the caller supplied the seed
    pub seeded: bool,
    /// Wall-clock time spent in the engine
    pub elapsed_ms: u64,
    /// Completion timestamp (UTC)
    pub completed_at: DateTime<Utc>,
    pub version: String,
    pub precision: String,
}

impl RunMetadata {
    pub(crate) fn new(
        simulations: u32,
        years: u32,
        seed: u64,
        seeded: bool,
        elapsed_ms: u64,
    ) -> Self {
        RunMetadata {
            simulations,
            years,
            seed,
            seeded,
            elapsed_ms,
            completed_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "ieee754_f64".to_string(),
        }
    }
}
