pub mod error;
pub mod types;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

#[cfg(feature = "reporting")]
pub mod reporting;

pub use error::PropertyRiskError;
pub use types::*;

/// Standard result type for all property-risk operations
pub type PropertyRiskResult<T> = Result<T, PropertyRiskError>;
