//! Closed-form scaling of the aggregated sum into a pi estimate.

use crate::pi_error::PiError;
use serde::{Deserialize, Serialize};

/// Final estimate, produced on the aggregator only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiEstimate {
    pub value: f64,
    pub iterations: u64,
    pub participants: usize,
}

impl PiEstimate {
    /// Distance from [`std::f64::consts::PI`].
    pub fn abs_error(&self) -> f64 {
        (self.value - std::f64::consts::PI).abs()
    }
}

/// `aggregate * 4 / iterations`.
///
/// # Errors
/// [`PiError::ZeroIterations`] if `iterations == 0`.
pub fn finalize(aggregate: f64, iterations: u64) -> Result<f64, PiError> {
    if iterations == 0 {
        return Err(PiError::ZeroIterations);
    }
    Ok(aggregate * 4.0 / iterations as f64)
}
