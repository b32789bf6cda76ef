//! Run configuration for [`estimate_pi`](crate::algs::estimate::estimate_pi).
//!
//! All participants must use the same configuration; nothing here is
//! exchanged over the wire.

use crate::algs::communicator::Tag;
use crate::participants::ParticipantSet;
use crate::pi_error::PiError;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`PiConfig::iterations`].
pub const ENV_ITERATIONS: &str = "PI_ITERATIONS";
/// Environment variable overriding [`PiConfig::aggregator`].
pub const ENV_AGGREGATOR: &str = "PI_AGGREGATOR";
/// Environment variable overriding [`PiConfig::tag`].
pub const ENV_TAG: &str = "PI_TAG";
/// Environment variable overriding [`PiConfig::policy`] (`reject` or `distribute`).
pub const ENV_REMAINDER: &str = "PI_REMAINDER";

/// What to do when the iteration count is not a multiple of the
/// participant count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Fail with [`PiError::UnevenPartition`] before any messaging.
    #[default]
    Reject,
    /// Give the first `iterations % size` ranks one extra iteration each.
    Distribute,
}

impl std::str::FromStr for RemainderPolicy {
    type Err = PiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "distribute" => Ok(Self::Distribute),
            _ => Err(PiError::InvalidConfig {
                key: ENV_REMAINDER,
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiConfig {
    /// Total number of integration intervals `N`.
    pub iterations: u64,
    /// Rank that gathers and finalizes.
    pub aggregator: usize,
    /// Message tag used for every contribution.
    pub tag: Tag,
    pub policy: RemainderPolicy,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            iterations: 840,
            aggregator: 0,
            tag: 10,
            policy: RemainderPolicy::Reject,
        }
    }
}

impl PiConfig {
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_aggregator(mut self, aggregator: usize) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_policy(mut self, policy: RemainderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Defaults overridden by `PI_*` environment variables, where set.
    pub fn from_env() -> Result<Self, PiError> {
        Self::default().merge_env()
    }

    /// Override fields of `self` from `PI_*` environment variables.
    pub fn merge_env(mut self) -> Result<Self, PiError> {
        if let Some(v) = read_env(ENV_ITERATIONS) {
            self.iterations = parse_value(ENV_ITERATIONS, &v)?;
        }
        if let Some(v) = read_env(ENV_AGGREGATOR) {
            self.aggregator = parse_value(ENV_AGGREGATOR, &v)?;
        }
        if let Some(v) = read_env(ENV_TAG) {
            self.tag = parse_value(ENV_TAG, &v)?;
        }
        if let Some(v) = read_env(ENV_REMAINDER) {
            self.policy = v.parse()?;
        }
        Ok(self)
    }

    /// Check everything that can be checked locally before messaging.
    ///
    /// # Errors
    /// - [`PiError::ZeroIterations`] if `iterations == 0`.
    /// - [`PiError::InvalidAggregator`] if the aggregator is not a rank of `participants`.
    /// - [`PiError::UnevenPartition`] under [`RemainderPolicy::Reject`] when
    ///   `iterations % size != 0`.
    pub fn validate(&self, participants: &ParticipantSet) -> Result<(), PiError> {
        let size = participants.size();
        if self.iterations == 0 {
            return Err(PiError::ZeroIterations);
        }
        if self.aggregator >= size {
            return Err(PiError::InvalidAggregator {
                aggregator: self.aggregator,
                size,
            });
        }
        if self.policy == RemainderPolicy::Reject && self.iterations % size as u64 != 0 {
            return Err(PiError::UnevenPartition {
                iterations: self.iterations,
                size,
            });
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, PiError> {
    raw.trim().parse().map_err(|_| PiError::InvalidConfig {
        key,
        value: raw.to_owned(),
    })
}
