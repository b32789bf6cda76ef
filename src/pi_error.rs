//! PiError: Unified error type for pi-sieve public APIs
//!
//! Configuration problems are detected locally, before any messaging
//! begins. A contributor that never sends is *not* reported here: the
//! aggregator simply blocks (see [`crate::algs::reduction`]).

use thiserror::Error;

/// Unified error type for pi-sieve operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PiError {
    /// The total iteration count must be positive.
    #[error("iteration count must be positive")]
    ZeroIterations,
    /// A participant set needs at least one member.
    #[error("participant set must contain at least one participant")]
    EmptyParticipantSet,
    /// A rank was outside `[0, size)`.
    #[error("rank {rank} is out of range for {size} participants")]
    RankOutOfRange { rank: usize, size: usize },
    /// The `(rank, size)` context disagrees with the communicator it is used with.
    #[error("context is rank {rank} of {size} but communicator is rank {comm_rank} of {comm_size}")]
    ContextMismatch {
        rank: usize,
        size: usize,
        comm_rank: usize,
        comm_size: usize,
    },
    /// The configured aggregator rank does not exist in this run.
    #[error("aggregator rank {aggregator} is out of range for {size} participants")]
    InvalidAggregator { aggregator: usize, size: usize },
    /// `iterations` is not a multiple of `size` under the rejecting remainder policy.
    #[error("{iterations} iterations cannot be split evenly across {size} participants")]
    UnevenPartition { iterations: u64, size: usize },
    /// The aggregator received a message from a rank that is not a contributor.
    #[error("unexpected contribution from rank {source_rank} (aggregator {aggregator}, size {size})")]
    UnexpectedSource {
        source_rank: usize,
        aggregator: usize,
        size: usize,
    },
    /// A contributor's partial sum arrived twice.
    #[error("rank {0} contributed more than once")]
    DuplicateContribution(usize),
    /// A configuration value could not be parsed.
    #[error("invalid configuration value for `{key}`: {value}")]
    InvalidConfig { key: &'static str, value: String },
    /// The partition plan violates its tiling invariant.
    #[error("partition invariant violated: {0}")]
    BrokenPartition(String),
    /// The messaging substrate failed (initialization, disconnected peer, ...).
    #[error("transport error: {0}")]
    Transport(String),
}
