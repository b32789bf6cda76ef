//! Contiguous block partitioning of the iteration space `[1, N]`.
//!
//! Rank `r` of `size` owns one contiguous, inclusive [`IterationRange`].
//! Ranges are ordered by rank and tile `[1, N]` without gaps or overlap.

use crate::config::RemainderPolicy;
use crate::debug_invariants::DebugInvariants;
use crate::participants::ParticipantSet;
use crate::pi_error::PiError;
use serde::{Deserialize, Serialize};

/// Inclusive, 1-indexed range of iteration indices. Empty when `start > stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IterationRange {
    pub start: u64,
    pub stop: u64,
}

impl IterationRange {
    pub fn new(start: u64, stop: u64) -> Self {
        Self { start, stop }
    }

    /// Range of `len` iterations beginning at `start` (`len == 0` gives an
    /// empty range with `stop == start - 1`).
    fn from_len(start: u64, len: u64) -> Self {
        debug_assert!(start >= 1, "iteration indices are 1-based");
        Self {
            start,
            stop: start - 1 + len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start > self.stop
    }

    #[inline]
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.stop - self.start + 1
        }
    }

    /// Indices in increasing order.
    pub fn iter(&self) -> std::ops::RangeInclusive<u64> {
        self.start..=self.stop
    }
}

/// Compute the range owned by `participants.rank()`.
///
/// Under [`RemainderPolicy::Reject`] this is the plain block split
/// (`chunk = N / size`, `start = chunk * rank + 1`, `stop = start + chunk - 1`)
/// and `N` must be a multiple of `size`. Under
/// [`RemainderPolicy::Distribute`] the first `N % size` ranks get one extra
/// iteration; ranks beyond `N` get an empty range.
///
/// # Errors
/// - [`PiError::ZeroIterations`] if `iterations == 0`.
/// - [`PiError::UnevenPartition`] under `Reject` when `N % size != 0`.
pub fn partition(
    iterations: u64,
    participants: &ParticipantSet,
    policy: RemainderPolicy,
) -> Result<IterationRange, PiError> {
    if iterations == 0 {
        return Err(PiError::ZeroIterations);
    }
    let size = participants.size() as u64;
    let rank = participants.rank() as u64;
    let chunk = iterations / size;
    let rem = iterations % size;
    match policy {
        RemainderPolicy::Reject if rem != 0 => Err(PiError::UnevenPartition {
            iterations,
            size: participants.size(),
        }),
        RemainderPolicy::Reject => Ok(IterationRange::from_len(chunk * rank + 1, chunk)),
        RemainderPolicy::Distribute => {
            let extra = rank.min(rem);
            let len = chunk + u64::from(rank < rem);
            Ok(IterationRange::from_len(chunk * rank + extra + 1, len))
        }
    }
}

/// Ranges of every rank, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    pub iterations: u64,
    pub ranges: Vec<IterationRange>,
}

/// Compute the whole [`PartitionPlan`] for `size` participants.
pub fn partition_all(
    iterations: u64,
    size: usize,
    policy: RemainderPolicy,
) -> Result<PartitionPlan, PiError> {
    let ranges = ParticipantSet::all(size)?
        .iter()
        .map(|p| partition(iterations, p, policy))
        .collect::<Result<Vec<_>, _>>()?;
    let plan = PartitionPlan { iterations, ranges };
    crate::debug_invariants!(plan.validate_invariants(), "partition_all");
    Ok(plan)
}

impl DebugInvariants for PartitionPlan {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PartitionPlan");
    }

    /// Non-empty ranges must be contiguous in rank order and cover `[1, N]`.
    fn validate_invariants(&self) -> Result<(), PiError> {
        // last index covered so far; never forms `N + 1`
        let mut covered = 0u64;
        for (rank, r) in self.ranges.iter().enumerate() {
            if r.start == 0 || r.start - 1 != covered {
                return Err(PiError::BrokenPartition(format!(
                    "rank {rank} starts at {} but range so far ends at {covered}",
                    r.start
                )));
            }
            if !r.is_empty() {
                covered = r.stop;
            }
        }
        if covered != self.iterations {
            return Err(PiError::BrokenPartition(format!(
                "ranges cover [1, {covered}] instead of [1, {}]",
                self.iterations
            )));
        }
        Ok(())
    }
}
