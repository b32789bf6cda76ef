//! Star-topology gather of partial sums onto one aggregator rank.
//!
//! The aggregator starts from its own partial sum and performs exactly
//! `size - 1` receive-from-any calls on the reduction tag, adding each value
//! as it arrives. Every other rank performs exactly one synchronous send to
//! the aggregator on the same tag.
//!
//! # Limitations
//! There is no timeout and no failure detection: if a contributor never
//! sends, the aggregator blocks forever (on MPI; the in-process
//! [`LocalWorld`](crate::algs::communicator::LocalWorld) reports a failed
//! peer as a transport error). A lost message is fatal to the run.

use crate::algs::communicator::{Communicator, Tag, ensure_same_world};
use crate::participants::ParticipantSet;
use crate::pi_error::PiError;

/// What a rank does during the reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Receives `size - 1` contributions.
    Aggregator,
    /// Sends one contribution to `aggregator`.
    Contributor { aggregator: usize },
}

impl Role {
    /// Role of `participants.rank()` when `aggregator` gathers.
    ///
    /// # Errors
    /// [`PiError::InvalidAggregator`] if `aggregator >= size`.
    pub fn of(participants: &ParticipantSet, aggregator: usize) -> Result<Self, PiError> {
        if aggregator >= participants.size() {
            return Err(PiError::InvalidAggregator {
                aggregator,
                size: participants.size(),
            });
        }
        Ok(if participants.rank() == aggregator {
            Role::Aggregator
        } else {
            Role::Contributor { aggregator }
        })
    }
}

/// Result of the gather on the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Sum of all `size` partial sums.
    pub total: f64,
    /// Contributor ranks in the order their values arrived.
    pub arrivals: Vec<usize>,
}

/// Gather `partial` from every rank onto `aggregator`.
///
/// Returns `Some(Aggregate)` on the aggregator and `None` on contributors.
///
/// # Errors
/// - [`PiError::ContextMismatch`] if `participants` does not describe `comm`.
/// - [`PiError::InvalidAggregator`] if `aggregator` is not a rank of the run.
/// - [`PiError::UnexpectedSource`] / [`PiError::DuplicateContribution`] if a
///   received message does not come from a distinct contributor.
/// - Any transport error from `comm`.
pub fn reduce_to_aggregator<C>(
    participants: &ParticipantSet,
    aggregator: usize,
    tag: Tag,
    comm: &C,
    partial: f64,
) -> Result<Option<Aggregate>, PiError>
where
    C: Communicator + ?Sized,
{
    ensure_same_world(participants, comm)?;
    let me = participants.rank();
    match Role::of(participants, aggregator)? {
        Role::Contributor { aggregator } => {
            log::debug!("[rank {me}] sending partial {partial} to rank {aggregator}");
            comm.send_synchronous(partial, aggregator, tag)?;
            Ok(None)
        }
        Role::Aggregator => {
            let size = participants.size();
            let mut seen = vec![false; size];
            seen[me] = true;
            let mut total = partial;
            let mut arrivals = Vec::with_capacity(size - 1);
            for _ in 1..size {
                let msg = comm.receive_from_any(tag)?;
                if msg.source == aggregator || msg.source >= size {
                    return Err(PiError::UnexpectedSource {
                        source_rank: msg.source,
                        aggregator,
                        size,
                    });
                }
                if std::mem::replace(&mut seen[msg.source], true) {
                    return Err(PiError::DuplicateContribution(msg.source));
                }
                log::trace!("[rank {me}] received {} from rank {}", msg.value, msg.source);
                total += msg.value;
                arrivals.push(msg.source);
            }
            Ok(Some(Aggregate { total, arrivals }))
        }
    }
}
