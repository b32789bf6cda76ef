//! End-to-end pipeline run identically by every participant:
//! validate → partition → accumulate → reduce → finalize.

use crate::algs::accumulate::partial_sum;
use crate::algs::communicator::{Communicator, ensure_same_world};
use crate::algs::finalize::{PiEstimate, finalize};
use crate::algs::partition::partition;
use crate::algs::reduction::reduce_to_aggregator;
use crate::config::PiConfig;
use crate::participants::ParticipantSet;
use crate::pi_error::PiError;

/// Estimate pi across all participants of `comm`.
///
/// Returns `Some(estimate)` on the aggregator rank and `None` everywhere
/// else. Configuration errors, including a `participants` context that does
/// not describe `comm`, are raised before any message is sent, so a
/// misconfigured run fails on every rank instead of hanging.
pub fn estimate_pi<C>(
    participants: &ParticipantSet,
    config: &PiConfig,
    comm: &C,
) -> Result<Option<PiEstimate>, PiError>
where
    C: Communicator + ?Sized,
{
    ensure_same_world(participants, comm)?;
    config.validate(participants)?;
    let rank = participants.rank();
    let range = partition(config.iterations, participants, config.policy)?;
    if range.is_empty() {
        log::warn!(
            "[rank {rank}] empty iteration range ({} iterations over {} participants)",
            config.iterations,
            participants.size()
        );
    }
    let partial = partial_sum(&range, config.iterations);
    log::debug!(
        "[rank {rank}] range [{}, {}] partial sum {partial}",
        range.start,
        range.stop
    );

    let Some(aggregate) =
        reduce_to_aggregator(participants, config.aggregator, config.tag, comm, partial)?
    else {
        return Ok(None);
    };
    let estimate = PiEstimate {
        value: finalize(aggregate.total, config.iterations)?,
        iterations: config.iterations,
        participants: participants.size(),
    };
    log::info!(
        "[rank {rank}] pi ≈ {:.16} (error {:.3e})",
        estimate.value,
        estimate.abs_error()
    );
    Ok(Some(estimate))
}
