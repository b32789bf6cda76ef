//! Identity of one participant within a fixed-size run.

use crate::pi_error::PiError;
use serde::{Deserialize, Serialize};

/// `(rank, size)` as handed out by the lifecycle shell.
///
/// Immutable for the run; every component that needs to know "who am I"
/// receives it explicitly rather than reading process-global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantSet {
    rank: usize,
    size: usize,
}

impl ParticipantSet {
    /// Build a context for `rank` in a run of `size` participants.
    ///
    /// # Errors
    /// - [`PiError::EmptyParticipantSet`] if `size == 0`.
    /// - [`PiError::RankOutOfRange`] if `rank >= size`.
    pub fn new(rank: usize, size: usize) -> Result<Self, PiError> {
        if size == 0 {
            return Err(PiError::EmptyParticipantSet);
        }
        if rank >= size {
            return Err(PiError::RankOutOfRange { rank, size });
        }
        Ok(Self { rank, size })
    }

    /// A run with exactly one participant.
    pub fn serial() -> Self {
        Self { rank: 0, size: 1 }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Every context of the run, in rank order.
    pub fn all(size: usize) -> Result<Vec<Self>, PiError> {
        if size == 0 {
            return Err(PiError::EmptyParticipantSet);
        }
        Ok((0..size).map(|rank| Self { rank, size }).collect())
    }
}
