//! Thin façade over serial, intra-process (threads) or inter-process (MPI)
//! message passing.
//!
//! Messages carry exactly one `f64`. Only two operations block: a
//! [`send_synchronous`](Communicator::send_synchronous) returns once the
//! receiver has matched it, and a
//! [`receive_from_any`](Communicator::receive_from_any) returns once a
//! message with the requested tag is available from *any* sender.
//!
//! There are no timeouts. A peer that never sends leaves its receiver
//! blocked; the in-process [`LocalWorld`] is the only backend that turns a
//! failed peer into an error instead of a hang.

use crate::participants::ParticipantSet;
use crate::pi_error::PiError;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Message tag, matched exactly by receivers.
pub type Tag = u16;

/// A message taken by [`Communicator::receive_from_any`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Received {
    pub value: f64,
    /// Rank that sent the value.
    pub source: usize,
}

/// Blocking point-to-point messaging capability (minimal by design).
pub trait Communicator {
    /// This participant's rank.
    fn rank(&self) -> usize;
    /// Total number of participants.
    fn size(&self) -> usize;

    /// Rendezvous send: does not return until `dest` has matched the message.
    fn send_synchronous(&self, value: f64, dest: usize, tag: Tag) -> Result<(), PiError>;

    /// Block until a message with `tag` addressed to this rank arrives from
    /// any sender.
    fn receive_from_any(&self, tag: Tag) -> Result<Received, PiError>;

    /// Identity of this participant, as an immutable context value.
    fn participants(&self) -> Result<ParticipantSet, PiError> {
        ParticipantSet::new(self.rank(), self.size())
    }
}

/// Fail unless `participants` describes the same rank and size as `comm`.
///
/// A context larger than the communicator would leave the aggregator
/// waiting for contributions nobody sends, so this runs before any message.
pub fn ensure_same_world<C>(participants: &ParticipantSet, comm: &C) -> Result<(), PiError>
where
    C: Communicator + ?Sized,
{
    let (comm_rank, comm_size) = (comm.rank(), comm.size());
    if participants.rank() != comm_rank || participants.size() != comm_size {
        return Err(PiError::ContextMismatch {
            rank: participants.rank(),
            size: participants.size(),
            comm_rank,
            comm_size,
        });
    }
    Ok(())
}

/// Single-participant comm for pure serial runs.
///
/// With one participant the reduction never messages; any attempt to do so
/// is reported as a transport error rather than blocking forever.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn send_synchronous(&self, _value: f64, dest: usize, _tag: Tag) -> Result<(), PiError> {
        Err(PiError::Transport(format!(
            "NoComm cannot send to rank {dest}: serial run has no peers"
        )))
    }
    fn receive_from_any(&self, tag: Tag) -> Result<Received, PiError> {
        Err(PiError::Transport(format!(
            "NoComm cannot receive tag {tag}: serial run has no peers"
        )))
    }
}

// --- LocalComm: intra-process / one thread per rank ---

#[derive(Debug)]
struct Envelope {
    id: u64,
    source: usize,
    dest: usize,
    tag: Tag,
    value: f64,
}

#[derive(Debug, Default)]
struct MailboxState {
    /// Posted sends not yet matched, oldest first.
    pending: VecDeque<Envelope>,
    /// Ids matched by a receiver but not yet observed by their sender.
    matched: HashSet<u64>,
    next_id: u64,
    /// Set when a rank failed; wakes every blocked peer with an error.
    poisoned: Option<String>,
}

#[derive(Debug, Default)]
struct Mailbox {
    state: Mutex<MailboxState>,
    ready: Condvar,
}

impl Mailbox {
    fn poison(&self, reason: String) {
        let mut st = self.state.lock();
        if st.poisoned.is_none() {
            st.poisoned = Some(reason);
        }
        self.ready.notify_all();
    }

    /// Drop leftovers of a previous run: unmatched sends and the poison flag.
    fn reset(&self) {
        let mut st = self.state.lock();
        st.pending.clear();
        st.matched.clear();
        st.poisoned = None;
    }
}

/// One rank's handle onto a [`LocalWorld`] mailbox.
#[derive(Clone, Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send_synchronous(&self, value: f64, dest: usize, tag: Tag) -> Result<(), PiError> {
        if dest >= self.size {
            return Err(PiError::RankOutOfRange {
                rank: dest,
                size: self.size,
            });
        }
        if dest == self.rank {
            // nobody else could ever match it
            return Err(PiError::Transport(format!(
                "rank {dest} cannot synchronously send to itself"
            )));
        }
        let mut st = self.mailbox.state.lock();
        if let Some(reason) = &st.poisoned {
            return Err(PiError::Transport(reason.clone()));
        }
        let id = st.next_id;
        st.next_id += 1;
        st.pending.push_back(Envelope {
            id,
            source: self.rank,
            dest,
            tag,
            value,
        });
        self.mailbox.ready.notify_all();
        while !st.matched.remove(&id) {
            if let Some(reason) = &st.poisoned {
                return Err(PiError::Transport(reason.clone()));
            }
            self.mailbox.ready.wait(&mut st);
        }
        Ok(())
    }

    fn receive_from_any(&self, tag: Tag) -> Result<Received, PiError> {
        let mut st = self.mailbox.state.lock();
        loop {
            let pos = st
                .pending
                .iter()
                .position(|e| e.dest == self.rank && e.tag == tag);
            if let Some(env) = pos.and_then(|p| st.pending.remove(p)) {
                st.matched.insert(env.id);
                self.mailbox.ready.notify_all();
                log::trace!(
                    "[rank {}] matched message {} from rank {} (tag {})",
                    self.rank,
                    env.id,
                    env.source,
                    tag
                );
                return Ok(Received {
                    value: env.value,
                    source: env.source,
                });
            }
            if let Some(reason) = &st.poisoned {
                return Err(PiError::Transport(reason.clone()));
            }
            self.mailbox.ready.wait(&mut st);
        }
    }
}

/// In-process lifecycle shell: `size` participants sharing one mailbox.
///
/// [`LocalWorld::run`] enters the world (one scoped thread per rank), hands
/// each rank its [`ParticipantSet`] and [`LocalComm`], and exits by joining
/// every rank. Participants share nothing but the mailbox.
#[derive(Debug)]
pub struct LocalWorld {
    participants: Vec<ParticipantSet>,
    mailbox: Arc<Mailbox>,
}

impl LocalWorld {
    pub fn new(size: usize) -> Result<Self, PiError> {
        Ok(Self {
            participants: ParticipantSet::all(size)?,
            mailbox: Arc::new(Mailbox::default()),
        })
    }

    pub fn size(&self) -> usize {
        self.participants.len()
    }

    /// Handle for `rank`, for driving ranks from caller-owned threads.
    pub fn comm(&self, rank: usize) -> Result<LocalComm, PiError> {
        let size = self.size();
        if rank >= size {
            return Err(PiError::RankOutOfRange { rank, size });
        }
        Ok(LocalComm {
            rank,
            size,
            mailbox: Arc::clone(&self.mailbox),
        })
    }

    /// Run `f` once per rank, concurrently, and return the results in rank
    /// order.
    ///
    /// If a rank returns an error or panics, the mailbox is poisoned so that
    /// peers blocked on it fail with [`PiError::Transport`] instead of
    /// hanging. Each call starts from an empty, unpoisoned mailbox, so a world
    /// can be reused after a failed run; handles from [`LocalWorld::comm`]
    /// must not be messaging while `run` is in progress.
    pub fn run<T, F>(&self, f: F) -> Vec<Result<T, PiError>>
    where
        T: Send,
        F: Fn(ParticipantSet, &LocalComm) -> Result<T, PiError> + Sync,
    {
        self.mailbox.reset();
        let size = self.size();
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .participants
                .iter()
                .map(|&me| {
                    let comm = LocalComm {
                        rank: me.rank(),
                        size,
                        mailbox: Arc::clone(&self.mailbox),
                    };
                    scope.spawn(move || {
                        let mut guard = PoisonOnFailure {
                            mailbox: &comm.mailbox,
                            rank: me.rank(),
                            armed: true,
                        };
                        let out = f(me, &comm);
                        if out.is_ok() {
                            guard.armed = false;
                        }
                        out
                    })
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, h)| {
                    h.join().unwrap_or_else(|_| {
                        Err(PiError::Transport(format!("rank {rank} panicked")))
                    })
                })
                .collect()
        })
    }
}

struct PoisonOnFailure<'a> {
    mailbox: &'a Mailbox,
    rank: usize,
    armed: bool,
}

impl Drop for PoisonOnFailure<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("[rank {}] failed; poisoning local world", self.rank);
            self.mailbox
                .poison(format!("peer rank {} failed before completing", self.rank));
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Received, Tag};
    use crate::pi_error::PiError;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Source};

    /// World communicator of an initialized MPI environment.
    ///
    /// `new` enters the environment; dropping the comm finalizes it, so
    /// every rank must keep it alive until its last message completes.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        // dropped last: finalizes MPI
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, PiError> {
            let universe = mpi::initialize().ok_or_else(|| {
                PiError::Transport("MPI initialization failed (already initialized?)".into())
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            log::debug!("[rank {rank}] entered MPI world of {size}");
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn send_synchronous(&self, value: f64, dest: usize, tag: Tag) -> Result<(), PiError> {
            if dest >= self.size {
                return Err(PiError::RankOutOfRange {
                    rank: dest,
                    size: self.size,
                });
            }
            if dest == self.rank {
                // MPI_Ssend to self never completes
                return Err(PiError::Transport(format!(
                    "rank {dest} cannot synchronously send to itself"
                )));
            }
            self.world
                .process_at_rank(dest as mpi::Rank)
                .synchronous_send_with_tag(&value, mpi::Tag::from(tag));
            Ok(())
        }

        fn receive_from_any(&self, tag: Tag) -> Result<Received, PiError> {
            let (value, status) = self
                .world
                .any_process()
                .receive_with_tag::<f64>(mpi::Tag::from(tag));
            let source = usize::try_from(status.source_rank()).map_err(|_| {
                PiError::Transport(format!("invalid source rank {}", status.source_rank()))
            })?;
            Ok(Received { value, source })
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_rendezvous_two_ranks() {
        let world = LocalWorld::new(2).unwrap();
        let out = world.run(|me, comm| {
            if me.rank() == 0 {
                let got = comm.receive_from_any(7)?;
                Ok(Some(got))
            } else {
                comm.send_synchronous(1.5, 0, 7)?;
                Ok(None)
            }
        });
        assert_eq!(out[0], Ok(Some(Received { value: 1.5, source: 1 })));
        assert_eq!(out[1], Ok(None));
    }

    #[test]
    fn no_comm_refuses_to_message() {
        let comm = NoComm;
        assert_eq!(comm.participants(), Ok(ParticipantSet::serial()));
        assert!(matches!(
            comm.send_synchronous(1.0, 0, 1),
            Err(PiError::Transport(_))
        ));
        assert!(matches!(comm.receive_from_any(1), Err(PiError::Transport(_))));
    }

    #[test]
    fn self_send_and_out_of_range_are_rejected() {
        let world = LocalWorld::new(2).unwrap();
        let c0 = world.comm(0).unwrap();
        assert!(matches!(
            c0.send_synchronous(1.0, 0, 1),
            Err(PiError::Transport(_))
        ));
        assert_eq!(
            c0.send_synchronous(1.0, 2, 1),
            Err(PiError::RankOutOfRange { rank: 2, size: 2 })
        );
        assert!(world.comm(2).is_err());
    }

    #[test]
    fn world_is_reusable_after_failed_run() {
        let world = LocalWorld::new(2).unwrap();
        let failed = world.run(|me, comm| {
            if me.rank() == 0 {
                // fail while rank 1's send is still pending
                std::thread::sleep(std::time::Duration::from_millis(20));
                Err(PiError::ZeroIterations)
            } else {
                comm.send_synchronous(99.0, 0, 3).map(|_| 0.0)
            }
        });
        assert_eq!(failed[0], Err(PiError::ZeroIterations));
        assert!(matches!(failed[1], Err(PiError::Transport(_))));

        let out = world.run(|me, comm| {
            if me.rank() == 0 {
                comm.receive_from_any(3).map(|r| r.value)
            } else {
                comm.send_synchronous(1.0, 0, 3).map(|_| 0.0)
            }
        });
        assert_eq!(out, vec![Ok(1.0), Ok(0.0)]);
    }

    #[test]
    fn failed_rank_unblocks_receiver() {
        let world = LocalWorld::new(2).unwrap();
        let out = world.run(|me, comm| {
            if me.rank() == 0 {
                comm.receive_from_any(3).map(|r| r.value)
            } else {
                Err(PiError::ZeroIterations)
            }
        });
        assert!(matches!(out[0], Err(PiError::Transport(_))));
        assert_eq!(out[1], Err(PiError::ZeroIterations));
    }
}
