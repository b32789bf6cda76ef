#![cfg_attr(docsrs, feature(doc_cfg))]
//! # pi-sieve
//!
//! pi-sieve estimates pi by midpoint-rule integration of `4 / (1 + x^2)` on
//! `[0, 1]`, split across a fixed set of participants that cooperate only
//! through explicit point-to-point messages. It is a small, complete example
//! of the partition / accumulate / gather / finalize pattern:
//!
//! - [`algs::partition`] maps `(rank, size, N)` onto a contiguous block of
//!   iteration indices.
//! - [`algs::accumulate`] sums the integrand over that block in a fixed order.
//! - [`algs::reduction`] gathers every partial sum onto one aggregator rank
//!   with synchronous sends and receive-from-any.
//! - [`algs::finalize`] scales the aggregate into the estimate.
//!
//! ## Backends
//! - [`NoComm`](algs::communicator::NoComm): a single participant.
//! - [`LocalWorld`](algs::communicator::LocalWorld): one thread per rank in
//!   this process, with true rendezvous semantics.
//! - `MpiComm` (feature `mpi-support`): one MPI process per rank.
//!
//! ## Usage
//! ```no_run
//! use pi_sieve::prelude::*;
//!
//! let world = LocalWorld::new(4).unwrap();
//! let results = world.run(|me, comm| estimate_pi(&me, &PiConfig::default(), comm));
//! let pi = results[0].clone().unwrap().unwrap();
//! println!("pi ≈ {}", pi.value);
//! ```
//!
//! ## Determinism
//!
//! Each partial sum is accumulated in increasing index order, so it is
//! reproducible bit for bit. Contributions reach the aggregator in arbitrary
//! order; the total may differ in the last bits between runs.

pub mod algs;
pub mod config;
pub mod debug_invariants;
pub mod participants;
pub mod pi_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, LocalComm, LocalWorld, NoComm, Received, Tag};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::estimate::estimate_pi;
    pub use crate::algs::finalize::PiEstimate;
    pub use crate::algs::partition::IterationRange;
    pub use crate::config::{PiConfig, RemainderPolicy};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::participants::ParticipantSet;
    pub use crate::pi_error::PiError;
}
