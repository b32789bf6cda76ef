//! Re-export public algorithms.

pub mod accumulate;
pub mod communicator;
pub mod estimate;
pub mod finalize;
pub mod partition;
pub mod reduction;

pub use estimate::estimate_pi;
pub use partition::partition;
