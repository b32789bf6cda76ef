//! cargo mpirun -n 4 --features mpi-support --example mpi_pi
//!
//! Every rank runs this same program. Rank `PI_AGGREGATOR` (default 0)
//! gathers the partial sums and prints the estimate; the others only send.
//! Configuration comes from the `PI_*` environment variables.

use pi_sieve::prelude::*;
use std::process;

fn main() {
    env_logger::init();

    // 1) Enter the MPI environment (exited when `comm` drops)
    let comm = match MpiComm::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // 2) Identity + configuration, identical on every rank
    let me = comm.participants().expect("MPI reported an invalid rank");
    let cfg = match PiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[rank {}] {e}", me.rank());
            process::exit(1);
        }
    };

    // 3) Partition, accumulate, gather, finalize
    match estimate_pi(&me, &cfg, &comm) {
        Ok(Some(est)) => println!(
            "pi is approximately {:.16}, error is {:.16} ({} intervals over {} ranks)",
            est.value,
            est.abs_error(),
            est.iterations,
            est.participants
        ),
        Ok(None) => {}
        Err(e) => {
            eprintln!("[rank {}] {e}", me.rank());
            process::exit(1);
        }
    }
}
