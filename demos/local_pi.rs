// Same computation as `mpi_pi`, with one thread per rank in this process.
// Run with `cargo run --example local_pi -- [ranks]`

use pi_sieve::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ranks: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 4,
    };
    let cfg = PiConfig::from_env()?;

    let world = LocalWorld::new(ranks)?;
    let results = world.run(|me, comm| estimate_pi(&me, &cfg, comm));

    for (rank, res) in results.into_iter().enumerate() {
        match res? {
            Some(est) => println!(
                "[rank {rank}] pi is approximately {:.16}, error is {:.16}",
                est.value,
                est.abs_error()
            ),
            None => println!("[rank {rank}] contributed"),
        }
    }
    Ok(())
}
