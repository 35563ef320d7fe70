//! Replays a fixed workload against three textbook resource managers: a CPU
//! scheduler, a region-based memory allocator and a contiguous-allocation
//! file system, and records every decision in a [`Trace`].

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[macro_use]
pub mod log;

pub mod config;
pub mod simulator;
pub mod trace;
pub mod workload;

pub use self::{config::Config, simulator::Simulator, trace::Trace};

/// Runs the sample workload under `config`, optionally followed by a dump of
/// the final memory and disk state.
pub fn run_sample(config: &Config, dump: bool) -> Result<Trace, simulator::SimulatorError> {
    let workload = workload::sample(config);
    let mut simulator = Simulator::new(config, workload.tasks.iter().copied())?;
    simulator.run(&workload);
    if dump {
        simulator.dump();
    }
    info!("simulation finished: {} events", simulator.trace().events().len());
    Ok(simulator.into_trace())
}
