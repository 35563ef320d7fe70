use core::num::NonZeroU32;
use std::process;

use argh::FromArgs;
use ossim::{Config, log::LogLevel};
use snafu::ResultExt as _;
use snafu_utils::{GenericError, Report};

/// Simulate CPU scheduling, memory allocation and file allocation on a fixed
/// workload and print the decisions.
#[derive(Debug, FromArgs)]
struct Args {
    /// total size of simulated memory in units (default: 1024)
    #[argh(option)]
    memory_size: Option<usize>,
    /// total size of the simulated disk in bytes (default: 1024)
    #[argh(option)]
    storage_size: Option<usize>,
    /// size of one disk block in bytes (default: 32)
    #[argh(option)]
    block_size: Option<usize>,
    /// maximum number of files in the directory (default: 100)
    #[argh(option)]
    max_files: Option<usize>,
    /// maximum length of a file name in bytes (default: 50)
    #[argh(option)]
    max_filename_length: Option<usize>,
    /// maximum number of entries in the memory region table (default: 100)
    #[argh(option)]
    max_regions: Option<usize>,
    /// maximum number of tasks in the run queue (default: 100)
    #[argh(option)]
    max_tasks: Option<usize>,
    /// round-robin time quantum (default: 2)
    #[argh(option)]
    quantum: Option<NonZeroU32>,
    /// least severe diagnostic level written to stderr (default: warn)
    #[argh(option, default = "LogLevel::Warn")]
    log_level: LogLevel,
    /// print the final memory region table and disk bitmap
    #[argh(switch)]
    dump: bool,
    /// disable colored diagnostics
    #[argh(switch)]
    no_color: bool,
}

impl Args {
    fn config(&self) -> Config {
        let default = Config::default();
        Config {
            total_memory_size: self.memory_size.unwrap_or(default.total_memory_size),
            total_storage_size: self.storage_size.unwrap_or(default.total_storage_size),
            block_size: self.block_size.unwrap_or(default.block_size),
            max_files: self.max_files.unwrap_or(default.max_files),
            max_filename_length: self
                .max_filename_length
                .unwrap_or(default.max_filename_length),
            max_regions: self.max_regions.unwrap_or(default.max_regions),
            max_tasks: self.max_tasks.unwrap_or(default.max_tasks),
            quantum: self.quantum.unwrap_or(default.quantum),
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    ansi_term::set_enabled(!args.no_color);
    ossim::log::set_max_level(args.log_level);

    if let Err(err) = run(&args) {
        let report = Report::new(err);
        eprintln!("{report}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), GenericError> {
    let config = args.config();
    let trace = ossim::run_sample(&config, args.dump).whatever_context("failed to run workload")?;
    print!("{trace}");
    Ok(())
}
