//! Command-line interface for the pointbridge demo binary.

use clap::{Parser, Subcommand};
use pointbridge::{BoundaryConfig, LeakPolicy};

#[derive(Parser)]
#[command(name = "pointbridge")]
#[command(about = "Walk the Point marshalling boundary", long_about = None)]
pub struct Cli {
    /// Log every native crossing (overrides POINTBRIDGE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// First value of the native counter
    #[arg(long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    pub counter_start: i32,

    /// What to do with allocations still outstanding at exit
    #[arg(long, global = true, value_enum, default_value_t = LeakPolicy::Reclaim)]
    pub leak_policy: LeakPolicy,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config(&self) -> BoundaryConfig {
        BoundaryConfig::default()
            .with_counter_start(self.counter_start)
            .with_leak_policy(self.leak_policy)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Exercise every crossing pattern and print the native transcript
    Demo,
    /// Print the Point layout declared by the host and reported natively
    Layout,
    /// Copy TEXT into a mutable buffer and increment every byte natively
    Mutate { text: String },
}
