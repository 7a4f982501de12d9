//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::RunArgs;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = mslib::Cli::parse();
/// ```
/// The command-line arguments can also be supplied manually:
/// ```rust
/// use clap::Parser;
/// use mslib::{Cli, cli::Command};
/// let input = ["mslib", "run", "--input", "sim.ms", "--output-dir", "output", "-q", "0.05", "--disable", "haplotypes,positions"];
/// let args = Cli::parse_from(input);
/// let Command::Run(run_args) = args.command;
/// assert_eq!(run_args.probability, 0.05);
/// assert_eq!(run_args.disable.len(), 2);
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "mslib", author, version)]
#[clap(about = "mslib simulates low-coverage sequencing libraries from ms replicates.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to [run](crate::run()).
    #[clap(about = "Simulate sequencing libraries from an ms simulation.")]
    Run(RunArgs),
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
