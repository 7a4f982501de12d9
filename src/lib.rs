#![doc = include_str!("../README.md")]

pub mod aggregate;
#[cfg(feature = "cli")]
pub mod cli;
pub mod library;
pub mod output;
pub mod run;
pub mod simulation;
pub mod site;
pub mod utils;

#[doc(inline)]
pub use crate::aggregate::{Aggregator, Pipeline, SiteRecord};
#[doc(inline)]
#[cfg(feature = "cli")]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::library::LibrarySampler;
#[doc(inline)]
pub use crate::output::{Artifact, OutputMultiplexer};
#[doc(inline)]
pub use crate::run::{run, RunArgs, Summary};
#[doc(inline)]
pub use crate::simulation::{MsReader, Replicate, SimulationReader};
