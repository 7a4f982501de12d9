//! Convert a simulation into sequencing libraries and reference panels.


use crate::aggregate::{Aggregator, Pipeline};
use crate::library::LibrarySampler;
use crate::output::{Artifact, OutputMultiplexer};
use crate::simulation::{MsReader, SimulationReader};
use crate::site::FrequencyFilter;
use crate::utils;
#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use indoc::formatdoc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

/// Largest preservation probability accepted from the command line.
pub const MAX_PROBABILITY: f64 = 0.5;

// ----------------------------------------------------------------------------
// RunArgs
// ----------------------------------------------------------------------------

/// Simulate low-coverage sequencing libraries from ms replicates.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct RunArgs {
    /// Simulation output in ms format.
    ///
    /// Use '-' to read from standard input. Files ending in .zst are decompressed.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output_dir: PathBuf,

    /// File name prefix of every output artifact.
    #[cfg_attr(feature = "cli", clap(short = 'p', long, default_value_t = RunArgs::default().prefix))]
    pub prefix: String,

    /// Probability that a haplotype is preserved in a library, in (0, 0.5].
    #[cfg_attr(feature = "cli", arg(short = 'q', long, default_value_t = RunArgs::default().probability))]
    pub probability: f64,

    /// Number of sequencing libraries of the subject.
    #[cfg_attr(feature = "cli", arg(short = 's', long, default_value_t = RunArgs::default().subject_libraries))]
    pub subject_libraries: usize,

    /// Number of sequencing libraries of the control.
    #[cfg_attr(feature = "cli", arg(short = 'c', long, default_value_t = RunArgs::default().control_libraries))]
    pub control_libraries: usize,

    /// Minimum minor/major allele count ratio among background haplotypes.
    #[cfg_attr(feature = "cli", arg(short = 'f', long, default_value_t = RunArgs::default().min_frequency))]
    pub min_frequency: f64,

    /// Chromosome length, overriding the -r option of the simulation.
    #[cfg_attr(feature = "cli", arg(short = 'l', long))]
    pub length: Option<usize>,

    /// Random seed, for reproducible libraries.
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,

    /// Output artifacts to skip.
    #[cfg_attr(feature = "cli", arg(short = 'd', long, value_delimiter = ','))]
    #[serde(default)]
    pub disable: Vec<Artifact>,
}

impl Default for RunArgs {
    fn default() -> Self {
        RunArgs {
            input: PathBuf::new(),
            output_dir: PathBuf::new(),
            prefix: "sim".to_string(),
            probability: 0.01,
            subject_libraries: 1,
            control_libraries: 1,
            min_frequency: 0.1,
            length: None,
            seed: None,
            disable: Vec::new(),
        }
    }
}

impl RunArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration before any input is read.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use mslib::RunArgs;
    /// assert!(RunArgs::default().validate().is_ok());
    /// assert!(RunArgs { probability: 0.6, ..Default::default() }.validate().is_err());
    /// assert!(RunArgs { control_libraries: 0, ..Default::default() }.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), Report> {
        let q = self.probability;
        if !(q > 0.0 && q <= MAX_PROBABILITY) {
            return Err(eyre!("Invalid preservation probability: {q}")
                .suggestion(format!("Please choose a probability in (0, {MAX_PROBABILITY}].")));
        }
        if self.subject_libraries == 0 {
            return Err(eyre!("The subject needs at least one library.")
                .suggestion("Please set --subject-libraries to 1 or more."));
        }
        if self.control_libraries == 0 {
            return Err(eyre!("The control needs at least one library.")
                .suggestion("Please set --control-libraries to 1 or more."));
        }
        if !(0.0..=1.0).contains(&self.min_frequency) {
            return Err(eyre!("Invalid minimum frequency: {}", self.min_frequency)
                .suggestion("The background frequency ratio is always in [0, 1]."));
        }
        if self.prefix.is_empty() {
            return Err(eyre!("The output prefix is empty."));
        }
        Ok(())
    }

    /// Path of the JSON record of these arguments.
    pub fn path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.args.json", self.prefix))
    }

    /// Reads [`RunArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<RunArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run arguments: {path:?}."))?;
        let run_args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize run arguments: {input}"))?;
        Ok(run_args)
    }

    /// Write [`RunArgs`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize run arguments: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err(format!("Failed to write run arguments: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Summary
// ----------------------------------------------------------------------------

/// Retention statistics reported at the end of a run.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Summary {
    pub probability: f64,
    pub theoretical_retention: f64,
    pub realized_retention: f64,
    pub call_retention: f64,
    pub replicates: usize,
    pub segregating_sites: usize,
    pub filtered_sites: usize,
    pub rows: usize,
}

impl Summary {
    pub fn new(sampler: &LibrarySampler, aggregator: &Aggregator) -> Self {
        Summary {
            probability: sampler.probability(),
            theoretical_retention: sampler.theoretical_retention(),
            realized_retention: aggregator.realized_retention(),
            call_retention: aggregator.call_retention(),
            replicates: aggregator.replicates,
            segregating_sites: aggregator.segregating_sites,
            filtered_sites: aggregator.filtered_sites,
            rows: aggregator.records.len(),
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let summary = formatdoc!(
            "probability: {}
            theoretical retention: {:.6}
            realized retention: {:.6}
            call retention: {:.6}
            replicates: {}
            segregating sites: {}
            filtered sites: {}
            rows: {}",
            self.probability,
            self.theoretical_retention,
            self.realized_retention,
            self.call_retention,
            self.replicates,
            self.segregating_sites,
            self.filtered_sites,
            self.rows,
        );
        write!(f, "{summary}")
    }
}

// ----------------------------------------------------------------------------
// Run
// ----------------------------------------------------------------------------

/// Read the simulation in `args.input` and write the output artifacts.
pub fn run(args: &RunArgs) -> Result<Summary, Report> {
    args.validate()?;
    let reader = utils::open_input(&args.input)?;
    let reader = MsReader::new(reader).wrap_err_with(|| format!("Failed to read: {:?}", args.input))?;
    simulate(args, reader)
}

/// Process every replicate of a [`SimulationReader`] and write the output
/// artifacts of `args`.
pub fn run_with_reader<S>(args: &RunArgs, reader: S) -> Result<Summary, Report>
where
    S: SimulationReader,
{
    args.validate()?;
    simulate(args, reader)
}

/// Driver shared by [`run`] and [`run_with_reader`], `args` must already be
/// validated.
fn simulate<S>(args: &RunArgs, mut reader: S) -> Result<Summary, Report>
where
    S: SimulationReader,
{
    let sampler = LibrarySampler::new(args.probability, args.subject_libraries, args.control_libraries)?;
    let length = args.length.unwrap_or(reader.chromosome_length());
    let pipeline = Pipeline::new(length, FrequencyFilter::new(args.min_frequency), sampler);
    debug!("Population sizes: {:?}, chromosome length: {length}", reader.population_sizes());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // create outputs up front, so unwritable destinations fail fast
    if !args.output_dir.exists() {
        info!("Creating output directory: {:?}", &args.output_dir);
        std::fs::create_dir_all(&args.output_dir)
            .wrap_err_with(|| format!("Failed to create output directory: {:?}", args.output_dir))?;
    }
    let mut output = OutputMultiplexer::create(&args.output_dir, &args.prefix, &args.disable)?;
    if output.artifacts().is_empty() {
        warn!("Every output artifact is disabled, only the summary will be reported.");
    }
    args.write(&args.path())?;

    let mut aggregator = Aggregator::new();
    while let Some(replicate) = reader.next_replicate()? {
        aggregator = pipeline.process(aggregator, &replicate, &mut rng)?;
    }
    info!(
        "Processed {} replicates, keeping {} of {} segregating sites.",
        aggregator.replicates,
        aggregator.records.len(),
        aggregator.segregating_sites
    );

    output.write(&aggregator.records)?;

    let summary = Summary::new(&pipeline.sampler, &aggregator);
    info!("Done.");
    Ok(summary)
}
