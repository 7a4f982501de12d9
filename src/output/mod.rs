//! Row-aligned output artifacts.
//!
//! Every [`SiteRecord`] becomes exactly one row in every enabled artifact,
//! so the files can be joined by line number.


use crate::aggregate::SiteRecord;
#[cfg(feature = "cli")]
use clap::ValueEnum;
use color_eyre::eyre::{Report, Result, WrapErr};
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use strum::{EnumIter, IntoEnumIterator};

/// Chromosome name written to the libraries artifact.
pub const CHROMOSOME: &str = "chr1";

// ----------------------------------------------------------------------------
// Artifact
// ----------------------------------------------------------------------------

/// The output files of a run.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Artifact {
    /// Reference panel of background haplotypes.
    Haplotypes,
    /// Site identities and positions.
    Legend,
    /// Calls of every subject and control library.
    Libraries,
    /// True subject and control diplotypes.
    Diplotypes,
    /// Genomic coordinates.
    Positions,
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = format!("{:?}", self).to_lowercase();
        write!(f, "{name}")
    }
}

impl Artifact {
    /// File extension of the artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Artifact::Haplotypes => "hap",
            Artifact::Legend => "legend",
            Artifact::Libraries => "libraries",
            Artifact::Diplotypes => "diplotypes",
            Artifact::Positions => "positions",
        }
    }

    /// Path of the artifact in an output directory.
    ///
    /// ```rust
    /// use mslib::output::Artifact;
    /// let path = Artifact::Legend.path(&"output", "sim");
    /// assert_eq!(path, std::path::PathBuf::from("output/sim.legend"));
    /// ```
    pub fn path<P>(&self, output_dir: &P, prefix: &str) -> PathBuf
    where
        P: AsRef<Path>,
    {
        output_dir.as_ref().join(format!("{prefix}.{}", self.extension()))
    }

    /// Header line, if the artifact has one.
    pub fn header(&self) -> Option<&'static str> {
        match self {
            Artifact::Legend => Some("ID pos allele0 allele1"),
            _ => None,
        }
    }

    /// Format one row of the artifact, without a line terminator.
    pub fn row(&self, record: &SiteRecord) -> String {
        match self {
            Artifact::Haplotypes => record.background.iter().join(" "),
            Artifact::Legend => format!("{} {} A T", record.id(), record.position),
            Artifact::Libraries => {
                format!("{CHROMOSOME} {} A T {}", record.position, record.libraries)
            }
            Artifact::Diplotypes => {
                let [s1, s2] = record.focal.subject;
                let [c1, c2] = record.focal.control;
                format!("{s1} {s2}\t{c1} {c2}")
            }
            Artifact::Positions => record.position.to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// OutputMultiplexer
// ----------------------------------------------------------------------------

/// Writes every [`SiteRecord`] to each enabled [`Artifact`].
pub struct OutputMultiplexer<W> {
    sinks: Vec<(Artifact, W)>,
}

impl<W> Default for OutputMultiplexer<W>
where
    W: Write,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<W> OutputMultiplexer<W>
where
    W: Write,
{
    pub fn new() -> Self {
        OutputMultiplexer { sinks: Vec::new() }
    }

    /// Register a destination for an artifact.
    pub fn add_sink(&mut self, artifact: Artifact, writer: W) {
        self.sinks.push((artifact, writer));
    }

    /// The enabled artifacts, in registration order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.sinks.iter().map(|(artifact, _)| *artifact).collect()
    }

    /// Write headers, one row per record, and flush every destination.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use mslib::output::{Artifact, OutputMultiplexer};
    ///
    /// let mut output = OutputMultiplexer::new();
    /// output.add_sink(Artifact::Legend, Vec::new());
    /// output.write(&[])?;
    ///
    /// let sinks = output.into_inner();
    /// let (_, legend) = &sinks[0];
    /// assert_eq!(String::from_utf8_lossy(legend), "ID pos allele0 allele1\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write(&mut self, records: &[SiteRecord]) -> Result<(), Report> {
        for (artifact, writer) in self.sinks.iter_mut() {
            if let Some(header) = artifact.header() {
                writeln!(writer, "{header}")
                    .wrap_err_with(|| format!("Failed to write {artifact} header."))?;
            }
            for record in records {
                writeln!(writer, "{}", artifact.row(record))
                    .wrap_err_with(|| format!("Failed to write {artifact} row: {}", record.id()))?;
            }
            writer.flush().wrap_err_with(|| format!("Failed to flush {artifact}."))?;
        }
        Ok(())
    }

    /// Returns the destinations, consuming the multiplexer.
    pub fn into_inner(self) -> Vec<(Artifact, W)> {
        self.sinks
    }
}

impl OutputMultiplexer<BufWriter<File>> {
    /// Create a file for every artifact that isn't disabled.
    ///
    /// Files are created immediately, so unwritable destinations are
    /// reported before any input is processed.
    pub fn create<P>(output_dir: &P, prefix: &str, disable: &[Artifact]) -> Result<Self, Report>
    where
        P: AsRef<Path>,
    {
        let mut output = OutputMultiplexer::new();
        for artifact in Artifact::iter().filter(|a| !disable.contains(a)) {
            let path = artifact.path(output_dir, prefix);
            info!("Creating {artifact}: {path:?}");
            let file = File::create(&path)
                .wrap_err_with(|| format!("Failed to create {artifact} output: {path:?}"))?;
            output.add_sink(artifact, BufWriter::new(file));
        }
        Ok(output)
    }
}
