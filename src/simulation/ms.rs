//! Reader for Hudson's `ms` output format.
//!
//! The same layout is produced by `msms`, `scrm`, and other ms-compatible
//! simulators:
//!
//! ```text
//! ms 6 2 -t 5.0 -r 2.0 10000 -I 2 4 2
//! 1234 5678 9012
//!
//! //
//! segsites: 3
//! positions: 0.1250 0.5000 0.8125
//! 010
//! ...
//! ```

use crate::simulation::{Replicate, SimulationReader, FOCAL_HAPLOTYPES};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, warn};
use std::io::{BufRead, Lines};

/// Streaming reader of `ms` replicates.
///
/// ## Examples
///
/// ```rust
/// use mslib::simulation::{MsReader, SimulationReader};
///
/// let text = "ms 4 1 -t 1.0 -r 1.0 500\n1 2 3\n\n//\nsegsites: 1\npositions: 0.5\n0\n1\n1\n0\n";
/// let mut reader = MsReader::new(text.as_bytes())?;
/// assert_eq!(reader.chromosome_length(), 500);
///
/// let replicate = reader.next_replicate()?.expect("one replicate");
/// assert_eq!(replicate.column(0), vec![0, 1, 1, 0]);
/// assert!(reader.next_replicate()?.is_none());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub struct MsReader<R> {
    lines: Lines<R>,
    line_number: usize,
    haplotypes: usize,
    population_sizes: Vec<usize>,
    chromosome_length: usize,
    replicates: usize,
}

impl<R> MsReader<R>
where
    R: BufRead,
{
    /// Create a reader, parsing the invocation line at the top of the input.
    pub fn new(reader: R) -> Result<Self, Report> {
        let mut reader = MsReader {
            lines: reader.lines(),
            line_number: 0,
            haplotypes: 0,
            population_sizes: Vec::new(),
            chromosome_length: 0,
            replicates: 0,
        };

        let command = loop {
            match reader.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => return Err(eyre!("Simulation input is empty.")),
            }
        };
        reader.parse_command(&command)?;
        Ok(reader)
    }

    /// Parse the simulator invocation: sample size, `-r` and `-I` options.
    fn parse_command(&mut self, command: &str) -> Result<(), Report> {
        let tokens = command.split_whitespace().collect_vec();
        debug!("Simulation command: {}", tokens.join(" "));

        self.haplotypes = tokens
            .get(1)
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| eyre!("Failed to parse the sample size from: {command:?}"))
            .suggestion("The first line should be the ms invocation, ex. 'ms 20 100 -t 5 -r 4 10000'")?;

        let mut i = 3;
        while i < tokens.len() {
            match tokens[i] {
                "-r" => {
                    let nsites = tokens.get(i + 2).ok_or_else(|| {
                        eyre!("The -r option is missing its number of sites: {command:?}")
                    })?;
                    // ms accepts sizes written as floats, ex. 1e6
                    let length: f64 = nsites
                        .parse()
                        .wrap_err_with(|| format!("Failed to parse -r number of sites: {nsites:?}"))?;
                    self.chromosome_length = length as usize;
                    i += 3;
                }
                "-I" => {
                    let npop: usize = tokens
                        .get(i + 1)
                        .and_then(|n| n.parse().ok())
                        .ok_or_else(|| eyre!("Failed to parse -I population count: {command:?}"))?;
                    let sizes = tokens
                        .iter()
                        .skip(i + 2)
                        .take(npop)
                        .map(|n| n.parse::<usize>())
                        .collect::<Result<Vec<_>, _>>()
                        .wrap_err_with(|| format!("Failed to parse -I population sizes: {command:?}"))?;
                    if sizes.len() != npop {
                        return Err(eyre!("Expected {npop} population sizes after -I: {command:?}"));
                    }
                    self.population_sizes = sizes;
                    i += 2 + npop;
                }
                _ => i += 1,
            }
        }

        if self.population_sizes.is_empty() {
            self.population_sizes = vec![self.haplotypes];
        }
        let total: usize = self.population_sizes.iter().sum();
        if total != self.haplotypes {
            return Err(eyre!(
                "Population sizes {:?} sum to {total}, but the sample size is {}.",
                self.population_sizes,
                self.haplotypes
            ));
        }
        if self.haplotypes < FOCAL_HAPLOTYPES {
            return Err(eyre!(
                "Sample size {} is too small, the subject and control need {FOCAL_HAPLOTYPES} haplotypes.",
                self.haplotypes
            ));
        }
        if self.chromosome_length == 0 {
            warn!("No -r option found, site positions will be scaled by the number of segregating sites.");
        }

        Ok(())
    }

    fn next_line(&mut self) -> Result<Option<String>, Report> {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                let line =
                    line.wrap_err_with(|| format!("Failed to read line {}", self.line_number))?;
                Ok(Some(line))
            }
            None => Ok(None),
        }
    }

    /// Returns the next line, treating end of input as an error.
    fn expect_line(&mut self, what: &str) -> Result<String, Report> {
        self.next_line()?.ok_or_else(|| {
            eyre!(
                "Unexpected end of input in replicate {} while reading {what}.",
                self.replicates
            )
        })
    }

    fn parse_segsites(&self, line: &str) -> Result<usize, Report> {
        line.trim_start_matches("segsites:").trim().parse().wrap_err_with(|| {
            format!("Failed to parse segregating sites on line {}: {line:?}", self.line_number)
        })
    }

    fn parse_positions(&self, line: &str, segsites: usize) -> Result<Vec<f64>, Report> {
        let line_number = self.line_number;
        let positions = line
            .strip_prefix("positions:")
            .ok_or_else(|| eyre!("Expected positions on line {line_number}, found: {line:?}"))?
            .split_whitespace()
            .map(|p| p.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err_with(|| format!("Failed to parse positions on line {line_number}"))?;

        if positions.len() != segsites {
            return Err(eyre!(
                "Replicate {} lists {} positions but {segsites} segregating sites (line {line_number}).",
                self.replicates,
                positions.len()
            ));
        }
        Ok(positions)
    }

    fn parse_haplotype(&self, line: &str) -> Result<Vec<u8>, Report> {
        line.trim()
            .bytes()
            .map(|b| match b {
                b'0' => Ok(0),
                b'1' => Ok(1),
                _ => Err(eyre!(
                    "Unexpected allele {:?} on line {}, only 0 and 1 are supported.",
                    b as char,
                    self.line_number
                )),
            })
            .collect()
    }
}

impl<R> SimulationReader for MsReader<R>
where
    R: BufRead,
{
    fn next_replicate(&mut self) -> Result<Option<Replicate>, Report> {
        // skip the seed line and blank lines up to the replicate delimiter
        loop {
            match self.next_line()? {
                Some(line) if line.starts_with("//") => break,
                Some(_) => continue,
                None => return Ok(None),
            }
        }
        self.replicates += 1;

        // trees, times, and probabilities may precede the segregating sites
        let segsites = loop {
            let line = self.expect_line("segsites")?;
            if line.starts_with("segsites:") {
                break self.parse_segsites(&line)?;
            }
        };

        let (positions, haplotypes) = match segsites {
            0 => (Vec::new(), vec![Vec::new(); self.haplotypes]),
            _ => {
                let line = self.expect_line("positions")?;
                let positions = self.parse_positions(&line, segsites)?;
                let mut haplotypes = Vec::with_capacity(self.haplotypes);
                while haplotypes.len() < self.haplotypes {
                    let line = self.expect_line("haplotypes")?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    haplotypes.push(self.parse_haplotype(&line)?);
                }
                (positions, haplotypes)
            }
        };

        let replicate =
            Replicate::new(self.replicates, self.population_sizes.clone(), positions, haplotypes)
                .wrap_err_with(|| format!("Malformed replicate ending on line {}", self.line_number))?;
        debug!("Read replicate {} with {segsites} segregating sites.", replicate.index);

        Ok(Some(replicate))
    }

    fn population_sizes(&self) -> &[usize] {
        &self.population_sizes
    }

    fn chromosome_length(&self) -> usize {
        self.chromosome_length
    }
}
