//! Replicates of a coalescent simulation and the readers that supply them.

pub mod ms;
#[cfg(test)]
mod tests;

#[doc(inline)]
pub use ms::MsReader;

use color_eyre::eyre::{eyre, Report, Result};

/// Number of leading haplotypes that belong to the subject and the control.
pub const FOCAL_HAPLOTYPES: usize = 4;

// ----------------------------------------------------------------------------
// Replicate
// ----------------------------------------------------------------------------

/// One independent simulated genotype matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Replicate {
    /// Simulation index, 1-based.
    pub index: usize,
    /// Sizes of the sampled populations.
    pub population_sizes: Vec<usize>,
    /// Ascending site positions in [0, 1).
    pub positions: Vec<f64>,
    /// Haplotypes (rows) by sites (columns), cells are 0 or 1.
    pub haplotypes: Vec<Vec<u8>>,
}

impl Replicate {
    /// Build a [`Replicate`], checking the matrix shape and cell values.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use mslib::simulation::Replicate;
    /// let haplotypes = vec![vec![0, 1], vec![1, 0], vec![0, 0], vec![1, 1], vec![0, 1]];
    /// let replicate = Replicate::new(1, vec![5], vec![0.25, 0.75], haplotypes)?;
    /// assert_eq!(replicate.segregating_sites(), 2);
    /// assert_eq!(replicate.column(1), vec![1, 0, 0, 1, 1]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new(
        index: usize,
        population_sizes: Vec<usize>,
        positions: Vec<f64>,
        haplotypes: Vec<Vec<u8>>,
    ) -> Result<Self, Report> {
        if index == 0 {
            return Err(eyre!("Replicate indices are 1-based, found 0."));
        }
        if haplotypes.len() < FOCAL_HAPLOTYPES {
            return Err(eyre!(
                "Replicate {index} has {} haplotypes, at least {FOCAL_HAPLOTYPES} are required for the subject and control.",
                haplotypes.len()
            ));
        }
        if let Some(p) = positions.iter().find(|p| !(0.0..1.0).contains(*p)) {
            return Err(eyre!("Replicate {index} has a site position outside [0, 1): {p}"));
        }
        for (row, haplotype) in haplotypes.iter().enumerate() {
            if haplotype.len() != positions.len() {
                return Err(eyre!(
                    "Replicate {index} haplotype {} has {} sites, expected {}.",
                    row + 1,
                    haplotype.len(),
                    positions.len()
                ));
            }
            if let Some(cell) = haplotype.iter().find(|c| **c > 1) {
                return Err(eyre!(
                    "Replicate {index} haplotype {} has a non-binary allele: {cell}",
                    row + 1
                ));
            }
        }

        Ok(Replicate { index, population_sizes, positions, haplotypes })
    }

    /// Number of segregating sites.
    pub fn segregating_sites(&self) -> usize {
        self.positions.len()
    }

    /// Alleles of every haplotype at one site.
    pub fn column(&self, site: usize) -> Vec<u8> {
        self.haplotypes.iter().map(|haplotype| haplotype[site]).collect()
    }
}

// ----------------------------------------------------------------------------
// Reader
// ----------------------------------------------------------------------------

/// A source of simulation [`Replicate`]s, consumed one at a time.
pub trait SimulationReader {
    /// Returns the next replicate, or [`None`] once the simulation is exhausted.
    fn next_replicate(&mut self) -> Result<Option<Replicate>, Report>;

    /// Sizes of the sampled populations, from the invocation parameters.
    fn population_sizes(&self) -> &[usize];

    /// Nominal sequence length, from the invocation parameters.
    fn chromosome_length(&self) -> usize;
}
