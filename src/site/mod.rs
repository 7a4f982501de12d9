//! Per-site handling of a replicate: focal haplotypes, background
//! frequencies, and [coordinates](position).

pub mod position;
#[cfg(test)]
mod tests;

use crate::simulation::FOCAL_HAPLOTYPES;
use color_eyre::eyre::{eyre, Report, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// Allele
// ----------------------------------------------------------------------------

/// A binary allele, written as `A` (ancestral, 0) or `T` (derived, 1).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Allele {
    Ancestral,
    Derived,
}

impl Display for Allele {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Allele::Ancestral => write!(f, "A"),
            Allele::Derived => write!(f, "T"),
        }
    }
}

impl TryFrom<u8> for Allele {
    type Error = Report;
    fn try_from(allele: u8) -> Result<Self, Report> {
        match allele {
            0 => Ok(Allele::Ancestral),
            1 => Ok(Allele::Derived),
            _ => Err(eyre!("Unexpected allele {allele}, only 0 and 1 are supported.")),
        }
    }
}

// ----------------------------------------------------------------------------
// Focal
// ----------------------------------------------------------------------------

/// Alleles of the subject and control at one site.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Focal {
    /// Haplotypes 0 and 1.
    pub subject: [Allele; 2],
    /// Haplotypes 2 and 3.
    pub control: [Allele; 2],
}

/// Split a site's column into the [`Focal`] alleles and the background.
///
/// ## Examples
///
/// ```rust
/// use mslib::site::{split_column, Allele::*};
///
/// let (focal, background) = split_column(&[0, 1, 1, 1, 0, 0, 1])?;
/// assert_eq!(focal.subject, [Ancestral, Derived]);
/// assert_eq!(focal.control, [Derived, Derived]);
/// assert_eq!(background, &[0, 0, 1]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn split_column(column: &[u8]) -> Result<(Focal, &[u8]), Report> {
    if column.len() < FOCAL_HAPLOTYPES {
        return Err(eyre!(
            "Site has {} haplotypes, at least {FOCAL_HAPLOTYPES} are required.",
            column.len()
        ));
    }
    let (focal, background) = column.split_at(FOCAL_HAPLOTYPES);
    let focal = Focal {
        subject: [Allele::try_from(focal[0])?, Allele::try_from(focal[1])?],
        control: [Allele::try_from(focal[2])?, Allele::try_from(focal[3])?],
    };
    Ok((focal, background))
}

// ----------------------------------------------------------------------------
// Background Frequency
// ----------------------------------------------------------------------------

/// Allele counts among the background haplotypes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BackgroundCounts {
    pub ancestral: usize,
    pub derived: usize,
}

impl BackgroundCounts {
    pub fn new(ancestral: usize, derived: usize) -> Self {
        BackgroundCounts { ancestral, derived }
    }

    /// Count alleles in a background column.
    pub fn from_column(background: &[u8]) -> Self {
        let derived = background.iter().filter(|a| **a == 1).count();
        BackgroundCounts { ancestral: background.len() - derived, derived }
    }

    /// Minor over major allele count, [`None`] when the background is empty.
    ///
    /// ```rust
    /// use mslib::site::BackgroundCounts;
    /// assert_eq!(BackgroundCounts::new(3, 1).ratio(), Some(1.0 / 3.0));
    /// assert_eq!(BackgroundCounts::new(0, 7).ratio(), Some(0.0));
    /// assert_eq!(BackgroundCounts::new(0, 0).ratio(), None);
    /// ```
    pub fn ratio(&self) -> Option<f64> {
        let major = self.ancestral.max(self.derived);
        let minor = self.ancestral.min(self.derived);
        (major > 0).then(|| minor as f64 / major as f64)
    }
}

/// Retains sites whose background frequency ratio clears a minimum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyFilter {
    pub min_frequency: f64,
}

impl Default for FrequencyFilter {
    fn default() -> Self {
        FrequencyFilter { min_frequency: 0.1 }
    }
}

impl FrequencyFilter {
    pub fn new(min_frequency: f64) -> Self {
        FrequencyFilter { min_frequency }
    }

    /// A site passes if its [ratio](BackgroundCounts::ratio) is at least the
    /// minimum. An empty background never passes.
    pub fn passes(&self, counts: &BackgroundCounts) -> bool {
        match counts.ratio() {
            Some(ratio) => ratio >= self.min_frequency,
            None => false,
        }
    }
}
