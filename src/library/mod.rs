//! Stochastic sequencing libraries with allelic dropout.
//!
//! Each library observes at most one of an individual's two haplotypes at a
//! site. Three integers are drawn uniformly from `1..=top`, where
//! `top = floor(1 / q)` for a preservation probability `q`: a target, then
//! one draw per haplotype. A library reports the allele of the single
//! haplotype whose draw hit the target. No hit or a hit on both haplotypes
//! reports nothing, so a call is made with probability close to `2q(1 - q)`.

#[cfg(test)]
mod tests;

use crate::site::{Allele, Focal};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Text written for a library that observed nothing.
pub const MISSING: &str = "N";

// ----------------------------------------------------------------------------
// Call
// ----------------------------------------------------------------------------

/// The allele observed by one library at one site, if any.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Call(pub Option<Allele>);

impl Call {
    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.0 {
            Some(allele) => write!(f, "{allele}"),
            None => write!(f, "{MISSING}"),
        }
    }
}

// ----------------------------------------------------------------------------
// Libraries
// ----------------------------------------------------------------------------

/// Calls of every library of the subject and the control at one site.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Libraries {
    pub subject: Vec<Call>,
    pub control: Vec<Call>,
}

impl Libraries {
    /// All calls, subject libraries first.
    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.subject.iter().chain(self.control.iter())
    }

    /// Number of libraries that observed an allele.
    pub fn observed(&self) -> usize {
        self.calls().filter(|call| !call.is_missing()).count()
    }

    /// True when no library of either individual observed an allele.
    pub fn is_missing(&self) -> bool {
        self.calls().all(Call::is_missing)
    }
}

/// Subject calls, a space, then control calls. Calls of one individual are
/// joined by TAB.
impl Display for Libraries {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.subject.iter().join("\t"), self.control.iter().join("\t"))
    }
}

// ----------------------------------------------------------------------------
// LibrarySampler
// ----------------------------------------------------------------------------

/// Draws library calls for the subject and the control.
#[derive(Clone, Debug, PartialEq)]
pub struct LibrarySampler {
    probability: f64,
    top: u64,
    pub subject_libraries: usize,
    pub control_libraries: usize,
}

impl LibrarySampler {
    /// Create a sampler for preservation probability `q` in (0, 1].
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use mslib::library::LibrarySampler;
    /// let sampler = LibrarySampler::new(0.3, 2, 1)?;
    /// assert_eq!(sampler.top(), 3);
    /// assert!(LibrarySampler::new(0.0, 1, 1).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new(
        probability: f64,
        subject_libraries: usize,
        control_libraries: usize,
    ) -> Result<Self, Report> {
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(eyre!("Preservation probability must be in (0, 1], found: {probability}")
                .suggestion("Sequencing protocols are usually modeled with q <= 0.5."));
        }
        let top = (1.0 / probability).floor();
        if top > u64::MAX as f64 {
            return Err(eyre!("Preservation probability {probability} is too small to sample."));
        }

        Ok(LibrarySampler { probability, top: top as u64, subject_libraries, control_libraries })
    }

    /// The configured preservation probability `q`.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Size of the range every draw is taken from, `floor(1 / q)`.
    pub fn top(&self) -> u64 {
        self.top
    }

    /// Expected fraction of libraries that observe an allele, `2q(1 - q)`.
    pub fn theoretical_retention(&self) -> f64 {
        2.0 * self.probability * (1.0 - self.probability)
    }

    /// Draw one library's call from an individual's two haplotypes.
    ///
    /// With `top = 1` every draw hits the target, and the call is always the
    /// first haplotype.
    pub fn draw<R>(&self, haplotypes: &[Allele; 2], rng: &mut R) -> Call
    where
        R: Rng + ?Sized,
    {
        if self.top == 1 {
            return Call(Some(haplotypes[0]));
        }

        let target = rng.gen_range(1..=self.top);
        let first = rng.gen_range(1..=self.top);
        let second = rng.gen_range(1..=self.top);

        match (first == target, second == target) {
            (true, false) => Call(Some(haplotypes[0])),
            (false, true) => Call(Some(haplotypes[1])),
            _ => Call(None),
        }
    }

    /// Draw every library of the subject, then every library of the control.
    pub fn sample<R>(&self, focal: &Focal, rng: &mut R) -> Libraries
    where
        R: Rng + ?Sized,
    {
        let subject = (0..self.subject_libraries).map(|_| self.draw(&focal.subject, rng)).collect();
        let control = (0..self.control_libraries).map(|_| self.draw(&focal.control, rng)).collect();
        Libraries { subject, control }
    }
}
