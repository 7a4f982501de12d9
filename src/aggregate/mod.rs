//! Accumulation of sampled sites across replicates.


use crate::library::{Libraries, LibrarySampler};
use crate::simulation::Replicate;
use crate::site::position::{global_position, translate, NAMESPACE};
use crate::site::{split_column, BackgroundCounts, Focal, FrequencyFilter};
use color_eyre::eyre::{Report, Result, WrapErr};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// SiteRecord
// ----------------------------------------------------------------------------

/// A retained site, with everything the output artifacts need.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SiteRecord {
    /// Replicate index, 1-based.
    pub replicate: usize,
    /// Site number within the replicate, 1-based.
    pub site: usize,
    /// Translated coordinate within the replicate.
    pub local_position: u64,
    /// Coordinate in the replicate's namespace.
    pub position: u64,
    /// Subject and control haplotypes.
    pub focal: Focal,
    /// Background alleles (0 or 1).
    pub background: Vec<u8>,
    /// Calls of every library.
    pub libraries: Libraries,
}

impl SiteRecord {
    /// Identifier written to the legend, ex. `sim2_seg14`.
    pub fn id(&self) -> String {
        format!("sim{}_seg{}", self.replicate, self.site)
    }
}

/// A site that passed the frequency filter and awaits library sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub replicate: usize,
    pub site: usize,
    pub local_position: u64,
    pub focal: Focal,
    pub background: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Aggregator
// ----------------------------------------------------------------------------

/// Sites and counters accumulated over every replicate of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregator {
    /// Rows for the output artifacts, in replicate and site order.
    pub records: Vec<SiteRecord>,
    /// Replicates processed.
    pub replicates: usize,
    /// Segregating sites seen, over all replicates.
    pub segregating_sites: usize,
    /// Sites that passed the frequency filter.
    pub filtered_sites: usize,
    /// Filtered sites dropped because no library observed an allele.
    pub excluded_sites: usize,
    /// Library calls drawn.
    pub calls: usize,
    /// Library calls that observed an allele.
    pub observed_calls: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sampled candidate. Rows where every library is missing are
    /// counted but not kept, so every artifact skips them together.
    ///
    /// Returns `true` if the site was kept.
    pub fn add_site(&mut self, candidate: Candidate, libraries: Libraries) -> bool {
        self.calls += libraries.calls().count();
        self.observed_calls += libraries.observed();

        if libraries.is_missing() {
            self.excluded_sites += 1;
            return false;
        }

        let record = SiteRecord {
            replicate: candidate.replicate,
            site: candidate.site,
            local_position: candidate.local_position,
            position: global_position(candidate.replicate, candidate.local_position),
            focal: candidate.focal,
            background: candidate.background,
            libraries,
        };
        self.records.push(record);
        true
    }

    /// Fraction of processed segregating sites, over all replicates, that
    /// were kept as rows.
    pub fn realized_retention(&self) -> f64 {
        match self.segregating_sites {
            0 => 0.0,
            sites => self.records.len() as f64 / sites as f64,
        }
    }

    /// Fraction of library calls that observed an allele.
    pub fn call_retention(&self) -> f64 {
        match self.calls {
            0 => 0.0,
            calls => self.observed_calls as f64 / calls as f64,
        }
    }
}

// ----------------------------------------------------------------------------
// Pipeline
// ----------------------------------------------------------------------------

/// Per-replicate transformation: translate, filter, and sample every site.
#[derive(Clone, Debug)]
pub struct Pipeline {
    /// Nominal chromosome length.
    pub length: usize,
    pub filter: FrequencyFilter,
    pub sampler: LibrarySampler,
}

impl Pipeline {
    pub fn new(length: usize, filter: FrequencyFilter, sampler: LibrarySampler) -> Self {
        Pipeline { length, filter, sampler }
    }

    /// Fold one replicate into the [`Aggregator`].
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use mslib::aggregate::{Aggregator, Pipeline};
    /// use mslib::library::LibrarySampler;
    /// use mslib::simulation::Replicate;
    /// use mslib::site::FrequencyFilter;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let haplotypes = vec![vec![0], vec![1], vec![1], vec![1], vec![0], vec![1]];
    /// let replicate = Replicate::new(2, vec![6], vec![0.5], haplotypes)?;
    /// let pipeline = Pipeline::new(100, FrequencyFilter::default(), LibrarySampler::new(1.0, 1, 1)?);
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let aggregator = pipeline.process(Aggregator::new(), &replicate, &mut rng)?;
    /// assert_eq!(aggregator.records[0].position, 1_000_050);
    /// assert_eq!(aggregator.records[0].id(), "sim2_seg1");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn process<R>(
        &self,
        mut aggregator: Aggregator,
        replicate: &Replicate,
        rng: &mut R,
    ) -> Result<Aggregator, Report>
    where
        R: Rng + ?Sized,
    {
        let positions = translate(&replicate.positions, self.length);
        if let Some(last) = positions.iter().max().filter(|p| **p >= NAMESPACE) {
            warn!(
                "Replicate {} has a site at {last}, which overlaps the next replicate's coordinates.",
                replicate.index
            );
        }

        let before = aggregator.records.len();
        for (i, local_position) in positions.into_iter().enumerate() {
            aggregator.segregating_sites += 1;

            let column = replicate.column(i);
            let (focal, background) = split_column(&column)
                .wrap_err_with(|| format!("Replicate {} site {}", replicate.index, i + 1))?;
            if !self.filter.passes(&BackgroundCounts::from_column(background)) {
                continue;
            }
            aggregator.filtered_sites += 1;

            let candidate = Candidate {
                replicate: replicate.index,
                site: i + 1,
                local_position,
                focal,
                background: background.to_vec(),
            };
            let libraries = self.sampler.sample(&candidate.focal, rng);
            aggregator.add_site(candidate, libraries);
        }
        aggregator.replicates += 1;

        debug!(
            "Replicate {}: {} of {} sites kept.",
            replicate.index,
            aggregator.records.len() - before,
            replicate.segregating_sites()
        );

        Ok(aggregator)
    }
}
