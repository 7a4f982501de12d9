use crate::site::position::{global_position, translate, NAMESPACE};
use crate::site::{split_column, Allele, BackgroundCounts, FrequencyFilter};
use color_eyre::eyre::{Report, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

// ----------------------------------------------------------------------------
// Positions

#[test]
fn translate_scales_by_length() {
    assert_eq!(translate(&[0.0, 0.25, 0.5, 0.75], 1000), vec![0, 250, 500, 750]);
    assert_eq!(translate(&[], 1000), Vec::<u64>::new());
}

#[test]
fn translate_raises_short_length_to_site_count() {
    // length 2 cannot hold 4 sites, the scale becomes 4
    assert_eq!(translate(&[0.0, 0.25, 0.5, 0.75], 2), vec![0, 1, 2, 3]);
}

#[test]
fn translate_collisions_check_earlier_sites_only() {
    // 1, 1 -> 2, 1 -> 3, then 2 collides with the shifted second site
    assert_eq!(translate(&[0.1, 0.1, 0.1, 0.2], 10), vec![1, 2, 3, 4]);
    // a shift can move a site by more than one slot
    assert_eq!(translate(&[0.5, 0.5, 0.5, 0.75], 8), vec![4, 5, 6, 7]);
    // later sites keep their slot when nothing earlier took it
    assert_eq!(translate(&[0.5, 0.5, 0.875], 8), vec![4, 5, 7]);
}

#[test]
fn translate_unsorted_input_keeps_first_come_slots() {
    // the first site claims slot 5, so the later, smaller position is pushed up
    assert_eq!(translate(&[0.5, 0.4, 0.4], 10), vec![5, 4, 6]);
}

#[test]
fn translate_is_unique_for_random_input() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let sites = rng.gen_range(1..200);
        let length = rng.gen_range(1..50);
        // coarse positions make collisions frequent
        let mut positions: Vec<f64> =
            (0..sites).map(|_| rng.gen_range(0..20) as f64 / 20.0).collect();
        positions.sort_by(|a, b| a.total_cmp(b));

        let translated = translate(&positions, length);
        let unique: HashSet<_> = translated.iter().collect();
        assert_eq!(unique.len(), translated.len(), "duplicates in {translated:?}");
    }
}

#[test]
fn global_positions_do_not_overlap() {
    let local = translate(&[0.1, 0.5, 0.9], 10_000);
    let first: HashSet<_> = local.iter().map(|p| global_position(1, *p)).collect();
    let second: HashSet<_> = local.iter().map(|p| global_position(2, *p)).collect();
    assert!(first.is_disjoint(&second));
    assert_eq!(global_position(2, 0), NAMESPACE);
}

// ----------------------------------------------------------------------------
// Focal Alleles

#[test]
fn split_recodes_focal_alleles() -> Result<(), Report> {
    let (focal, background) = split_column(&[1, 0, 0, 1])?;
    assert_eq!(focal.subject, [Allele::Derived, Allele::Ancestral]);
    assert_eq!(focal.control, [Allele::Ancestral, Allele::Derived]);
    assert!(background.is_empty());
    assert_eq!(focal.subject.map(|a| a.to_string()), ["T", "A"]);
    Ok(())
}

#[test]
fn split_rejects_short_columns() {
    assert!(split_column(&[0, 1, 0]).is_err());
    assert!(split_column(&[0, 1, 0, 2]).is_err());
}

// ----------------------------------------------------------------------------
// Frequency Filter

#[test]
fn counts_from_column() {
    assert_eq!(BackgroundCounts::from_column(&[0, 1, 1, 0, 0]), BackgroundCounts::new(3, 2));
    assert_eq!(BackgroundCounts::from_column(&[]), BackgroundCounts::new(0, 0));
}

#[test]
fn empty_background_never_passes() {
    let counts = BackgroundCounts::new(0, 0);
    for min_frequency in [0.0, 0.1, 0.5, 1.0] {
        assert!(!FrequencyFilter::new(min_frequency).passes(&counts));
    }
}

#[test]
fn balanced_background_always_passes() {
    let counts = BackgroundCounts::new(5, 5);
    for min_frequency in [0.0, 0.1, 0.5, 0.99, 1.0] {
        assert!(FrequencyFilter::new(min_frequency).passes(&counts));
    }
}

#[test]
fn ratio_threshold() {
    let filter = FrequencyFilter::default();
    assert_eq!(filter.min_frequency, 0.1);
    // 1 / 10 is exactly on the threshold
    assert!(filter.passes(&BackgroundCounts::new(10, 1)));
    assert!(filter.passes(&BackgroundCounts::new(1, 10)));
    assert!(!filter.passes(&BackgroundCounts::new(11, 1)));
    // fixed background, ratio 0
    assert!(!filter.passes(&BackgroundCounts::new(8, 0)));
    assert!(FrequencyFilter::new(0.0).passes(&BackgroundCounts::new(8, 0)));
}

#[test]
fn ratio_is_bounded() {
    for a in 0..12 {
        for d in 0..12 {
            if let Some(ratio) = BackgroundCounts::new(a, d).ratio() {
                assert!((0.0..=1.0).contains(&ratio));
            }
        }
    }
}
