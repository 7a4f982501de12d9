use crate::library::{Call, Libraries, LibrarySampler, MISSING};
use crate::site::{Allele, Focal};
use color_eyre::eyre::{Report, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HETEROZYGOUS: [Allele; 2] = [Allele::Ancestral, Allele::Derived];

fn non_missing_rate(probability: f64, trials: usize, seed: u64) -> Result<f64, Report> {
    let sampler = LibrarySampler::new(probability, 1, 1)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let observed =
        (0..trials).filter(|_| !sampler.draw(&HETEROZYGOUS, &mut rng).is_missing()).count();
    Ok(observed as f64 / trials as f64)
}

#[test]
fn top_is_floor_of_inverse() -> Result<(), Report> {
    assert_eq!(LibrarySampler::new(0.5, 1, 1)?.top(), 2);
    assert_eq!(LibrarySampler::new(0.3, 1, 1)?.top(), 3);
    assert_eq!(LibrarySampler::new(0.01, 1, 1)?.top(), 100);
    assert_eq!(LibrarySampler::new(1.0, 1, 1)?.top(), 1);
    Ok(())
}

#[test]
fn tiny_probability_is_sampled() -> Result<(), Report> {
    // beyond the range of a 32-bit draw
    let sampler = LibrarySampler::new(2f64.powi(-40), 1, 1)?;
    assert_eq!(sampler.top(), 1 << 40);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(sampler.draw(&HETEROZYGOUS, &mut rng).is_missing());
    Ok(())
}

#[test]
fn reject_invalid_probability() {
    for probability in [0.0, -0.1, 1.5, f64::NAN] {
        assert!(LibrarySampler::new(probability, 1, 1).is_err(), "{probability}");
    }
}

#[test]
fn theoretical_retention() -> Result<(), Report> {
    assert_eq!(LibrarySampler::new(0.5, 1, 1)?.theoretical_retention(), 0.5);
    let retention = LibrarySampler::new(0.01, 1, 1)?.theoretical_retention();
    assert!((retention - 0.0198).abs() < 1e-12);
    Ok(())
}

#[test]
fn draw_follows_target_scheme() -> Result<(), Report> {
    let sampler = LibrarySampler::new(0.25, 1, 1)?;
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..1_000 {
        // replay the same stream to see the three draws
        let mut replay = rng.clone();
        let target = replay.gen_range(1..=4u64);
        let first = replay.gen_range(1..=4u64);
        let second = replay.gen_range(1..=4u64);

        let expected = if first == target && second != target {
            Call(Some(Allele::Ancestral))
        } else if second == target && first != target {
            Call(Some(Allele::Derived))
        } else {
            Call(None)
        };
        assert_eq!(sampler.draw(&HETEROZYGOUS, &mut rng), expected);
    }
    Ok(())
}

#[test]
fn half_probability_converges_to_half() -> Result<(), Report> {
    let rate = non_missing_rate(0.5, 100_000, 1)?;
    assert!((rate - 0.5).abs() < 0.01, "rate: {rate}");
    Ok(())
}

#[test]
fn small_probability_converges_to_zero() -> Result<(), Report> {
    let rate = non_missing_rate(0.001, 100_000, 2)?;
    assert!(rate < 0.005, "rate: {rate}");
    Ok(())
}

#[test]
fn both_haplotypes_are_observed() -> Result<(), Report> {
    let sampler = LibrarySampler::new(0.5, 1, 1)?;
    let mut rng = StdRng::seed_from_u64(3);
    let calls: Vec<Call> = (0..1_000).map(|_| sampler.draw(&HETEROZYGOUS, &mut rng)).collect();
    assert!(calls.contains(&Call(Some(Allele::Ancestral))));
    assert!(calls.contains(&Call(Some(Allele::Derived))));
    assert!(calls.contains(&Call(None)));
    Ok(())
}

#[test]
fn single_slot_always_observes_first_haplotype() -> Result<(), Report> {
    let sampler = LibrarySampler::new(1.0, 3, 2)?;
    let mut rng = StdRng::seed_from_u64(5);
    let focal = Focal {
        subject: [Allele::Derived, Allele::Ancestral],
        control: [Allele::Ancestral, Allele::Derived],
    };
    let libraries = sampler.sample(&focal, &mut rng);
    assert_eq!(libraries.subject, vec![Call(Some(Allele::Derived)); 3]);
    assert_eq!(libraries.control, vec![Call(Some(Allele::Ancestral)); 2]);
    Ok(())
}

#[test]
fn sample_library_counts() -> Result<(), Report> {
    let sampler = LibrarySampler::new(0.1, 4, 2)?;
    let mut rng = StdRng::seed_from_u64(9);
    let focal = Focal { subject: HETEROZYGOUS, control: HETEROZYGOUS };
    let libraries = sampler.sample(&focal, &mut rng);
    assert_eq!(libraries.subject.len(), 4);
    assert_eq!(libraries.control.len(), 2);
    assert_eq!(libraries.calls().count(), 6);
    Ok(())
}

#[test]
fn missing_libraries() {
    let none = Libraries { subject: vec![Call(None); 2], control: vec![Call(None)] };
    assert!(none.is_missing());
    assert_eq!(none.observed(), 0);
    assert_eq!(none.to_string(), format!("{MISSING}\t{MISSING} {MISSING}"));

    let one = Libraries { subject: vec![Call(None)], control: vec![Call(Some(Allele::Derived))] };
    assert!(!one.is_missing());
    assert_eq!(one.observed(), 1);
    assert_eq!(one.to_string(), "N T");
}
