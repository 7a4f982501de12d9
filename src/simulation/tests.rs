use crate::simulation::{MsReader, Replicate, SimulationReader};
use color_eyre::eyre::{Report, Result};
use indoc::indoc;

const TWO_POPULATIONS: &str = indoc! {"
    ms 6 2 -t 4.0 -r 2.0 10000 -I 2 4 2 1.0
    27473 36154 10290

    //
    segsites: 3
    positions: 0.1250 0.5000 0.8125
    010
    100
    011
    001
    110
    000

    //
    time:\t1.2\t3.4
    segsites: 2
    positions: 0.2000 0.2001
    01
    10
    11
    00
    01
    10
"};

#[test]
fn parse_command() -> Result<(), Report> {
    let reader = MsReader::new(TWO_POPULATIONS.as_bytes())?;
    assert_eq!(reader.chromosome_length(), 10_000);
    assert_eq!(reader.population_sizes(), &[4, 2]);
    Ok(())
}

#[test]
fn read_replicates_in_order() -> Result<(), Report> {
    let mut reader = MsReader::new(TWO_POPULATIONS.as_bytes())?;

    let first = reader.next_replicate()?.expect("first replicate");
    assert_eq!(first.index, 1);
    assert_eq!(first.positions, vec![0.125, 0.5, 0.8125]);
    assert_eq!(first.haplotypes.len(), 6);
    assert_eq!(first.column(0), vec![0, 1, 0, 0, 1, 0]);
    assert_eq!(first.column(2), vec![0, 0, 1, 1, 0, 0]);

    let second = reader.next_replicate()?.expect("second replicate");
    assert_eq!(second.index, 2);
    assert_eq!(second.segregating_sites(), 2);
    assert_eq!(second.population_sizes, vec![4, 2]);

    assert!(reader.next_replicate()?.is_none());
    // exhaustion is sticky
    assert!(reader.next_replicate()?.is_none());
    Ok(())
}

#[test]
fn single_population_without_recombination() -> Result<(), Report> {
    let text = "ms 5 1 -t 1.0\n1 2 3\n\n//\nsegsites: 1\npositions: 0.3\n0\n1\n0\n1\n1\n";
    let mut reader = MsReader::new(text.as_bytes())?;
    assert_eq!(reader.chromosome_length(), 0);
    assert_eq!(reader.population_sizes(), &[5]);
    let replicate = reader.next_replicate()?.expect("replicate");
    assert_eq!(replicate.column(0), vec![0, 1, 0, 1, 1]);
    Ok(())
}

#[test]
fn no_segregating_sites() -> Result<(), Report> {
    let text = "ms 4 2 -t 0.1 -r 1 100\n1 2 3\n\n//\nsegsites: 0\n\n//\nsegsites: 1\npositions: 0.5\n0\n1\n0\n1\n";
    let mut reader = MsReader::new(text.as_bytes())?;

    let empty = reader.next_replicate()?.expect("empty replicate");
    assert_eq!(empty.segregating_sites(), 0);
    assert_eq!(empty.haplotypes.len(), 4);

    let next = reader.next_replicate()?.expect("second replicate");
    assert_eq!(next.index, 2);
    assert_eq!(next.segregating_sites(), 1);
    Ok(())
}

#[test]
fn float_number_of_sites() -> Result<(), Report> {
    let reader = MsReader::new("ms 4 1 -t 1 -r 1 1e6\n".as_bytes())?;
    assert_eq!(reader.chromosome_length(), 1_000_000);
    Ok(())
}

#[test]
fn reject_malformed_input() {
    // empty input
    assert!(MsReader::new("".as_bytes()).is_err());
    // too few haplotypes for the subject and control
    assert!(MsReader::new("ms 3 1 -t 1\n".as_bytes()).is_err());
    // population sizes disagree with the sample size
    assert!(MsReader::new("ms 6 1 -t 1 -I 2 4 3\n".as_bytes()).is_err());

    // position count disagrees with segsites
    let text = "ms 4 1 -t 1\n1\n\n//\nsegsites: 2\npositions: 0.5\n0\n1\n0\n1\n";
    let mut reader = MsReader::new(text.as_bytes()).expect("valid command");
    assert!(reader.next_replicate().is_err());

    // non-binary allele
    let text = "ms 4 1 -t 1\n1\n\n//\nsegsites: 1\npositions: 0.5\n0\n2\n0\n1\n";
    let mut reader = MsReader::new(text.as_bytes()).expect("valid command");
    assert!(reader.next_replicate().is_err());

    // truncated haplotypes
    let text = "ms 4 1 -t 1\n1\n\n//\nsegsites: 1\npositions: 0.5\n0\n1\n";
    let mut reader = MsReader::new(text.as_bytes()).expect("valid command");
    assert!(reader.next_replicate().is_err());
}

#[test]
fn replicate_validation() {
    let rows = vec![vec![0, 1]; 4];
    assert!(Replicate::new(0, vec![4], vec![0.1, 0.2], rows.clone()).is_err());
    assert!(Replicate::new(1, vec![4], vec![0.1, 1.0], rows.clone()).is_err());
    assert!(Replicate::new(1, vec![4], vec![0.1], rows.clone()).is_err());
    assert!(Replicate::new(1, vec![3], vec![0.1, 0.2], rows[..3].to_vec()).is_err());
    assert!(Replicate::new(1, vec![4], vec![0.1, 0.2], rows).is_ok());
}
