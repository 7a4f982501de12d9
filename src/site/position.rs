//! Translation of continuous site positions to integer coordinates.

use std::collections::HashSet;

/// Width of the coordinate block reserved for each replicate.
pub const NAMESPACE: u64 = 1_000_000;

/// Returns the number of integer slots available to a replicate.
///
/// The nominal length is raised to the site count so that every site can
/// receive its own coordinate.
///
/// ```rust
/// use mslib::site::position::effective_length;
/// assert_eq!(effective_length(10_000, 25), 10_000);
/// assert_eq!(effective_length(10, 25), 25);
/// ```
pub fn effective_length(length: usize, sites: usize) -> usize {
    length.max(sites)
}

/// Translate ascending positions in [0, 1) to unique integer coordinates.
///
/// Each position is scaled by the [effective length](effective_length) and
/// floored. A coordinate that was already assigned to an earlier site is
/// incremented until it no longer matches any earlier coordinate. Later sites
/// are not consulted, so a run of collisions can push a site past its
/// successor.
///
/// ## Examples
///
/// ```rust
/// use mslib::site::position::translate;
///
/// assert_eq!(translate(&[0.1, 0.5, 0.9], 100), vec![10, 50, 90]);
/// // collisions shift forward
/// assert_eq!(translate(&[0.101, 0.102, 0.11], 100), vec![10, 11, 12]);
/// ```
pub fn translate(positions: &[f64], length: usize) -> Vec<u64> {
    let scale = effective_length(length, positions.len()) as f64;
    let mut finalized = HashSet::with_capacity(positions.len());

    positions
        .iter()
        .map(|p| {
            let mut coord = (p * scale).floor() as u64;
            while finalized.contains(&coord) {
                coord += 1;
            }
            finalized.insert(coord);
            coord
        })
        .collect()
}

/// Place a replicate's local coordinate into its own block of the genome.
///
/// ```rust
/// use mslib::site::position::global_position;
/// assert_eq!(global_position(1, 42), 42);
/// assert_eq!(global_position(3, 42), 2_000_042);
/// ```
pub fn global_position(replicate: usize, local: u64) -> u64 {
    NAMESPACE * (replicate as u64 - 1) + local
}
