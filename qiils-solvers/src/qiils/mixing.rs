use super::angles::AngleConfiguration;
use crate::seeded_rng;
use rand::seq::index::sample;

/// Number of vertices a mixing step touches: `floor(n * p)`, at least one, at most `n`.
pub fn mixing_count(num_vertices: usize, perturbation: f64) -> usize {
    ((num_vertices as f64 * perturbation).floor() as usize)
        .max(1)
        .min(num_vertices)
}

/// Distinct vertices to reflect before `attempt`, drawn from that attempt's generator.
pub fn mixing_indices(num_vertices: usize, perturbation: f64, seed: u64, attempt: u64) -> Vec<usize> {
    let mut rng = seeded_rng(seed, attempt);
    sample(&mut rng, num_vertices, mixing_count(num_vertices, perturbation)).into_vec()
}

/// Reflects the selected angles and returns how many were touched.
pub fn mix(angles: &mut AngleConfiguration, perturbation: f64, seed: u64, attempt: u64) -> usize {
    let indices = mixing_indices(angles.len(), perturbation, seed, attempt);
    for &i in &indices {
        angles.reflect(i);
    }
    angles.refresh_all();
    indices.len()
}
