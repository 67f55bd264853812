use crate::{GraphError, GraphResult, WeightedGraph};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const MAX_PAIRING_ROUNDS: usize = 1000;

/// Random `degree`-regular graph on `num_vertices` vertices.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RandomRegular {
    pub num_vertices: usize,
    pub degree: usize,
    pub weighted: bool,
}

impl RandomRegular {
    pub fn new(num_vertices: usize, degree: usize, weighted: bool) -> Self {
        Self {
            num_vertices,
            degree,
            weighted,
        }
    }

    pub fn generate_instance(&self, seed: u64) -> GraphResult<WeightedGraph> {
        let n = self.num_vertices;
        let k = self.degree;
        if n == 0 {
            return Err(GraphError::EmptyGraph);
        }
        if k >= n {
            return Err(GraphError::InvalidGenerator {
                reason: format!("degree {} must be smaller than vertex count {}", k, n),
            });
        }
        if (n * k) % 2 != 0 {
            return Err(GraphError::InvalidGenerator {
                reason: format!("vertex count {} times degree {} must be even", n, k),
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let pairs = (0..MAX_PAIRING_ROUNDS)
            .find_map(|_| try_pairing(n, k, &mut rng))
            .ok_or_else(|| GraphError::InvalidGenerator {
                reason: format!(
                    "no {}-regular graph on {} vertices after {} pairing rounds",
                    k, n, MAX_PAIRING_ROUNDS
                ),
            })?;

        let weighted = self.weighted;
        let edges: Vec<(usize, usize, f64)> = pairs
            .into_iter()
            .map(|(u, v)| {
                // uniform on (0, 1]
                let w = if weighted { 1.0 - rng.gen::<f64>() } else { 1.0 };
                (u, v, w)
            })
            .collect();
        WeightedGraph::new(n, edges)
    }
}

/// One pairing round of the stub-matching construction. Unusable stub pairs are pooled
/// and re-paired until none remain, or `None` once no valid pair can be formed.
fn try_pairing(n: usize, k: usize, rng: &mut StdRng) -> Option<BTreeSet<(usize, usize)>> {
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut stubs: Vec<usize> = (0..n).flat_map(|v| std::iter::repeat(v).take(k)).collect();

    while !stubs.is_empty() {
        let mut potential: BTreeMap<usize, usize> = BTreeMap::new();
        stubs.shuffle(rng);
        for pair in stubs.chunks_exact(2) {
            let (s1, s2) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            if s1 != s2 && !edges.contains(&(s1, s2)) {
                edges.insert((s1, s2));
            } else {
                *potential.entry(s1).or_insert(0) += 1;
                *potential.entry(s2).or_insert(0) += 1;
            }
        }
        if !suitable(&edges, &potential) {
            return None;
        }
        stubs = potential
            .iter()
            .flat_map(|(&v, &count)| std::iter::repeat(v).take(count))
            .collect();
    }
    Some(edges)
}

fn suitable(edges: &BTreeSet<(usize, usize)>, potential: &BTreeMap<usize, usize>) -> bool {
    if potential.is_empty() {
        return true;
    }
    let vertices: Vec<usize> = potential.keys().copied().collect();
    for (i, &s1) in vertices.iter().enumerate() {
        for &s2 in &vertices[..i] {
            if !edges.contains(&(s2.min(s1), s2.max(s1))) {
                return true;
            }
        }
    }
    false
}
