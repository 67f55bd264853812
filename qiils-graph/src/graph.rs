use crate::{GraphError, GraphResult};
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Fixed seeds keep edge de-duplication independent of process-level hashing state.
fn edge_hasher() -> RandomState {
    RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub weight: f64,
}

/// Immutable weighted undirected graph with a CSR adjacency index.
///
/// Vertices are `0..num_vertices`. Each unordered pair appears at most once: when the
/// input repeats a pair the later weight replaces the earlier one, keeping the first
/// position in edge order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGraph {
    num_vertices: usize,
    edges: Vec<Edge>,
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
    neighbor_weights: Vec<f64>,
}

impl WeightedGraph {
    pub fn new<I>(num_vertices: usize, edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        if num_vertices == 0 {
            return Err(GraphError::EmptyGraph);
        }

        let mut index_of: HashMap<(usize, usize), usize, RandomState> =
            HashMap::with_hasher(edge_hasher());
        let mut unique: Vec<Edge> = Vec::new();
        for (u, v, weight) in edges {
            for vertex in [u, v] {
                if vertex >= num_vertices {
                    return Err(GraphError::VertexOutOfRange {
                        vertex,
                        num_vertices,
                    });
                }
            }
            if u == v {
                return Err(GraphError::SelfLoop { vertex: u });
            }
            if !weight.is_finite() {
                return Err(GraphError::InvalidWeight { u, v, weight });
            }
            let key = (u.min(v), u.max(v));
            match index_of.get(&key) {
                Some(&idx) => unique[idx].weight = weight,
                None => {
                    index_of.insert(key, unique.len());
                    unique.push(Edge { u, v, weight });
                }
            }
        }

        let mut degrees = vec![0usize; num_vertices];
        for edge in &unique {
            degrees[edge.u] += 1;
            degrees[edge.v] += 1;
        }
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        offsets.push(0);
        for d in &degrees {
            offsets.push(offsets[offsets.len() - 1] + d);
        }

        let mut cursor = offsets[..num_vertices].to_vec();
        let mut neighbors = vec![0usize; offsets[num_vertices]];
        let mut neighbor_weights = vec![0.0f64; offsets[num_vertices]];
        for edge in &unique {
            neighbors[cursor[edge.u]] = edge.v;
            neighbor_weights[cursor[edge.u]] = edge.weight;
            cursor[edge.u] += 1;
            neighbors[cursor[edge.v]] = edge.u;
            neighbor_weights[cursor[edge.v]] = edge.weight;
            cursor[edge.v] += 1;
        }

        Ok(Self {
            num_vertices,
            edges: unique,
            offsets,
            neighbors,
            neighbor_weights,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.offsets[vertex + 1] - self.offsets[vertex]
    }

    /// Neighbours of `vertex` paired with the connecting edge weight.
    #[inline]
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.offsets[vertex]..self.offsets[vertex + 1];
        self.neighbors[range.clone()]
            .iter()
            .copied()
            .zip(self.neighbor_weights[range].iter().copied())
    }

    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        if u >= self.num_vertices || v >= self.num_vertices {
            return None;
        }
        self.neighbors(u).find(|&(j, _)| j == v).map(|(_, w)| w)
    }

    /// Sum of all edge weights, `W` in `cut = (W - E) / 2`.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }
}
