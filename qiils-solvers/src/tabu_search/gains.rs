use qiils_graph::{
    objective::{delta_if_flipped, flip},
    Spin, WeightedGraph,
};

/// Per-vertex flip gains kept in step with a spin configuration.
///
/// `apply_flip` is the O(degree) incremental path used by the search; `refresh` rebuilds
/// every entry from scratch and is what the incremental path must agree with.
#[derive(Debug, Clone, PartialEq)]
pub struct GainTable {
    gains: Vec<f64>,
}

impl GainTable {
    pub fn new(graph: &WeightedGraph, spins: &[Spin]) -> Self {
        let mut table = Self {
            gains: vec![0.0; graph.num_vertices()],
        };
        table.refresh(graph, spins);
        table
    }

    pub fn refresh(&mut self, graph: &WeightedGraph, spins: &[Spin]) {
        for (v, gain) in self.gains.iter_mut().enumerate() {
            *gain = delta_if_flipped(graph, spins, v);
        }
    }

    #[inline]
    pub fn gain(&self, vertex: usize) -> f64 {
        self.gains[vertex]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.gains
    }

    /// Flips `vertex` in `spins` and updates the table. Returns the gain that was realised.
    pub fn apply_flip(&mut self, graph: &WeightedGraph, spins: &mut [Spin], vertex: usize) -> f64 {
        let gain = self.gains[vertex];
        let old_spin = spins[vertex] as f64;
        flip(spins, vertex);
        self.gains[vertex] = -gain;
        for (j, w) in graph.neighbors(vertex) {
            self.gains[j] -= 2.0 * w * (spins[j] as f64 * old_spin);
        }
        gain
    }

    /// Largest absolute difference between the cached gains and a full recomputation.
    pub fn max_deviation(&self, graph: &WeightedGraph, spins: &[Spin]) -> f64 {
        self.gains
            .iter()
            .enumerate()
            .map(|(v, &g)| (g - delta_if_flipped(graph, spins, v)).abs())
            .fold(0.0, f64::max)
    }

    pub fn is_consistent(&self, graph: &WeightedGraph, spins: &[Spin], tolerance: f64) -> bool {
        self.max_deviation(graph, spins) <= tolerance
    }
}

/// Step index until which each vertex stays tabu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabuMemory {
    tabu_until: Vec<u64>,
}

impl TabuMemory {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            tabu_until: vec![0; num_vertices],
        }
    }

    #[inline]
    pub fn is_tabu(&self, vertex: usize, step: u64) -> bool {
        step < self.tabu_until[vertex]
    }

    pub fn forbid(&mut self, vertex: usize, step: u64, tenure: u64) {
        self.tabu_until[vertex] = step.saturating_add(tenure);
    }

    pub fn tabu_until(&self, vertex: usize) -> u64 {
        self.tabu_until[vertex]
    }
}
