//! Single-spin-flip tabu search with aspiration.
//!
//! Every step flips exactly one vertex: the best admissible candidate, or the best
//! candidate overall when tabu status rules out all of them. Gains are maintained
//! incrementally in a [`GainTable`]; one sweep is `N` steps.

mod gains;
pub use gains::{GainTable, TabuMemory};

use crate::{
    initialize_params, no_progress, random_spins, seeded_rng, validate_initial_spins,
    ParameterError, Progress, SpinRunOutput,
};
use anyhow::Result;
use logging_timer::time;
use qiils_graph::{objective::cut_value, Spin, WeightedGraph};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CONSISTENCY_TOLERANCE: f64 = 1e-6;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    pub sweeps: usize,
    /// Steps a flipped vertex stays tabu.
    pub tenure: u64,
    /// Candidates sampled per step; 0 (or anything >= N) scans every vertex.
    pub candidate_size: usize,
    pub seed: u64,
    pub initial_spins: Option<Vec<Spin>>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sweeps: 100,
            tenure: 20,
            candidate_size: 0,
            seed: 0,
            initial_spins: None,
        }
    }
}

impl Params {
    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Result<Self, ParameterError> {
        initialize_params(hyperparameters)
    }

    pub fn validate(&self, num_vertices: usize) -> Result<(), ParameterError> {
        if self.sweeps == 0 {
            return Err(ParameterError::NonPositive { name: "sweeps" });
        }
        if let Some(spins) = &self.initial_spins {
            validate_initial_spins(spins, num_vertices)?;
        }
        Ok(())
    }
}

/// Picks the move for one step.
///
/// Admissible candidates are those out of tabu or passing aspiration
/// (`current_cut + gain > best_cut`). The highest-gain admissible candidate wins; if none
/// is admissible the highest-gain candidate wins regardless. Ties keep the first maximal
/// candidate in `candidates` order.
pub fn select_candidate(
    candidates: &[usize],
    gains: &GainTable,
    memory: &TabuMemory,
    step: u64,
    current_cut: f64,
    best_cut: f64,
) -> Option<usize> {
    let mut best_admissible: Option<(usize, f64)> = None;
    let mut best_any: Option<(usize, f64)> = None;
    for &v in candidates {
        let gain = gains.gain(v);
        if best_any.map_or(true, |(_, g)| gain > g) {
            best_any = Some((v, gain));
        }
        let admissible = !memory.is_tabu(v, step) || current_cut + gain > best_cut;
        if admissible && best_admissible.map_or(true, |(_, g)| gain > g) {
            best_admissible = Some((v, gain));
        }
    }
    best_admissible.or(best_any).map(|(v, _)| v)
}

/// Mutable state of one tabu run, advanced one step at a time.
#[derive(Debug, Clone)]
pub struct TabuState<'g> {
    graph: &'g WeightedGraph,
    spins: Vec<Spin>,
    gains: GainTable,
    memory: TabuMemory,
    tenure: u64,
    step: u64,
    current_cut: f64,
    best_cut: f64,
    best_spins: Vec<Spin>,
}

impl<'g> TabuState<'g> {
    pub fn new(graph: &'g WeightedGraph, spins: Vec<Spin>, tenure: u64) -> Self {
        let gains = GainTable::new(graph, &spins);
        let current_cut = cut_value(graph, &spins);
        Self {
            graph,
            gains,
            memory: TabuMemory::new(graph.num_vertices()),
            tenure,
            step: 0,
            current_cut,
            best_cut: current_cut,
            best_spins: spins.clone(),
            spins,
        }
    }

    /// Performs one step over `candidates` and returns the flipped vertex, or `None` when
    /// `candidates` is empty.
    pub fn step(&mut self, candidates: &[usize]) -> Option<usize> {
        self.step += 1;
        let chosen = select_candidate(
            candidates,
            &self.gains,
            &self.memory,
            self.step,
            self.current_cut,
            self.best_cut,
        )?;
        let gain = self.gains.apply_flip(self.graph, &mut self.spins, chosen);
        self.current_cut += gain;
        self.memory.forbid(chosen, self.step, self.tenure);
        if self.current_cut > self.best_cut {
            self.best_cut = self.current_cut;
            self.best_spins.copy_from_slice(&self.spins);
        }
        Some(chosen)
    }

    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    pub fn gains(&self) -> &GainTable {
        &self.gains
    }

    pub fn memory(&self) -> &TabuMemory {
        &self.memory
    }

    pub fn step_index(&self) -> u64 {
        self.step
    }

    pub fn current_cut(&self) -> f64 {
        self.current_cut
    }

    pub fn best_cut(&self) -> f64 {
        self.best_cut
    }

    pub fn best_spins(&self) -> &[Spin] {
        &self.best_spins
    }

    /// Rebuilds the gain table from scratch.
    pub fn refresh_gains(&mut self) {
        self.gains.refresh(self.graph, &self.spins);
    }

    pub fn into_best(self) -> (f64, Vec<Spin>) {
        (self.best_cut, self.best_spins)
    }
}

pub fn solve(graph: &WeightedGraph, params: &Params) -> Result<SpinRunOutput> {
    solve_with_progress(graph, params, &no_progress)
}

#[time]
pub fn solve_with_progress(
    graph: &WeightedGraph,
    params: &Params,
    progress: &dyn Fn(&Progress),
) -> Result<SpinRunOutput> {
    let n = graph.num_vertices();
    params.validate(n)?;

    let spins = match &params.initial_spins {
        Some(spins) => spins.clone(),
        None => random_spins(params.seed, n),
    };
    let mut state = TabuState::new(graph, spins, params.tenure);
    let sample = params.candidate_size > 0 && params.candidate_size < n;
    let mut candidates: Vec<usize> = if sample {
        Vec::with_capacity(params.candidate_size)
    } else {
        (0..n).collect()
    };
    let mut history = Vec::with_capacity(params.sweeps);

    for sweep in 1..=params.sweeps {
        let mut rng = seeded_rng(params.seed, sweep as u64);
        for _ in 0..n {
            if sample {
                candidates.clear();
                candidates.extend((0..params.candidate_size).map(|_| rng.gen_range(0..n)));
            }
            state.step(&candidates);
        }

        debug_assert!(
            state
                .gains()
                .is_consistent(graph, state.spins(), CONSISTENCY_TOLERANCE),
            "gain table drifted from recomputation"
        );
        history.push(state.best_cut());
        log::debug!(
            "tabu sweep {}/{}: step {}, cut {}, best {}",
            sweep,
            params.sweeps,
            state.step_index(),
            state.current_cut(),
            state.best_cut()
        );
        progress(&Progress {
            iteration: sweep,
            total: params.sweeps,
            current_cut: state.current_cut(),
            best_cut: state.best_cut(),
        });
    }

    let (best_cut, best_spins) = state.into_best();
    log::info!(
        "tabu finished: {} vertices, {} sweeps, tenure {}, best cut {}",
        n,
        params.sweeps,
        params.tenure,
        best_cut
    );
    Ok(SpinRunOutput {
        best_cut,
        best_spins,
        history,
        sweeps: params.sweeps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_keep_first_candidate() {
        let graph = WeightedGraph::new(4, vec![(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
        let spins = vec![1, 1, 1, 1];
        let gains = GainTable::new(&graph, &spins);
        let memory = TabuMemory::new(4);
        assert_eq!(
            select_candidate(&[0, 1, 2, 3], &gains, &memory, 1, 0.0, 0.0),
            Some(0)
        );
        assert_eq!(
            select_candidate(&[3, 2, 1, 0], &gains, &memory, 1, 0.0, 0.0),
            Some(3)
        );
    }

    #[test]
    fn test_tabu_vertex_skipped_without_aspiration() {
        let graph = WeightedGraph::new(3, vec![(0, 1, 2.0), (1, 2, 1.0)]).unwrap();
        let spins = vec![1, 1, 1];
        let gains = GainTable::new(&graph, &spins);
        let mut memory = TabuMemory::new(3);
        memory.forbid(1, 1, 10);
        // vertex 1 has the largest gain (3.0) but is tabu and 0 + 3 does not beat best 5
        assert_eq!(
            select_candidate(&[0, 1, 2], &gains, &memory, 2, 0.0, 5.0),
            Some(0)
        );
        // aspiration: 0 + 3 > 2 lets the tabu vertex through
        assert_eq!(
            select_candidate(&[0, 1, 2], &gains, &memory, 2, 0.0, 2.0),
            Some(1)
        );
    }

    #[test]
    fn test_fallback_when_everything_is_tabu() {
        let graph = WeightedGraph::new(3, vec![(0, 1, 2.0), (1, 2, 1.0)]).unwrap();
        let spins = vec![1, 1, 1];
        let gains = GainTable::new(&graph, &spins);
        let mut memory = TabuMemory::new(3);
        for v in 0..3 {
            memory.forbid(v, 1, 10);
        }
        assert_eq!(
            select_candidate(&[2, 0, 1], &gains, &memory, 2, 0.0, 100.0),
            Some(1)
        );
        assert_eq!(select_candidate(&[], &gains, &memory, 2, 0.0, 0.0), None);
    }
}
