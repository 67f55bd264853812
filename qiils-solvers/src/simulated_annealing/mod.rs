//! Single-spin-flip Metropolis annealing.
//!
//! One sweep visits every vertex once in a shuffled order drawn from that sweep's own
//! generator. A flip with gain `delta >= 0` is always taken; a worsening flip is taken
//! with probability `exp(beta * delta)`, with `beta` interpolated per sweep between
//! `beta_initial` and `beta_final`.

use crate::{
    initialize_params, no_progress, random_spins, seeded_rng, validate_initial_spins,
    ParameterError, Progress, SpinRunOutput,
};
use anyhow::Result;
use logging_timer::time;
use qiils_graph::{
    objective::{cut_value, delta_if_flipped, flip},
    Spin, WeightedGraph,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Linear,
    Geometric,
}

impl Schedule {
    /// Inverse temperature for 1-based `sweep` out of `sweeps`.
    pub fn beta(&self, beta_initial: f64, beta_final: f64, sweep: usize, sweeps: usize) -> f64 {
        let denom = sweeps.saturating_sub(1).max(1) as f64;
        let frac = sweep.saturating_sub(1) as f64 / denom;
        match self {
            Schedule::Linear => beta_initial + (beta_final - beta_initial) * frac,
            Schedule::Geometric => beta_initial * (beta_final / beta_initial).powf(frac),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    pub beta_initial: f64,
    pub beta_final: f64,
    pub sweeps: usize,
    pub schedule: Schedule,
    pub seed: u64,
    /// Starting configuration; random from the seed when absent.
    pub initial_spins: Option<Vec<Spin>>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            beta_initial: 0.1,
            beta_final: 5.0,
            sweeps: 1000,
            schedule: Schedule::Geometric,
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
        for (name, value) in [
            ("beta_initial", self.beta_initial),
            ("beta_final", self.beta_final),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParameterError::InvalidBeta { name, value });
            }
        }
        if self.schedule == Schedule::Geometric && (self.beta_initial == 0.0 || self.beta_final == 0.0)
        {
            return Err(ParameterError::ZeroGeometricEndpoint);
        }
        if let Some(spins) = &self.initial_spins {
            validate_initial_spins(spins, num_vertices)?;
        }
        Ok(())
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

    let mut spins = match &params.initial_spins {
        Some(spins) => spins.clone(),
        None => random_spins(params.seed, n),
    };
    let mut current_cut = cut_value(graph, &spins);
    let mut best_cut = current_cut;
    let mut best_spins = spins.clone();
    let mut history = Vec::with_capacity(params.sweeps);
    let mut order: Vec<usize> = Vec::with_capacity(n);

    for sweep in 1..=params.sweeps {
        let mut rng = seeded_rng(params.seed, sweep as u64);
        let beta = params
            .schedule
            .beta(params.beta_initial, params.beta_final, sweep, params.sweeps);

        order.clear();
        order.extend(0..n);
        order.shuffle(&mut rng);

        for &i in &order {
            let delta = delta_if_flipped(graph, &spins, i);
            if delta >= 0.0 || rng.gen::<f64>() < (beta * delta).exp() {
                flip(&mut spins, i);
                current_cut += delta;
                if current_cut > best_cut {
                    best_cut = current_cut;
                    best_spins.copy_from_slice(&spins);
                }
            }
        }

        history.push(best_cut);
        log::debug!(
            "sa sweep {}/{}: beta {:.4}, cut {}, best {}",
            sweep,
            params.sweeps,
            beta,
            current_cut,
            best_cut
        );
        progress(&Progress {
            iteration: sweep,
            total: params.sweeps,
            current_cut,
            best_cut,
        });
    }

    log::info!(
        "sa finished: {} vertices, {} sweeps, best cut {}",
        n,
        params.sweeps,
        best_cut
    );
    Ok(SpinRunOutput {
        best_cut,
        best_spins,
        history,
        sweeps: params.sweeps,
    })
}
