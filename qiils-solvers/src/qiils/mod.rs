//! Continuous angle relaxation with projection and mixing restarts.
//!
//! Each vertex carries an angle `theta` in `[0, pi/2]`. An attempt relaxes all angles
//! with forward then backward coordinate passes until they stop moving, projects them to
//! `{0, pi/2}` to read off a cut, and then reflects a random subset `theta -> pi/2 - theta`
//! before the next attempt. Updates within a pass see the angles already updated earlier
//! in the same pass.

mod angles;
mod mixing;
pub use angles::{
    project_angle, projected_angles, relaxed_energy, spins_from_projected, Angle,
    AngleConfiguration,
};
pub use mixing::{mix, mixing_count, mixing_indices};

use crate::{initialize_params, no_progress, seeded_rng, ParameterError, Progress};
use anyhow::Result;
use logging_timer::time;
use qiils_graph::{objective::cut_value, Spin, WeightedGraph};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const SCALED_TOLERANCE_FLOOR: f64 = 1e-12;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Weight of the coupling term against the bias/field term.
    pub lambda: f64,
    /// Per-vertex bias; zeros when absent.
    pub bias: Option<Vec<f64>>,
    pub attempts: usize,
    pub sweeps_per_attempt: usize,
    /// Fraction of vertices reflected between attempts.
    pub perturbation: f64,
    pub seed: u64,
    pub initial_angles: Option<Vec<f64>>,
    pub angle_conv: f64,
    /// Scale `angle_conv` by the mean distance of the angles from `pi/4`.
    pub scaled_convergence: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            lambda: 0.9,
            bias: None,
            attempts: 100,
            sweeps_per_attempt: 50,
            perturbation: 0.1,
            seed: 0,
            initial_angles: None,
            angle_conv: 1e-6,
            scaled_convergence: false,
        }
    }
}

impl Params {
    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Result<Self, ParameterError> {
        initialize_params(hyperparameters)
    }

    pub fn validate(&self, num_vertices: usize) -> Result<(), ParameterError> {
        if self.attempts == 0 {
            return Err(ParameterError::NonPositive { name: "attempts" });
        }
        if self.sweeps_per_attempt == 0 {
            return Err(ParameterError::NonPositive {
                name: "sweeps_per_attempt",
            });
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(ParameterError::InvalidLambda { value: self.lambda });
        }
        if !(self.perturbation > 0.0 && self.perturbation <= 1.0) {
            return Err(ParameterError::InvalidPerturbation {
                value: self.perturbation,
            });
        }
        if !self.angle_conv.is_finite() || self.angle_conv < 0.0 {
            return Err(ParameterError::InvalidTolerance {
                value: self.angle_conv,
            });
        }
        if let Some(bias) = &self.bias {
            if bias.len() != num_vertices {
                return Err(ParameterError::LengthMismatch {
                    name: "bias",
                    expected: num_vertices,
                    actual: bias.len(),
                });
            }
            if let Some(index) = bias.iter().position(|b| !b.is_finite()) {
                return Err(ParameterError::NonFinite {
                    name: "bias",
                    index,
                });
            }
        }
        if let Some(thetas) = &self.initial_angles {
            if thetas.len() != num_vertices {
                return Err(ParameterError::LengthMismatch {
                    name: "initial_angles",
                    expected: num_vertices,
                    actual: thetas.len(),
                });
            }
            if let Some(index) = thetas
                .iter()
                .position(|t| !(0.0..=FRAC_PI_2).contains(t))
            {
                return Err(ParameterError::InvalidAngle {
                    index,
                    value: thetas[index],
                });
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QiilsOutput {
    pub best_cut: f64,
    /// Projected angles (each `0` or `pi/2`) of the best attempt.
    pub best_angles: Vec<f64>,
    pub best_spins: Vec<Spin>,
    /// Best cut so far, one entry per attempt.
    pub history: Vec<f64>,
    /// Sweeps executed over all attempts.
    pub sweeps: usize,
}

/// Coordinate update for vertex `i` given the live angles of its neighbours.
#[inline]
pub fn update_vertex(
    graph: &WeightedGraph,
    angles: &mut AngleConfiguration,
    i: usize,
    lambda: f64,
    bias: f64,
) {
    let a: f64 = graph.neighbors(i).map(|(j, w)| w * angles.cos2(j)).sum();
    let big_a = lambda * a - (1.0 - lambda) * bias;
    let big_b = 1.0 - lambda;
    angles.set(i, FRAC_PI_4 + 0.5 * big_a.atan2(big_b));
}

/// One forward pass followed by one backward pass.
pub fn sweep(graph: &WeightedGraph, angles: &mut AngleConfiguration, lambda: f64, bias: &[f64]) {
    let n = angles.len();
    for i in 0..n {
        update_vertex(graph, angles, i, lambda, bias[i]);
    }
    for i in (0..n).rev() {
        update_vertex(graph, angles, i, lambda, bias[i]);
    }
}

/// Sweeps until the largest per-vertex change falls below the tolerance or the sweep
/// budget runs out. Returns the number of sweeps executed.
pub fn relax(
    graph: &WeightedGraph,
    angles: &mut AngleConfiguration,
    bias: &[f64],
    params: &Params,
) -> usize {
    let mut snapshot = angles.thetas();
    for executed in 1..=params.sweeps_per_attempt {
        sweep(graph, angles, params.lambda, bias);
        let change = angles.max_change(&snapshot);
        let tolerance = if params.scaled_convergence {
            (params.angle_conv * angles.mean_deviation()).max(SCALED_TOLERANCE_FLOOR)
        } else {
            params.angle_conv
        };
        if change < tolerance {
            return executed;
        }
        snapshot.clear();
        snapshot.extend((0..angles.len()).map(|i| angles.theta(i)));
    }
    params.sweeps_per_attempt
}

fn initial_angles(params: &Params, num_vertices: usize) -> AngleConfiguration {
    match &params.initial_angles {
        Some(thetas) => AngleConfiguration::from_thetas(thetas),
        None => {
            let mut rng = seeded_rng(params.seed, 0);
            let thetas: Vec<f64> = (0..num_vertices)
                .map(|_| rng.gen_range(0.0..=FRAC_PI_2))
                .collect();
            AngleConfiguration::from_thetas(&thetas)
        }
    }
}

pub fn solve(graph: &WeightedGraph, params: &Params) -> Result<QiilsOutput> {
    solve_with_progress(graph, params, &no_progress)
}

#[time]
pub fn solve_with_progress(
    graph: &WeightedGraph,
    params: &Params,
    progress: &dyn Fn(&Progress),
) -> Result<QiilsOutput> {
    let n = graph.num_vertices();
    params.validate(n)?;

    let bias = match &params.bias {
        Some(bias) => bias.clone(),
        None => vec![0.0; n],
    };
    let mut angles = initial_angles(params, n);
    let mut best_cut = f64::NEG_INFINITY;
    let mut best_angles = Vec::new();
    let mut best_spins = Vec::new();
    let mut history = Vec::with_capacity(params.attempts);
    let mut total_sweeps = 0;

    for attempt in 1..=params.attempts {
        if attempt > 1 {
            mix(&mut angles, params.perturbation, params.seed, attempt as u64);
        }
        let executed = relax(graph, &mut angles, &bias, params);
        total_sweeps += executed;

        let projected = projected_angles(&angles);
        let spins = spins_from_projected(&projected);
        let cut = cut_value(graph, &spins);
        if cut > best_cut {
            best_cut = cut;
            best_angles = projected;
            best_spins = spins;
        }

        history.push(best_cut);
        log::debug!(
            "qiils attempt {}/{}: {} sweeps, relaxed energy {:.6}, cut {}, best {}",
            attempt,
            params.attempts,
            executed,
            relaxed_energy(graph, &angles, params.lambda, &bias),
            cut,
            best_cut
        );
        progress(&Progress {
            iteration: attempt,
            total: params.attempts,
            current_cut: cut,
            best_cut,
        });
    }

    log::info!(
        "qiils finished: {} vertices, {} attempts, {} sweeps, best cut {}",
        n,
        params.attempts,
        total_sweeps,
        best_cut
    );
    Ok(QiilsOutput {
        best_cut,
        best_angles,
        best_spins,
        history,
        sweeps: total_sweeps,
    })
}
