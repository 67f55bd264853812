use qiils_graph::Spin;
use rand::{rngs::StdRng, SeedableRng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

mod error;
pub use error::ParameterError;

#[cfg(feature = "simulated_annealing")]
pub mod simulated_annealing;
#[cfg(feature = "simulated_annealing")]
pub use simulated_annealing as sa;
#[cfg(feature = "tabu_search")]
pub mod tabu_search;
#[cfg(feature = "tabu_search")]
pub use tabu_search as tabu;
#[cfg(feature = "qiils")]
pub mod qiils;

const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Combines a run seed with a loop coordinate (sweep or attempt index).
pub fn derive_seed(seed: u64, index: u64) -> u64 {
    seed.wrapping_mul(SEED_STRIDE).wrapping_add(index)
}

/// Fresh generator for one seeding boundary. Every sweep/attempt builds its own stream
/// instead of continuing a shared one, so any boundary can be replayed in isolation.
pub fn seeded_rng(seed: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(derive_seed(seed, index))
}

/// Result of the spin-flip solvers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpinRunOutput {
    pub best_cut: f64,
    pub best_spins: Vec<Spin>,
    /// Best cut seen so far, one entry per sweep.
    pub history: Vec<f64>,
    pub sweeps: usize,
}

/// Snapshot handed to progress observers after each sweep (SA, TS) or attempt (QiILS).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub total: usize,
    pub current_cut: f64,
    pub best_cut: f64,
}

pub fn no_progress(_: &Progress) {}

/// Merges user hyperparameters over `P::default()`. Unknown keys and ill-typed values are
/// rejected rather than ignored.
pub fn initialize_params<P>(hyperparameters: &Option<Map<String, Value>>) -> Result<P, ParameterError>
where
    P: Serialize + DeserializeOwned + Default,
{
    let mut merged = serde_json::to_value(P::default()).map_err(|e| {
        ParameterError::InvalidHyperparameters {
            message: e.to_string(),
        }
    })?;
    if let (Value::Object(ref mut obj), Some(map)) = (&mut merged, hyperparameters) {
        for (k, v) in map {
            if !obj.contains_key(k) {
                return Err(ParameterError::UnknownHyperparameter { key: k.clone() });
            }
            obj.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(merged).map_err(|e| ParameterError::InvalidHyperparameters {
        message: e.to_string(),
    })
}

pub(crate) fn validate_initial_spins(
    spins: &[Spin],
    num_vertices: usize,
) -> Result<(), ParameterError> {
    if spins.len() != num_vertices {
        return Err(ParameterError::LengthMismatch {
            name: "initial_spins",
            expected: num_vertices,
            actual: spins.len(),
        });
    }
    if let Some(index) = spins.iter().position(|&s| s != 1 && s != -1) {
        return Err(ParameterError::InvalidSpin {
            index,
            value: spins[index],
        });
    }
    Ok(())
}

pub(crate) fn random_spins(seed: u64, num_vertices: usize) -> Vec<Spin> {
    use rand::Rng;
    let mut rng = seeded_rng(seed, 0);
    (0..num_vertices)
        .map(|_| if rng.gen::<bool>() { 1 } else { -1 })
        .collect()
}
