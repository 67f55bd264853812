use crate::{
    objective::{cut_value, ising_energy, validate_spins, Spin},
    WeightedGraph,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Solution {
    pub spins: Vec<Spin>,
}

impl Solution {
    pub fn new(spins: Vec<Spin>) -> Self {
        Self { spins }
    }

    /// Side of the cut holding vertices with spin `-1`, and the side with `+1`.
    pub fn partition(&self) -> (Vec<usize>, Vec<usize>) {
        let mut minus = Vec::new();
        let mut plus = Vec::new();
        for (v, &s) in self.spins.iter().enumerate() {
            if s < 0 {
                minus.push(v);
            } else {
                plus.push(v);
            }
        }
        (minus, plus)
    }
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub cut_value: f64,
    pub ising_energy: f64,
    pub total_weight: f64,
}

pub fn verify_solution(graph: &WeightedGraph, solution: &Solution) -> Result<()> {
    validate_spins(graph, &solution.spins)?;
    Ok(())
}

pub fn evaluate_solution(graph: &WeightedGraph, solution: &Solution) -> Result<Evaluation> {
    verify_solution(graph, solution)?;
    Ok(Evaluation {
        cut_value: cut_value(graph, &solution.spins),
        ising_energy: ising_energy(graph, &solution.spins),
        total_weight: graph.total_weight(),
    })
}
