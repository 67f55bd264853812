use qiils_graph::{Spin, WeightedGraph};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// An angle together with its cached `cos 2theta` and `sin 2theta`.
///
/// The three fields are only ever written together through [`Angle::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    theta: f64,
    cos2: f64,
    sin2: f64,
}

impl Angle {
    #[inline]
    pub fn new(theta: f64) -> Self {
        let (sin2, cos2) = (2.0 * theta).sin_cos();
        Self { theta, cos2, sin2 }
    }

    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    #[inline]
    pub fn cos2(&self) -> f64 {
        self.cos2
    }

    #[inline]
    pub fn sin2(&self) -> f64 {
        self.sin2
    }

    /// `theta -> pi/2 - theta`.
    pub fn reflected(&self) -> Self {
        Self::new(FRAC_PI_2 - self.theta)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AngleConfiguration {
    angles: Vec<Angle>,
}

impl AngleConfiguration {
    pub fn from_thetas(thetas: &[f64]) -> Self {
        Self {
            angles: thetas.iter().map(|&t| Angle::new(t)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Angle {
        self.angles[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, theta: f64) {
        self.angles[i] = Angle::new(theta);
    }

    #[inline]
    pub fn theta(&self, i: usize) -> f64 {
        self.angles[i].theta
    }

    #[inline]
    pub fn cos2(&self, i: usize) -> f64 {
        self.angles[i].cos2
    }

    pub fn thetas(&self) -> Vec<f64> {
        self.angles.iter().map(Angle::theta).collect()
    }

    pub fn reflect(&mut self, i: usize) {
        self.angles[i] = self.angles[i].reflected();
    }

    /// Recomputes every cached pair from its angle.
    pub fn refresh_all(&mut self) {
        for angle in self.angles.iter_mut() {
            *angle = Angle::new(angle.theta);
        }
    }

    /// Largest `|theta_i - other_i|`.
    pub fn max_change(&self, other: &[f64]) -> f64 {
        self.angles
            .iter()
            .zip(other)
            .map(|(a, &t)| (a.theta - t).abs())
            .fold(0.0, f64::max)
    }

    /// Mean distance of the angles from the undecided point `pi/4`.
    pub fn mean_deviation(&self) -> f64 {
        if self.angles.is_empty() {
            return 0.0;
        }
        self.angles
            .iter()
            .map(|a| (a.theta - FRAC_PI_4).abs())
            .sum::<f64>()
            / self.angles.len() as f64
    }
}

/// Rounds an angle to `0` or `pi/2`; exactly `pi/4` goes to `0`.
#[inline]
pub fn project_angle(theta: f64) -> f64 {
    if theta > FRAC_PI_4 {
        FRAC_PI_2
    } else {
        0.0
    }
}

pub fn projected_angles(angles: &AngleConfiguration) -> Vec<f64> {
    angles.angles.iter().map(|a| project_angle(a.theta)).collect()
}

/// `pi/2 -> -1`, `0 -> +1`.
pub fn spins_from_projected(projected: &[f64]) -> Vec<Spin> {
    projected
        .iter()
        .map(|&t| if t > FRAC_PI_4 { -1 } else { 1 })
        .collect()
}

/// `lambda * sum_edges w cos2_i cos2_j - (1 - lambda) * sum_i (sin2_i + bias_i cos2_i)`.
pub fn relaxed_energy(
    graph: &WeightedGraph,
    angles: &AngleConfiguration,
    lambda: f64,
    bias: &[f64],
) -> f64 {
    let coupling: f64 = graph
        .edges()
        .iter()
        .map(|e| e.weight * angles.cos2(e.u) * angles.cos2(e.v))
        .sum();
    let field: f64 = angles
        .angles
        .iter()
        .zip(bias)
        .map(|(a, &b)| a.sin2 + b * a.cos2)
        .sum();
    lambda * coupling - (1.0 - lambda) * field
}
