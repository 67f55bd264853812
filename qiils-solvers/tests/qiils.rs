use qiils_graph::{objective::cut_value, WeightedGraph};
use qiils_solvers::{
    qiils::{
        self, mix, mixing_count, mixing_indices, project_angle, projected_angles,
        relax, relaxed_energy, spins_from_projected, sweep, update_vertex, AngleConfiguration,
    },
    ParameterError,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

fn random_graph(seed: u64, n: usize, p: f64) -> WeightedGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen::<f64>() < p {
                edges.push((u, v, rng.gen_range(0.1..3.0)));
            }
        }
    }
    WeightedGraph::new(n, edges).unwrap()
}

fn random_angles(rng: &mut SmallRng, n: usize) -> AngleConfiguration {
    let thetas: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..=FRAC_PI_2)).collect();
    AngleConfiguration::from_thetas(&thetas)
}

#[test]
fn test_projection_boundary() {
    assert_eq!(project_angle(FRAC_PI_4), 0.0);
    assert_eq!(project_angle(FRAC_PI_4 + 1e-12), FRAC_PI_2);
    assert_eq!(project_angle(FRAC_PI_4 - 1e-12), 0.0);
    assert_eq!(project_angle(0.0), 0.0);
    assert_eq!(project_angle(FRAC_PI_2), FRAC_PI_2);

    assert_eq!(spins_from_projected(&[0.0, FRAC_PI_2, 0.0]), vec![1, -1, 1]);
    let angles = AngleConfiguration::from_thetas(&[0.1, FRAC_PI_4, 1.2]);
    assert_eq!(projected_angles(&angles), vec![0.0, 0.0, FRAC_PI_2]);
}

#[test]
fn test_mixing_count() {
    assert_eq!(mixing_count(10, 0.25), 2);
    assert_eq!(mixing_count(10, 0.5), 5);
    assert_eq!(mixing_count(10, 0.01), 1);
    assert_eq!(mixing_count(7, 1.0), 7);
    assert_eq!(mixing_count(1, 0.5), 1);
}

#[test]
fn test_mixing_indices_are_distinct_and_reproducible() {
    for (n, p) in [(10, 0.25), (100, 0.5), (37, 0.1), (5, 1.0)] {
        for attempt in 1..6 {
            let indices = mixing_indices(n, p, 42, attempt);
            assert_eq!(indices.len(), mixing_count(n, p));
            let distinct: HashSet<usize> = indices.iter().copied().collect();
            assert_eq!(distinct.len(), indices.len());
            assert!(indices.iter().all(|&i| i < n));
            assert_eq!(indices, mixing_indices(n, p, 42, attempt));
        }
    }
}

#[test]
fn test_mix_reflects_selected_angles() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut angles = random_angles(&mut rng, 20);
    let before = angles.thetas();
    let touched = mix(&mut angles, 0.25, 9, 3);
    assert_eq!(touched, 5);

    let selected: HashSet<usize> = mixing_indices(20, 0.25, 9, 3).into_iter().collect();
    for i in 0..20 {
        if selected.contains(&i) {
            assert!((angles.theta(i) - (FRAC_PI_2 - before[i])).abs() < 1e-15);
        } else {
            assert_eq!(angles.theta(i), before[i]);
        }
        assert!((angles.cos2(i) - (2.0 * angles.theta(i)).cos()).abs() < 1e-15);
    }
}

#[test]
fn test_coordinate_update_never_raises_relaxed_energy() {
    let mut rng = SmallRng::seed_from_u64(17);
    for trial in 0..20 {
        let n = 25;
        let graph = random_graph(trial, n, 0.2);
        let mut angles = random_angles(&mut rng, n);
        let lambda = rng.gen_range(0.05..0.95);
        let bias: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let mut energy = relaxed_energy(&graph, &angles, lambda, &bias);
        for _ in 0..3 {
            for i in (0..n).chain((0..n).rev()) {
                update_vertex(&graph, &mut angles, i, lambda, bias[i]);
                let next = relaxed_energy(&graph, &angles, lambda, &bias);
                assert!(next <= energy + 1e-9, "trial {} vertex {}", trial, i);
                assert!((0.0..=FRAC_PI_2).contains(&angles.theta(i)));
                energy = next;
            }
        }
    }
}

#[test]
fn test_sweep_is_forward_then_backward_in_place() {
    let mut rng = SmallRng::seed_from_u64(23);
    for trial in 0..5 {
        let n = 15;
        let graph = random_graph(100 + trial, n, 0.3);
        let bias: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let start = random_angles(&mut rng, n);

        let mut swept = start.clone();
        sweep(&graph, &mut swept, 0.7, &bias);

        let mut expected = start.clone();
        for i in (0..n).chain((0..n).rev()) {
            update_vertex(&graph, &mut expected, i, 0.7, bias[i]);
        }
        assert_eq!(swept, expected);
    }
}

#[test]
fn test_sweep_sees_updates_from_the_same_pass() {
    let graph = WeightedGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
    let bias = [0.0; 3];
    let lambda = 0.9;
    let start = AngleConfiguration::from_thetas(&[0.1, 0.2, 1.3]);

    let mut swept = start.clone();
    sweep(&graph, &mut swept, lambda, &bias);

    // every update reads the cos 2theta values from before the pass
    let mut jacobi = start.clone();
    for _ in 0..2 {
        let snapshot: Vec<f64> = (0..3).map(|j| jacobi.cos2(j)).collect();
        for i in 0..3 {
            let a: f64 = graph.neighbors(i).map(|(j, w)| w * snapshot[j]).sum();
            let theta = FRAC_PI_4 + 0.5 * (lambda * a).atan2(1.0 - lambda);
            jacobi.set(i, theta);
        }
    }
    assert_ne!(swept.thetas(), jacobi.thetas());
    assert!((swept.theta(0) - jacobi.theta(0)).abs() > 0.1);
}

#[test]
fn test_relax_stops_once_angles_settle() {
    let graph = WeightedGraph::new(2, vec![(0, 1, 1.0)]).unwrap();
    let params = qiils::Params {
        sweeps_per_attempt: 50,
        angle_conv: 1e-9,
        ..Default::default()
    };
    let mut angles = AngleConfiguration::from_thetas(&[0.3, 0.4]);
    let executed = relax(&graph, &mut angles, &[0.0, 0.0], &params);
    assert!(executed >= 1 && executed < 50, "executed {}", executed);

    let mut replay = AngleConfiguration::from_thetas(&[0.3, 0.4]);
    let mut expected = 0;
    loop {
        let before = replay.thetas();
        sweep(&graph, &mut replay, params.lambda, &[0.0, 0.0]);
        expected += 1;
        if replay.max_change(&before) < params.angle_conv {
            break;
        }
    }
    assert_eq!(executed, expected);
    assert_eq!(angles, replay);
    assert_eq!(cut_value(&graph, &spins_from_projected(&projected_angles(&angles))), 1.0);
}

#[test]
fn test_relax_without_tolerance_uses_every_sweep() {
    let graph = random_graph(31, 20, 0.25);
    let params = qiils::Params {
        sweeps_per_attempt: 40,
        angle_conv: 0.0,
        scaled_convergence: false,
        ..Default::default()
    };
    let mut rng = SmallRng::seed_from_u64(31);
    let mut angles = random_angles(&mut rng, 20);
    assert_eq!(relax(&graph, &mut angles, &[0.0; 20], &params), 40);

    let single = AngleConfiguration::from_thetas(&[0.3, 0.4]);
    let edge = WeightedGraph::new(2, vec![(0, 1, 1.0)]).unwrap();
    assert_eq!(relax(&edge, &mut single.clone(), &[0.0, 0.0], &params), 40);
}

#[test]
fn test_scaled_tolerance_has_a_floor() {
    let graph = WeightedGraph::new(2, vec![(0, 1, 1.0)]).unwrap();
    let params = qiils::Params {
        sweeps_per_attempt: 50,
        angle_conv: 0.0,
        scaled_convergence: true,
        ..Default::default()
    };
    let mut angles = AngleConfiguration::from_thetas(&[0.3, 0.4]);
    let executed = relax(&graph, &mut angles, &[0.0, 0.0], &params);
    assert!(executed < 50, "executed {}", executed);

    let mut loose = AngleConfiguration::from_thetas(&[0.3, 0.4]);
    let scaled = qiils::Params {
        angle_conv: 1e-3,
        ..params
    };
    assert!(relax(&graph, &mut loose, &[0.0, 0.0], &scaled) <= executed);
}

#[test]
fn test_single_edge_one_attempt() {
    let graph = WeightedGraph::new(2, vec![(0, 1, 3.5)]).unwrap();
    for seed in 0..20 {
        let params = qiils::Params {
            attempts: 1,
            sweeps_per_attempt: 1,
            seed,
            ..Default::default()
        };
        let output = qiils::solve(&graph, &params).unwrap();
        assert_eq!(output.best_cut, 3.5);
        assert_eq!(output.history, vec![3.5]);
        assert_eq!(output.sweeps, 1);
        assert_ne!(output.best_spins[0], output.best_spins[1]);
    }
}

#[test]
fn test_initial_angles_are_used() {
    let graph = WeightedGraph::new(2, vec![(0, 1, 3.5)]).unwrap();
    let params = qiils::Params {
        attempts: 1,
        initial_angles: Some(vec![0.0, FRAC_PI_2]),
        ..Default::default()
    };
    let output = qiils::solve(&graph, &params).unwrap();
    assert_eq!(output.best_angles, vec![0.0, FRAC_PI_2]);
    assert_eq!(output.best_spins, vec![1, -1]);
}

#[test]
fn test_triangle_reaches_two() {
    let graph = WeightedGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
    for seed in 0..10 {
        let params = qiils::Params {
            attempts: 5,
            sweeps_per_attempt: 20,
            seed,
            ..Default::default()
        };
        let output = qiils::solve(&graph, &params).unwrap();
        assert_eq!(output.best_cut, 2.0);
        assert!(output.history.iter().all(|&c| c <= 2.0));
    }
}

#[test]
fn test_history_and_outputs_are_consistent() {
    let graph = random_graph(12, 60, 0.1);
    let params = qiils::Params {
        attempts: 30,
        sweeps_per_attempt: 25,
        perturbation: 0.2,
        seed: 5,
        scaled_convergence: true,
        ..Default::default()
    };
    let output = qiils::solve(&graph, &params).unwrap();
    assert_eq!(output.history.len(), 30);
    assert!(output.history.windows(2).all(|w| w[0] <= w[1]));
    assert!(output.sweeps >= 30 && output.sweeps <= 30 * 25);
    assert!(output
        .best_angles
        .iter()
        .all(|&t| t == 0.0 || t == FRAC_PI_2));
    assert_eq!(spins_from_projected(&output.best_angles), output.best_spins);
    assert_eq!(cut_value(&graph, &output.best_spins), output.best_cut);
}

#[test]
fn test_same_seed_same_result() {
    let graph = random_graph(13, 40, 0.15);
    let params = qiils::Params {
        attempts: 10,
        seed: 8,
        ..Default::default()
    };
    assert_eq!(
        qiils::solve(&graph, &params).unwrap(),
        qiils::solve(&graph, &params).unwrap()
    );
}

#[test]
fn test_invalid_parameters() {
    let graph = WeightedGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
    let cases = [
        (
            qiils::Params {
                lambda: 1.5,
                ..Default::default()
            },
            ParameterError::InvalidLambda { value: 1.5 },
        ),
        (
            qiils::Params {
                perturbation: 0.0,
                ..Default::default()
            },
            ParameterError::InvalidPerturbation { value: 0.0 },
        ),
        (
            qiils::Params {
                attempts: 0,
                ..Default::default()
            },
            ParameterError::NonPositive { name: "attempts" },
        ),
        (
            qiils::Params {
                sweeps_per_attempt: 0,
                ..Default::default()
            },
            ParameterError::NonPositive {
                name: "sweeps_per_attempt",
            },
        ),
        (
            qiils::Params {
                bias: Some(vec![0.0; 2]),
                ..Default::default()
            },
            ParameterError::LengthMismatch {
                name: "bias",
                expected: 3,
                actual: 2,
            },
        ),
        (
            qiils::Params {
                initial_angles: Some(vec![0.0, 2.0, 0.5]),
                ..Default::default()
            },
            ParameterError::InvalidAngle {
                index: 1,
                value: 2.0,
            },
        ),
        (
            qiils::Params {
                angle_conv: -1.0,
                ..Default::default()
            },
            ParameterError::InvalidTolerance { value: -1.0 },
        ),
    ];
    for (params, expected) in cases {
        let err = qiils::solve(&graph, &params).unwrap_err();
        assert_eq!(err.downcast_ref::<ParameterError>(), Some(&expected));
    }
}
