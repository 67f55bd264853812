use qiils_solvers::{derive_seed, qiils, sa, seeded_rng, tabu, ParameterError};
use rand::Rng;
use serde_json::{json, Map, Value};

fn map(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(m) => Some(m),
        _ => None,
    }
}

#[test]
fn test_defaults_when_no_hyperparameters() {
    assert_eq!(sa::Params::initialize(&None).unwrap(), sa::Params::default());
    assert_eq!(
        tabu::Params::initialize(&None).unwrap(),
        tabu::Params::default()
    );
    assert_eq!(
        qiils::Params::initialize(&None).unwrap(),
        qiils::Params::default()
    );
}

#[test]
fn test_hyperparameters_override_defaults() {
    let params = sa::Params::initialize(&map(json!({
        "sweeps": 25,
        "schedule": "linear",
        "initial_spins": [1, -1, 1],
    })))
    .unwrap();
    assert_eq!(params.sweeps, 25);
    assert_eq!(params.schedule, sa::Schedule::Linear);
    assert_eq!(params.initial_spins, Some(vec![1, -1, 1]));
    assert_eq!(params.beta_final, sa::Params::default().beta_final);

    let params = qiils::Params::initialize(&map(json!({
        "lambda": 0.25,
        "bias": [0.5, -0.5],
        "scaled_convergence": true,
    })))
    .unwrap();
    assert_eq!(params.lambda, 0.25);
    assert_eq!(params.bias, Some(vec![0.5, -0.5]));
    assert!(params.scaled_convergence);
    assert_eq!(params.attempts, qiils::Params::default().attempts);
}

#[test]
fn test_unknown_key_is_rejected() {
    let err = tabu::Params::initialize(&map(json!({ "tenure": 5, "tenrue": 6 }))).unwrap_err();
    assert_eq!(
        err,
        ParameterError::UnknownHyperparameter {
            key: "tenrue".to_string()
        }
    );
}

#[test]
fn test_ill_typed_value_is_rejected() {
    let err = sa::Params::initialize(&map(json!({ "sweeps": "many" }))).unwrap_err();
    assert!(matches!(err, ParameterError::InvalidHyperparameters { .. }));

    let err = sa::Params::initialize(&map(json!({ "schedule": "cosine" }))).unwrap_err();
    assert!(matches!(err, ParameterError::InvalidHyperparameters { .. }));
}

#[test]
fn test_seed_derivation() {
    assert_eq!(derive_seed(0, 5), 5);
    assert_eq!(derive_seed(1, 0), 0x9e37_79b9_7f4a_7c15);
    assert_eq!(derive_seed(u64::MAX, 1), 0x9e37_79b9_7f4a_7c15u64.wrapping_neg() + 1);

    let a: Vec<u64> = (0..4).map(|_| seeded_rng(3, 7).gen()).collect();
    assert!(a.windows(2).all(|w| w[0] == w[1]));
    let mut rng = seeded_rng(3, 7);
    let first: u64 = rng.gen();
    assert_eq!(first, a[0]);
    assert_ne!(first, seeded_rng(3, 8).gen::<u64>());
}
