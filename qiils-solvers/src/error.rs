#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    InvalidAngle {
        index: usize,
        value: f64,
    },
    InvalidBeta {
        name: &'static str,
        value: f64,
    },
    InvalidLambda {
        value: f64,
    },
    InvalidPerturbation {
        value: f64,
    },
    InvalidSpin {
        index: usize,
        value: i8,
    },
    InvalidTolerance {
        value: f64,
    },
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    NonPositive {
        name: &'static str,
    },
    NonFinite {
        name: &'static str,
        index: usize,
    },
    ZeroGeometricEndpoint,
    UnknownHyperparameter {
        key: String,
    },
    InvalidHyperparameters {
        message: String,
    },
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterError::InvalidAngle { index, value } => write!(
                f,
                "Initial angle '{}' at index '{}' is outside [0, pi/2]",
                value, index
            ),
            ParameterError::InvalidBeta { name, value } => write!(
                f,
                "Inverse temperature '{}' is '{}'. Must be finite and non-negative",
                name, value
            ),
            ParameterError::InvalidLambda { value } => {
                write!(f, "Lambda '{}' is outside [0, 1]", value)
            }
            ParameterError::InvalidPerturbation { value } => {
                write!(f, "Perturbation fraction '{}' is outside (0, 1]", value)
            }
            ParameterError::InvalidSpin { index, value } => write!(
                f,
                "Initial spin '{}' at index '{}' must be +1 or -1",
                value, index
            ),
            ParameterError::InvalidTolerance { value } => write!(
                f,
                "Convergence tolerance '{}' must be finite and non-negative",
                value
            ),
            ParameterError::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "Invalid length for '{}'. Expected: '{}', Actual: '{}'",
                name, expected, actual
            ),
            ParameterError::NonPositive { name } => write!(f, "'{}' must be positive", name),
            ParameterError::NonFinite { name, index } => {
                write!(f, "'{}' has a non-finite value at index '{}'", name, index)
            }
            ParameterError::ZeroGeometricEndpoint => write!(
                f,
                "Geometric schedule requires strictly positive initial and final beta"
            ),
            ParameterError::UnknownHyperparameter { key } => {
                write!(f, "Unknown hyperparameter '{}'", key)
            }
            ParameterError::InvalidHyperparameters { message } => {
                write!(f, "Invalid hyperparameters: {}", message)
            }
        }
    }
}

impl std::error::Error for ParameterError {}
