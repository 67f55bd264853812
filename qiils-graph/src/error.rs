use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    EdgeCountMismatch {
        expected: usize,
        actual: usize,
    },
    EmptyGraph,
    InvalidGenerator {
        reason: String,
    },
    InvalidSpinCount {
        expected: usize,
        actual: usize,
    },
    InvalidSpinValue {
        index: usize,
        value: i8,
    },
    InvalidWeight {
        u: usize,
        v: usize,
        weight: f64,
    },
    Io {
        path: PathBuf,
        message: String,
    },
    MalformedHeader {
        line: usize,
        content: String,
    },
    MalformedLine {
        line: usize,
        content: String,
        reason: String,
    },
    NotFound {
        path: PathBuf,
    },
    SelfLoop {
        vertex: usize,
    },
    VertexOutOfRange {
        vertex: usize,
        num_vertices: usize,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::EdgeCountMismatch { expected, actual } => write!(
                f,
                "Header declares '{}' edges but '{}' edge lines were read",
                expected, actual
            ),
            GraphError::EmptyGraph => write!(f, "Graph must have at least one vertex"),
            GraphError::InvalidGenerator { reason } => {
                write!(f, "Invalid generator parameters: {}", reason)
            }
            GraphError::InvalidSpinCount { expected, actual } => write!(
                f,
                "Invalid number of spins. Expected: '{}', Actual: '{}'",
                expected, actual
            ),
            GraphError::InvalidSpinValue { index, value } => write!(
                f,
                "Spin '{}' has value '{}'. Must be +1 or -1",
                index, value
            ),
            GraphError::InvalidWeight { u, v, weight } => write!(
                f,
                "Edge ({}, {}) has non-finite weight '{}'",
                u, v, weight
            ),
            GraphError::Io { path, message } => {
                write!(f, "Failed to access '{}': {}", path.display(), message)
            }
            GraphError::MalformedHeader { line, content } => write!(
                f,
                "Line {}: expected an 'N M' header, found '{}'",
                line, content
            ),
            GraphError::MalformedLine {
                line,
                content,
                reason,
            } => write!(f, "Line {}: {} ('{}')", line, reason, content),
            GraphError::NotFound { path } => {
                write!(f, "Graph file '{}' not found", path.display())
            }
            GraphError::SelfLoop { vertex } => {
                write!(f, "Self loop on vertex '{}' is not allowed", vertex)
            }
            GraphError::VertexOutOfRange {
                vertex,
                num_vertices,
            } => write!(
                f,
                "Vertex '{}' is out of range for a graph with '{}' vertices",
                vertex, num_vertices
            ),
        }
    }
}

impl std::error::Error for GraphError {}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
