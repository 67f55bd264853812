use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    NotFound { path: PathBuf },
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl ResourceError {
    pub(crate) fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ResourceError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceError::NotFound { path } => {
                write!(f, "File '{}' not found", path.display())
            }
            ResourceError::Io { path, message } => {
                write!(f, "Failed to access '{}': {}", path.display(), message)
            }
            ResourceError::Parse { path, message } => {
                write!(f, "Failed to parse '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ResourceError {}
