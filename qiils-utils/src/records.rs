use crate::{compress_obj, decompress_obj, dejsonify, jsonify_pretty, ResourceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

/// Everything worth keeping from one solver run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub method: String,
    pub instance: String,
    #[serde(rename = "N")]
    pub num_vertices: usize,
    #[serde(rename = "W")]
    pub total_weight: f64,
    pub seed: u64,
    pub best_cut: f64,
    pub ising_energy: f64,
    pub optimum: Option<f64>,
    pub approximation_ratio: Option<f64>,
    pub sweeps: usize,
    pub history: Vec<f64>,
    pub spins: Vec<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angles: Option<Vec<f64>>,
    pub params: Value,
}

impl RunRecord {
    /// Sets `optimum` and derives `approximation_ratio` from it. A non-positive optimum
    /// leaves the ratio empty.
    pub fn with_optimum(mut self, optimum: Option<f64>) -> Self {
        self.optimum = optimum;
        self.approximation_ratio = optimum.filter(|&o| o > 0.0).map(|o| self.best_cut / o);
        self
    }
}

/// Writes `record` as sorted-key JSON, zlib-compressed when `compress` is set.
pub fn save_record(path: &Path, record: &RunRecord, compress: bool) -> Result<(), ResourceError> {
    let parse_err = |e: anyhow::Error| ResourceError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let bytes = if compress {
        compress_obj(record).map_err(parse_err)?
    } else {
        jsonify_pretty(record)
            .map_err(|e| parse_err(e.into()))?
            .into_bytes()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ResourceError::from_io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| ResourceError::from_io(path, e))
}

/// Reads a record written by [`save_record`], compressed or not.
pub fn load_record(path: &Path) -> Result<RunRecord, ResourceError> {
    let bytes = fs::read(path).map_err(|e| ResourceError::from_io(path, e))?;
    let parse_err = |message: String| ResourceError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_plain = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |&b| b == b'{');
    if is_plain {
        let text = std::str::from_utf8(&bytes).map_err(|e| parse_err(e.to_string()))?;
        dejsonify(text).map_err(|e| parse_err(e.to_string()))
    } else {
        decompress_obj(&bytes).map_err(|e| parse_err(e.to_string()))
    }
}
