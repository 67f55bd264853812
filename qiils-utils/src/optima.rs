use crate::{dejsonify, ResourceError};
use qiils_graph::loading::instance_name;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fs, path::Path};

/// Best-known cut values for G1..G22.
const GSET_BEST_KNOWN: [(&str, f64); 22] = [
    ("G1", 11624.0),
    ("G2", 11620.0),
    ("G3", 11622.0),
    ("G4", 11646.0),
    ("G5", 11631.0),
    ("G6", 2178.0),
    ("G7", 2006.0),
    ("G8", 2005.0),
    ("G9", 2054.0),
    ("G10", 2000.0),
    ("G11", 564.0),
    ("G12", 556.0),
    ("G13", 582.0),
    ("G14", 3064.0),
    ("G15", 3050.0),
    ("G16", 3052.0),
    ("G17", 3047.0),
    ("G18", 992.0),
    ("G19", 906.0),
    ("G20", 941.0),
    ("G21", 931.0),
    ("G22", 13359.0),
];

/// Exact solver output for a generated instance.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SolutionRecord {
    #[serde(rename = "N")]
    pub num_vertices: usize,
    pub k: usize,
    pub seed: u64,
    pub seedb: Option<u64>,
    pub maxcut_value: f64,
}

impl SolutionRecord {
    pub fn instance(&self) -> String {
        instance_name(
            self.num_vertices,
            self.k,
            self.seed,
            self.seedb.unwrap_or(self.seed),
        )
    }
}

/// Instance name to known optimum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnownOptima {
    values: BTreeMap<String, f64>,
}

impl KnownOptima {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gset() -> Self {
        Self {
            values: GSET_BEST_KNOWN
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn insert(&mut self, instance: impl Into<String>, optimum: f64) {
        self.values.insert(instance.into(), optimum);
    }

    /// Exact match first, then the file stem (`G14.txt` and `dir/G14` resolve to `G14`).
    pub fn lookup(&self, instance: &str) -> Option<f64> {
        if let Some(&v) = self.values.get(instance) {
            return Some(v);
        }
        let stem = Path::new(instance).file_stem()?.to_str()?;
        self.values.get(stem).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges a `{ "name": optimum, ... }` object.
    pub fn extend_from_map(&mut self, map: &Map<String, Value>) -> Result<(), String> {
        for (name, value) in map {
            let optimum = value
                .as_f64()
                .ok_or_else(|| format!("optimum for '{}' is not a number", name))?;
            self.values.insert(name.clone(), optimum);
        }
        Ok(())
    }

    /// Merges a JSON file that is either a name-to-optimum object or a single
    /// solution record carrying `maxcut_value`.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), ResourceError> {
        let text = fs::read_to_string(path).map_err(|e| ResourceError::from_io(path, e))?;
        let parse_err = |message: String| ResourceError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let value: Value = dejsonify(&text).map_err(|e| parse_err(e.to_string()))?;
        match value {
            Value::Object(map) if map.contains_key("maxcut_value") => {
                let record: SolutionRecord = serde_json::from_value(Value::Object(map))
                    .map_err(|e| parse_err(e.to_string()))?;
                self.insert(record.instance(), record.maxcut_value);
                Ok(())
            }
            Value::Object(map) => self.extend_from_map(&map).map_err(parse_err),
            _ => Err(parse_err("expected a JSON object".to_string())),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ResourceError> {
        let mut optima = Self::new();
        optima.extend_from_file(path)?;
        Ok(optima)
    }
}
