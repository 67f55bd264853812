use crate::{GraphError, GraphResult, WeightedGraph};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// `N M` header followed by `u v` or `u v w` lines, 1-based vertices.
    Gset,
    /// One `w,u,v` line per edge, 0-based vertices.
    Custom,
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gset" => Ok(GraphFormat::Gset),
            "custom" => Ok(GraphFormat::Custom),
            other => Err(format!("Unknown graph format '{}'", other)),
        }
    }
}

pub fn instance_name(num_vertices: usize, degree: usize, seed: u64, seedb: u64) -> String {
    format!("graph_N{}_k{}_seed{}_seedb{}", num_vertices, degree, seed, seedb)
}

pub fn instance_file_name(num_vertices: usize, degree: usize, seed: u64, seedb: u64) -> String {
    format!("{}.txt", instance_name(num_vertices, degree, seed, seedb))
}

pub fn load_graph(path: &Path, format: GraphFormat, weighted: bool) -> GraphResult<WeightedGraph> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GraphError::NotFound {
            path: path.to_path_buf(),
        },
        _ => GraphError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    match format {
        GraphFormat::Gset => parse_gset(&text),
        GraphFormat::Custom => parse_custom(&text, weighted),
    }
}

fn parse_vertex(token: &str, line: usize, content: &str) -> GraphResult<usize> {
    token.parse::<usize>().map_err(|_| GraphError::MalformedLine {
        line,
        content: content.to_string(),
        reason: format!("vertex '{}' is not a non-negative integer", token),
    })
}

fn parse_weight(token: &str, line: usize, content: &str) -> GraphResult<f64> {
    token.parse::<f64>().map_err(|_| GraphError::MalformedLine {
        line,
        content: content.to_string(),
        reason: format!("weight '{}' is not a number", token),
    })
}

/// Parses the Gset adjacency format. Blank lines are skipped; every edge line must have
/// the same column count as the first one.
pub fn parse_gset(text: &str) -> GraphResult<WeightedGraph> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, l)| (idx + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or(GraphError::EmptyGraph)?;
    let header_tokens: Vec<&str> = header.split_whitespace().collect();
    let (num_vertices, num_edges) = match header_tokens.as_slice() {
        [n, m] => match (n.parse::<usize>(), m.parse::<usize>()) {
            (Ok(n), Ok(m)) => (n, m),
            _ => {
                return Err(GraphError::MalformedHeader {
                    line: header_line,
                    content: header.to_string(),
                })
            }
        },
        _ => {
            return Err(GraphError::MalformedHeader {
                line: header_line,
                content: header.to_string(),
            })
        }
    };

    let mut columns: Option<usize> = None;
    let mut edges = Vec::with_capacity(num_edges);
    for (line, content) in lines {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() != 2 && tokens.len() != 3 {
            return Err(GraphError::MalformedLine {
                line,
                content: content.to_string(),
                reason: format!("expected 2 or 3 tokens, found {}", tokens.len()),
            });
        }
        match columns {
            None => columns = Some(tokens.len()),
            Some(c) if c != tokens.len() => {
                return Err(GraphError::MalformedLine {
                    line,
                    content: content.to_string(),
                    reason: format!(
                        "mixed weighted and unweighted edge lines ({} columns after {})",
                        tokens.len(),
                        c
                    ),
                })
            }
            _ => {}
        }
        let u = parse_vertex(tokens[0], line, content)?;
        let v = parse_vertex(tokens[1], line, content)?;
        if u == 0 || v == 0 {
            return Err(GraphError::MalformedLine {
                line,
                content: content.to_string(),
                reason: "Gset vertices are 1-based".to_string(),
            });
        }
        let w = match tokens.get(2) {
            Some(token) => parse_weight(token, line, content)?,
            None => 1.0,
        };
        edges.push((u - 1, v - 1, w));
    }

    if edges.len() != num_edges {
        return Err(GraphError::EdgeCountMismatch {
            expected: num_edges,
            actual: edges.len(),
        });
    }
    WeightedGraph::new(num_vertices, edges)
}

/// Parses `w,u,v` lines with 0-based vertices. The vertex count is one past the largest
/// vertex seen. When `weighted` is false every edge weighs 1.0 and the weight field is
/// not interpreted.
pub fn parse_custom(text: &str, weighted: bool) -> GraphResult<WeightedGraph> {
    let mut edges = Vec::new();
    let mut num_vertices = 0usize;
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(GraphError::MalformedLine {
                line,
                content: content.to_string(),
                reason: format!("expected 3 comma-separated fields, found {}", fields.len()),
            });
        }
        let w = if weighted {
            parse_weight(fields[0], line, content)?
        } else {
            1.0
        };
        let u = parse_vertex(fields[1], line, content)?;
        let v = parse_vertex(fields[2], line, content)?;
        num_vertices = num_vertices.max(u + 1).max(v + 1);
        edges.push((u, v, w));
    }
    WeightedGraph::new(num_vertices, edges)
}

/// Writes the custom `w,u,v` format. Weights use the shortest representation that
/// parses back to the same `f64`.
pub fn write_custom(graph: &WeightedGraph) -> String {
    graph
        .edges()
        .iter()
        .map(|edge| format!("{},{},{}\n", edge.weight, edge.u, edge.v))
        .collect()
}

pub fn write_gset(graph: &WeightedGraph) -> String {
    let mut out = format!("{} {}\n", graph.num_vertices(), graph.num_edges());
    for edge in graph.edges() {
        out.push_str(&format!("{} {} {}\n", edge.u + 1, edge.v + 1, edge.weight));
    }
    out
}

pub fn save_graph(graph: &WeightedGraph, path: &Path, format: GraphFormat) -> GraphResult<()> {
    let text = match format {
        GraphFormat::Gset => write_gset(graph),
        GraphFormat::Custom => write_custom(graph),
    };
    fs::write(path, text).map_err(|e| GraphError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
