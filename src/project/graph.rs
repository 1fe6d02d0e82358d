//! Import graph between the analyzed files.
//!
//! An import resolves to a project file when the import's path is a suffix
//! of the file's module path: `pkg.mod` matches `src/pkg/mod.py` and
//! `src/pkg/mod/__init__.py`, `com.acme.Cart` matches
//! `src/main/java/com/acme/Cart.java`, and `net/socket.h` matches
//! `include/net/socket.h`. Unresolved imports still count toward efferent
//! coupling.

use crate::core::{FileAnalysis, Language};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CouplingMetrics {
    pub afferent: usize,
    pub efferent: usize,
    pub instability: f64,
    pub circular_dependencies: usize,
}

pub struct ImportGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
    efferent: Vec<usize>,
}

impl ImportGraph {
    pub fn build(files: &[FileAnalysis]) -> Self {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..files.len()).map(|i| graph.add_node(i)).collect();

        let mut index: HashMap<(Language, String), Vec<usize>> = HashMap::new();
        for (i, file) in files.iter().enumerate() {
            for key in module_keys(&file.path, file.language) {
                index.entry((file.language, key)).or_default().push(i);
            }
        }

        let mut efferent = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            let distinct: HashSet<&str> = file.imports.iter().map(|imp| imp.name.as_str()).collect();
            efferent.push(distinct.len());

            let mut targets = HashSet::new();
            for name in distinct {
                if let Some(target) = resolve(&index, file.language, name) {
                    if target != i {
                        targets.insert(target);
                    }
                }
            }
            for target in targets {
                graph.add_edge(nodes[i], nodes[target], ());
            }
        }

        Self {
            graph,
            nodes,
            efferent,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Coupling per file, in input order
    pub fn metrics(&self) -> Vec<CouplingMetrics> {
        let mut cycle_size = vec![1usize; self.nodes.len()];
        for component in tarjan_scc(&self.graph) {
            for node in &component {
                cycle_size[self.graph[*node]] = component.len();
            }
        }

        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let afferent = self
                    .graph
                    .neighbors_directed(*node, petgraph::Direction::Incoming)
                    .count();
                let efferent = self.efferent[i];
                let total = afferent + efferent;
                CouplingMetrics {
                    afferent,
                    efferent,
                    instability: if total == 0 {
                        0.0
                    } else {
                        efferent as f64 / total as f64
                    },
                    circular_dependencies: cycle_size[i] - 1,
                }
            })
            .collect()
    }
}

/// Every suffix of the file's module path, longest first
fn module_keys(path: &Path, language: Language) -> Vec<String> {
    let mut parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let Some(last) = parts.pop() else {
        return vec![];
    };

    match language {
        Language::Cpp => {
            parts.push(last);
            suffixes(&parts, "/")
        }
        Language::Python | Language::Java => {
            let stem = Path::new(&last)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(last);
            if !(language == Language::Python && stem == "__init__") {
                parts.push(stem);
            }
            suffixes(&parts, ".")
        }
        Language::Unknown => vec![],
    }
}

fn suffixes(parts: &[String], separator: &str) -> Vec<String> {
    (0..parts.len()).map(|i| parts[i..].join(separator)).collect()
}

/// Try the full import, then its parent (`from pkg.mod import name`)
fn resolve(
    index: &HashMap<(Language, String), Vec<usize>>,
    language: Language,
    name: &str,
) -> Option<usize> {
    let name = name.trim_start_matches('.').trim_start_matches("./");
    if name.is_empty() {
        return None;
    }
    let lookup = |key: &str| {
        index
            .get(&(language, key.to_string()))
            .and_then(|found| found.first().copied())
    };

    match language {
        Language::Cpp => lookup(name),
        _ => lookup(name).or_else(|| {
            name.rsplit_once('.')
                .and_then(|(parent, _)| lookup(parent))
        }),
    }
}
