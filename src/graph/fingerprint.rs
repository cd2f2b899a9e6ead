//! Stable identity hashes for graph nodes, used as cache keys.
//!
//! A node's fingerprint covers its own declared attributes plus the
//! fingerprints of its direct dependencies, so any change anywhere in a
//! node's transitive input state produces a new fingerprint for it and for
//! every node that depends on it. Dependency fingerprints are sorted before
//! hashing, which makes the result independent of declaration order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use dashmap::DashMap;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::GantryError;
use crate::graph::model::{Graph, TargetNode};

/// A node fingerprint in the format `sha256:<64 hex digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The full `sha256:`-prefixed value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the algorithm prefix. Used for file names in
    /// the cache layout.
    pub fn hex_digest(&self) -> &str {
        self.0.strip_prefix("sha256:").unwrap_or(&self.0)
    }

    pub(crate) fn from_digest(digest: impl AsRef<[u8]>) -> Self {
        Self(format!("sha256:{}", hex::encode(digest)))
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes and memoizes node fingerprints for one generation run.
///
/// The memoization map is keyed by node name and safe for concurrent
/// inserts, so independent subtrees can be fingerprinted in parallel. An
/// engine must not outlive the graph resolution it was created for; create
/// a fresh one per run.
pub struct FingerprintEngine {
    memo: DashMap<String, Fingerprint>,
}

impl FingerprintEngine {
    /// Create an engine with an empty memoization map.
    pub fn new() -> Self {
        Self {
            memo: DashMap::new(),
        }
    }

    /// Fingerprint a single node, recursively resolving its dependencies.
    ///
    /// Recursion is guarded by an in-progress marker per node: if a cycle
    /// slipped past graph validation this fails with the cycle path instead
    /// of recursing forever.
    pub fn fingerprint(&self, name: &str, graph: &Graph) -> Result<Fingerprint, GantryError> {
        let mut in_progress: Vec<String> = Vec::new();
        self.fingerprint_inner(name, graph, &mut in_progress)
    }

    fn fingerprint_inner(
        &self,
        name: &str,
        graph: &Graph,
        in_progress: &mut Vec<String>,
    ) -> Result<Fingerprint, GantryError> {
        if let Some(hit) = self.memo.get(name) {
            return Ok(hit.value().clone());
        }

        if let Some(start) = in_progress.iter().position(|n| n == name) {
            let mut cycle = in_progress[start..].to_vec();
            cycle.push(name.to_string());
            return Err(GantryError::CycleDetected { cycle });
        }

        let node = graph.node(name).ok_or_else(|| GantryError::UnknownNode {
            name: name.to_string(),
        })?;

        in_progress.push(name.to_string());
        let mut dep_prints = Vec::new();
        for dep in graph.direct_dependencies(name) {
            dep_prints.push(self.fingerprint_inner(&dep.name, graph, in_progress)?);
        }
        in_progress.pop();

        dep_prints.sort();
        let print = hash_material(&node_material(node, &dep_prints));
        self.memo.insert(name.to_string(), print.clone());
        Ok(print)
    }

    /// Fingerprint a set of nodes, hashing independent nodes concurrently.
    ///
    /// Nodes are grouped into waves by dependency depth; within one wave no
    /// node depends on another, so the wave is hashed on blocking tasks with
    /// at most `max_parallel` in flight. Returns the fingerprints for the
    /// requested names; dependencies outside `names` are computed as needed
    /// and stay memoized for later lookups.
    pub async fn fingerprint_many(
        &self,
        names: &[String],
        graph: &Graph,
        max_parallel: usize,
    ) -> Result<BTreeMap<String, Fingerprint>, GantryError> {
        let closure = graph.transitive_dependencies(names)?;

        // Closure is in topological order, so every dependency has a level
        // before its dependents are assigned one.
        let mut levels: HashMap<&str, usize> = HashMap::new();
        let mut waves: Vec<Vec<&TargetNode>> = Vec::new();
        for node in closure {
            let level = graph
                .direct_dependencies(&node.name)
                .into_iter()
                .filter_map(|dep| levels.get(dep.name.as_str()).copied())
                .max()
                .map_or(0, |deepest| deepest + 1);
            levels.insert(node.name.as_str(), level);
            if waves.len() <= level {
                waves.push(Vec::new());
            }
            waves[level].push(node);
        }

        debug!(
            waves = waves.len(),
            nodes = levels.len(),
            max_parallel,
            "computing fingerprints"
        );

        for wave in waves {
            let pending = wave.into_iter().filter(|node| !self.memo.contains_key(&node.name));
            let results: Vec<(String, Fingerprint)> = futures::stream::iter(pending.map(|node| {
                let material = self.wave_material(node, graph);
                let name = node.name.clone();
                async move {
                    let print =
                        tokio::task::spawn_blocking(move || hash_material(&material)).await;
                    (name, print)
                }
            }))
            .buffer_unordered(max_parallel)
            .map(|(name, print)| {
                let print = print.map_err(|err| GantryError::Other {
                    message: format!("fingerprint task for '{name}' failed: {err}"),
                })?;
                Ok::<_, GantryError>((name, print))
            })
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<_, _>>()?;

            for (name, print) in results {
                self.memo.insert(name, print);
            }
        }

        let mut prints = BTreeMap::new();
        for name in names {
            let print = self
                .memo
                .get(name.as_str())
                .map(|entry| entry.value().clone())
                .ok_or_else(|| GantryError::UnknownNode { name: name.clone() })?;
            prints.insert(name.clone(), print);
        }
        Ok(prints)
    }

    /// Hash material for a node whose dependencies were all memoized by an
    /// earlier wave.
    fn wave_material(&self, node: &TargetNode, graph: &Graph) -> String {
        let mut dep_prints: Vec<Fingerprint> = graph
            .direct_dependencies(&node.name)
            .into_iter()
            .filter_map(|dep| self.memo.get(dep.name.as_str()).map(|p| p.value().clone()))
            .collect();
        dep_prints.sort();
        node_material(node, &dep_prints)
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize the hashed input state of a node into one line-oriented string.
///
/// The node name is deliberately excluded: two nodes with identical declared
/// inputs and identical dependency fingerprints share a fingerprint.
fn node_material(node: &TargetNode, dep_prints: &[Fingerprint]) -> String {
    let mut material = String::new();
    material.push_str(&format!("kind:{}\n", node.kind));
    material.push_str(&format!("platform:{}\n", node.platform));
    for source in &node.sources {
        material.push_str(&format!("source:{source}\n"));
    }
    for resource in &node.resources {
        material.push_str(&format!("resource:{resource}\n"));
    }
    for (key, value) in &node.settings {
        material.push_str(&format!("setting:{key}={value}\n"));
    }
    for dep in dep_prints {
        material.push_str(&format!("dep:{dep}\n"));
    }
    material
}

fn hash_material(material: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    Fingerprint::from_digest(hasher.finalize())
}
