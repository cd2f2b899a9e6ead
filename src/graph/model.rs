//! Directed dependency graph of buildable targets.
//!
//! The graph is the central data structure of a generation run: the resolver
//! builds it from the manifest, the focus engine prunes it down to the
//! requested targets, and the workspace writer serializes the result. Edges
//! point from a dependent to its dependency, so walking outgoing edges
//! descends toward the leaves of the build.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::core::GantryError;

/// What a node produces when built.
///
/// The kind participates in fingerprinting and in the workspace document; the
/// generation core never dispatches behavior on it beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// An executable application target.
    Application,
    /// A dynamically linked framework.
    Framework,
    /// A statically linked library.
    StaticLibrary,
    /// A resource bundle with no compiled code of its own.
    Bundle,
    /// A prebuilt external dependency declared in `[external]`.
    External,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Application => "application",
            Self::Framework => "framework",
            Self::StaticLibrary => "static-library",
            Self::Bundle => "bundle",
            Self::External => "external",
        };
        f.write_str(kind)
    }
}

/// Platform a target is built for. Defaults to the host-independent `macos`
/// when the manifest does not say otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Macos,
    Ios,
    Linux,
    Windows,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let platform = match self {
            Self::Macos => "macos",
            Self::Ios => "ios",
            Self::Linux => "linux",
            Self::Windows => "windows",
        };
        f.write_str(platform)
    }
}

/// A single buildable unit in the graph.
///
/// Carries everything the manifest declared for the target: file patterns,
/// build settings, platform, and the names of its direct dependencies. The
/// `dependencies` list is declaration data; the authoritative edge set lives
/// in the [`Graph`] that owns the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetNode {
    /// Unique name within one graph.
    pub name: String,
    /// What this target produces.
    pub kind: NodeKind,
    #[serde(default)]
    pub platform: Platform,
    /// Source file glob patterns, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Resource file glob patterns, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Build settings as key/value pairs, sorted by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    /// Names of direct dependencies as declared in the manifest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl TargetNode {
    /// Create a node with the given name and kind and no other attributes.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            platform: Platform::default(),
            sources: Vec::new(),
            resources: Vec::new(),
            settings: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }
}

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Validated-on-demand dependency graph for one generation run.
///
/// Node names are unique; edges are deduplicated. All traversal operations
/// are deterministic: ties between siblings are broken lexicographically so
/// repeated runs over the same manifest produce identical output.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Workspace name the graph was resolved for.
    name: String,
    /// The underlying directed graph.
    graph: DiGraph<TargetNode, ()>,
    /// Map from node names to their graph indices.
    node_map: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Create an empty graph for the named workspace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Workspace name this graph belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node to the graph.
    ///
    /// Fails if a node with the same name is already present.
    pub fn add_node(&mut self, node: TargetNode) -> Result<(), GantryError> {
        if self.node_map.contains_key(&node.name) {
            return Err(GantryError::DuplicateTarget {
                name: node.name.clone(),
            });
        }
        let name = node.name.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(name, index);
        Ok(())
    }

    /// Add a dependency edge: `from` depends on `to`.
    ///
    /// Both endpoints must already be nodes. Declaring the same edge twice is
    /// harmless; duplicates are dropped.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GantryError> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
        Ok(())
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&TargetNode> {
        self.node_map.get(name).map(|&idx| &self.graph[idx])
    }

    /// Whether a node with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &TargetNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// All nodes sorted by name, for deterministic serialization.
    pub fn sorted_nodes(&self) -> Vec<&TargetNode> {
        let mut nodes: Vec<&TargetNode> = self.nodes().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    /// Direct dependencies of the named node.
    ///
    /// Returns an empty list for unknown names.
    pub fn direct_dependencies(&self, name: &str) -> Vec<&TargetNode> {
        match self.node_map.get(name) {
            Some(&idx) => self.graph.neighbors(idx).map(|dep| &self.graph[dep]).collect(),
            None => Vec::new(),
        }
    }

    /// Check the edge set for cycles using DFS with colors.
    ///
    /// On failure the error carries the exact cycle as a closed walk, with
    /// the entry node repeated at the end. Traversal visits nodes in name
    /// order so the reported walk is stable across runs.
    pub fn validate(&self) -> Result<(), GantryError> {
        let mut colors: HashMap<NodeIndex, Color> = HashMap::new();
        let mut path: Vec<String> = Vec::new();

        for node in self.graph.node_indices() {
            colors.insert(node, Color::White);
        }

        for node in self.sorted_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                return Err(GantryError::CycleDetected { cycle });
            }
        }

        Ok(())
    }

    /// DFS visit for cycle detection.
    ///
    /// Returns `Some(cycle_path)` if a cycle is detected, None otherwise.
    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        colors.insert(node, Color::Gray);
        path.push(self.graph[node].name.clone());

        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));

        for neighbor in neighbors {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    // Found a cycle - find where it starts in the path
                    let entry = &self.graph[neighbor].name;
                    let cycle_start = path.iter().position(|n| n == entry).unwrap();
                    let mut cycle = path[cycle_start..].to_vec();
                    // Repeat the entry node to show the cycle closes
                    cycle.push(entry.clone());
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Nodes ordered so that every dependency precedes its dependents.
    ///
    /// Ties between nodes with no ordering constraint are broken by name.
    /// Fails with the cycle path if the graph is cyclic.
    pub fn topological_order(&self) -> Result<Vec<&TargetNode>, GantryError> {
        Ok(self.topo_indices()?.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    /// Kahn's algorithm over outgoing edges: a node becomes ready once all
    /// of its dependencies have been emitted.
    fn topo_indices(&self) -> Result<Vec<NodeIndex>, GantryError> {
        self.validate()?;

        let mut outstanding: HashMap<NodeIndex, usize> = HashMap::new();
        let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = BinaryHeap::new();

        for idx in self.graph.node_indices() {
            let deps = self.graph.neighbors(idx).count();
            if deps == 0 {
                ready.push(Reverse((self.graph[idx].name.as_str(), idx)));
            } else {
                outstanding.insert(idx, deps);
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, idx))) = ready.pop() {
            order.push(idx);
            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(remaining) = outstanding.get_mut(&dependent) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        outstanding.remove(&dependent);
                        ready.push(Reverse((self.graph[dependent].name.as_str(), dependent)));
                    }
                }
            }
        }

        Ok(order)
    }

    /// Transitive dependency closure of the given seed nodes, seeds included.
    ///
    /// The result is in topological order (dependencies first) with name
    /// tie-breaks, and contains each node exactly once. Fails if a seed name
    /// is not in the graph.
    pub fn transitive_dependencies(&self, seeds: &[String]) -> Result<Vec<&TargetNode>, GantryError> {
        let mut closure: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for seed in seeds {
            let idx = self.index_of(seed)?;
            if closure.insert(idx) {
                queue.push_back(idx);
            }
        }

        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors(current) {
                if closure.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let order = self.topo_indices()?;
        Ok(order
            .into_iter()
            .filter(|idx| closure.contains(idx))
            .map(|idx| &self.graph[idx])
            .collect())
    }

    /// Build a new graph containing only the named nodes and the edges
    /// between them. Fails if a requested name is not in the graph.
    pub fn subgraph(&self, keep: &BTreeSet<String>) -> Result<Self, GantryError> {
        let mut sub = Self::new(&self.name);
        for name in keep {
            let idx = self.index_of(name)?;
            sub.add_node(self.graph[idx].clone())?;
        }
        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()].name;
            let to = &self.graph[edge.target()].name;
            if keep.contains(from) && keep.contains(to) {
                sub.add_edge(from, to)?;
            }
        }
        Ok(sub)
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges (dependencies) in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Access to the petgraph structure for export formats.
    pub(crate) fn inner(&self) -> &DiGraph<TargetNode, ()> {
        &self.graph
    }

    fn index_of(&self, name: &str) -> Result<NodeIndex, GantryError> {
        self.node_map.get(name).copied().ok_or_else(|| GantryError::UnknownNode {
            name: name.to_string(),
        })
    }

    fn sorted_indices(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        indices
    }
}
