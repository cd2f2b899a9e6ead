//! Wire representation of a resolved graph.
//!
//! `gantry graph --format json` exports this document and the automation
//! client reads it back, so the JSON shape is a compatibility surface: an
//! object with the workspace `name` and a `nodes` array, each node carrying
//! its declared attributes and dependency name list. Empty attribute lists
//! are omitted on export and assumed empty on import.

use petgraph::dot::{Config as DotConfig, Dot};
use serde::{Deserialize, Serialize};

use crate::core::GantryError;
use crate::graph::model::{Graph, TargetNode};

/// Flat, serializable form of a [`Graph`]. Edges are implied by each node's
/// `dependencies` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGraph {
    pub name: String,
    pub nodes: Vec<TargetNode>,
}

impl WireGraph {
    /// Snapshot a graph into its wire form, nodes sorted by name.
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            name: graph.name().to_string(),
            nodes: graph.sorted_nodes().into_iter().cloned().collect(),
        }
    }

    /// Rebuild the in-memory graph, adding one edge per declared dependency.
    pub fn into_graph(self) -> Result<Graph, GantryError> {
        let mut graph = Graph::new(&self.name);
        for node in &self.nodes {
            graph.add_node(node.clone())?;
        }
        for node in &self.nodes {
            for dep in &node.dependencies {
                if !graph.contains(dep) {
                    return Err(GantryError::UnknownDependency {
                        name: dep.clone(),
                        required_by: node.name.clone(),
                    });
                }
                graph.add_edge(&node.name, dep)?;
            }
        }
        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String, GantryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, GantryError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Render a graph in Graphviz dot format, one labeled vertex per node.
pub fn to_dot(graph: &Graph) -> String {
    format!(
        "{:?}",
        Dot::with_attr_getters(
            graph.inner(),
            &[DotConfig::EdgeNoLabel, DotConfig::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (_, node)| format!("label = \"{}\"", node.name),
        )
    )
}
