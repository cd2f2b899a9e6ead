//! Resolution from a parsed manifest into a validated dependency graph.
//!
//! The resolver is the single place where declared targets become graph
//! nodes and declared dependency references become edges. It fails fast: an
//! unknown reference or a dependency cycle aborts resolution before any
//! generation work starts, and no partial graph is ever returned.
//!
//! Resolution also picks the cache profile for the run, either from an
//! explicit `--profile` override or from the configured default.

use tracing::{debug, warn};

use crate::config::{CacheProfile, Config};
use crate::core::GantryError;
use crate::graph::{Graph, NodeKind, TargetNode};
use crate::manifest::Manifest;
use crate::utils::similar_names;

/// Outcome of a successful resolution: the validated graph plus the cache
/// profile the rest of the run will use.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub graph: Graph,
    pub profile: CacheProfile,
}

/// Builds and validates the dependency graph for one manifest.
pub struct GraphResolver<'a> {
    manifest: &'a Manifest,
    config: &'a Config,
}

impl<'a> GraphResolver<'a> {
    pub fn new(manifest: &'a Manifest, config: &'a Config) -> Self {
        Self { manifest, config }
    }

    /// Build the full graph and verify it is acyclic.
    ///
    /// Targets and externals share one namespace; externals become nodes of
    /// kind [`NodeKind::External`] with no sources of their own. Declaration
    /// order is irrelevant: nodes are added before any edge is resolved, so
    /// forward references work.
    pub fn build_graph(&self) -> Result<Graph, GantryError> {
        let mut graph = Graph::new(self.manifest.workspace_name());

        for (name, spec) in &self.manifest.targets {
            graph.add_node(TargetNode {
                name: name.clone(),
                kind: spec.kind,
                platform: spec.platform,
                sources: spec.sources.clone(),
                resources: spec.resources.clone(),
                settings: spec.settings.clone(),
                dependencies: spec.dependencies.clone(),
            })?;
        }

        for (name, spec) in &self.manifest.external {
            graph.add_node(TargetNode {
                name: name.clone(),
                kind: NodeKind::External,
                platform: spec.platform,
                sources: Vec::new(),
                resources: Vec::new(),
                settings: spec.settings.clone(),
                dependencies: spec.dependencies.clone(),
            })?;
        }

        let declared: Vec<(&String, &Vec<String>)> = self
            .manifest
            .targets
            .iter()
            .map(|(name, spec)| (name, &spec.dependencies))
            .chain(self.manifest.external.iter().map(|(name, spec)| (name, &spec.dependencies)))
            .collect();

        for (name, dependencies) in declared {
            for dep in dependencies {
                if !graph.contains(dep) {
                    let candidates: Vec<&str> = graph.nodes().map(|n| n.name.as_str()).collect();
                    let similar = similar_names(dep, &candidates);
                    if !similar.is_empty() {
                        warn!(
                            dependency = %dep,
                            required_by = %name,
                            "unknown dependency, closest declared names: {}",
                            similar.join(", ")
                        );
                    }
                    return Err(GantryError::UnknownDependency {
                        name: dep.clone(),
                        required_by: name.clone(),
                    });
                }
                graph.add_edge(name, dep)?;
            }
        }

        graph.validate()?;

        debug!(
            workspace = %graph.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph resolved"
        );

        Ok(graph)
    }

    /// Build the graph and resolve the cache profile in one step.
    pub fn resolve(&self, profile_name: Option<&str>) -> Result<Resolution, GantryError> {
        let graph = self.build_graph()?;
        let profile = self.config.resolve_profile(profile_name)?;
        debug!(profile = %profile.name, configuration = %profile.configuration, "cache profile selected");
        Ok(Resolution { graph, profile })
    }
}
