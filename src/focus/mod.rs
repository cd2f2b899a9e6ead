//! Focused generation: prune the graph to the requested targets and
//! substitute cached artifacts for their dependencies.
//!
//! A focused run keeps the requested nodes plus everything they transitively
//! depend on; the rest of the graph is dropped. Dependencies that were not
//! explicitly requested are candidates for cache substitution: when the
//! cache holds an artifact for their fingerprint they are marked prebuilt,
//! and the generated workspace references the artifact instead of their
//! sources. Requested nodes always build from source.
//!
//! Cache trouble is never fatal here. A failed lookup is logged at warning
//! level and treated as a miss, so generation degrades to building more from
//! source instead of aborting.

use std::collections::{BTreeMap, BTreeSet};

use futures::StreamExt;
use tracing::{debug, warn};

use crate::cache::{ArtifactDescriptor, CacheError, CacheStore};
use crate::config::CacheProfile;
use crate::constants::default_parallelism;
use crate::core::GantryError;
use crate::graph::{Fingerprint, FingerprintEngine, Graph, TargetNode};
use crate::utils::similar_names;

/// How a node in a focused graph will be materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDisposition {
    /// Built from source in the generated workspace.
    Source,
    /// Replaced by a previously built artifact.
    Prebuilt(ArtifactDescriptor),
}

/// A pruned graph plus the substitution decision for every remaining node.
///
/// Derived per invocation and discarded after generation; the underlying
/// full graph is left untouched.
#[derive(Debug, Clone)]
pub struct FocusedGraph {
    graph: Graph,
    requested: BTreeSet<String>,
    dispositions: BTreeMap<String, BuildDisposition>,
}

impl FocusedGraph {
    /// The pruned dependency graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Names the caller asked for. For a non-focused run this is every node.
    pub fn requested(&self) -> &BTreeSet<String> {
        &self.requested
    }

    /// Disposition for a node, if it survived pruning.
    pub fn disposition(&self, name: &str) -> Option<&BuildDisposition> {
        self.dispositions.get(name)
    }

    pub fn is_prebuilt(&self, name: &str) -> bool {
        matches!(self.dispositions.get(name), Some(BuildDisposition::Prebuilt(_)))
    }

    /// Nodes sorted by name, paired with their dispositions.
    pub fn entries(&self) -> impl Iterator<Item = (&TargetNode, &BuildDisposition)> {
        self.graph.sorted_nodes().into_iter().filter_map(move |node| {
            self.dispositions.get(&node.name).map(|disposition| (node, disposition))
        })
    }

    pub fn prebuilt_count(&self) -> usize {
        self.dispositions
            .values()
            .filter(|d| matches!(d, BuildDisposition::Prebuilt(_)))
            .count()
    }

    pub fn source_count(&self) -> usize {
        self.dispositions.len() - self.prebuilt_count()
    }
}

/// Computes focused graphs against one cache store and profile.
pub struct FocusEngine<'a, S: CacheStore> {
    store: &'a S,
    profile: &'a CacheProfile,
    max_parallel: usize,
}

impl<'a, S: CacheStore> FocusEngine<'a, S> {
    pub fn new(store: &'a S, profile: &'a CacheProfile) -> Self {
        Self {
            store,
            profile,
            max_parallel: default_parallelism(),
        }
    }

    /// Cap the number of concurrent fingerprint computations and cache
    /// lookups.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Prune `graph` down to `requested` and decide substitutions.
    ///
    /// An empty request selects the whole graph with no substitution at
    /// all, which is the non-focused generation mode. Unknown requested
    /// names fail before any cache traffic happens. With `ignore_cache` set
    /// every lookup is skipped and all nodes build from source.
    pub async fn focus(
        &self,
        graph: &Graph,
        requested: &[String],
        ignore_cache: bool,
    ) -> Result<FocusedGraph, GantryError> {
        for name in requested {
            if !graph.contains(name) {
                let candidates: Vec<&str> = graph.nodes().map(|n| n.name.as_str()).collect();
                let similar = similar_names(name, &candidates);
                if !similar.is_empty() {
                    warn!(
                        target = %name,
                        "unknown target, closest declared names: {}",
                        similar.join(", ")
                    );
                }
                return Err(GantryError::UnknownTarget { name: name.clone() });
            }
        }

        let requested_set: BTreeSet<String> = if requested.is_empty() {
            graph.nodes().map(|n| n.name.clone()).collect()
        } else {
            requested.iter().cloned().collect()
        };

        let seeds: Vec<String> = requested_set.iter().cloned().collect();
        let keep: BTreeSet<String> =
            graph.transitive_dependencies(&seeds)?.iter().map(|n| n.name.clone()).collect();
        let focused = graph.subgraph(&keep)?;

        let mut dispositions: BTreeMap<String, BuildDisposition> =
            keep.iter().map(|name| (name.clone(), BuildDisposition::Source)).collect();

        let candidates: Vec<String> =
            keep.iter().filter(|name| !requested_set.contains(*name)).cloned().collect();

        if ignore_cache || candidates.is_empty() {
            if ignore_cache {
                debug!(nodes = keep.len(), "cache bypassed, all nodes build from source");
            }
            return Ok(FocusedGraph {
                graph: focused,
                requested: requested_set,
                dispositions,
            });
        }

        // Fingerprint the whole focused graph in one pass; candidates share
        // dependency fingerprints with the requested nodes.
        let engine = FingerprintEngine::new();
        let all_names: Vec<String> = keep.iter().cloned().collect();
        let prints = engine.fingerprint_many(&all_names, &focused, self.max_parallel).await?;

        let inputs: Vec<(String, Fingerprint)> = candidates
            .iter()
            .filter_map(|name| prints.get(name).map(|print| (name.clone(), print.clone())))
            .collect();

        type LookupOutcome = (String, Result<Option<ArtifactDescriptor>, CacheError>);
        let results: Vec<LookupOutcome> =
            futures::stream::iter(inputs.into_iter().map(|(name, print)| async move {
                let result = self.store.lookup(&print, self.profile).await;
                (name, result)
            }))
            .buffer_unordered(self.max_parallel)
            .collect()
            .await;

        for (name, result) in results {
            match result {
                Ok(Some(descriptor)) => {
                    debug!(target_name = %name, "cache hit, substituting prebuilt artifact");
                    dispositions.insert(name, BuildDisposition::Prebuilt(descriptor));
                }
                Ok(None) => {
                    debug!(target_name = %name, "cache miss, building from source");
                }
                Err(err) => {
                    warn!(target_name = %name, error = %err, "cache lookup failed, treating as miss");
                }
            }
        }

        let focused = FocusedGraph {
            graph: focused,
            requested: requested_set,
            dispositions,
        };
        debug!(
            nodes = focused.graph.node_count(),
            prebuilt = focused.prebuilt_count(),
            "focus complete"
        );
        Ok(focused)
    }
}
