//! Integration tests for the automation graph client
//!
//! These exercise [`GraphClient`] against the real compiled binary: the
//! client spawns `gantry graph`, collects the JSON export from a temporary
//! directory, and parses it back into a graph.

use anyhow::Result;
use tempfile::TempDir;

use crate::common::TestProject;
use gantry_cli::automation::GraphClient;
use gantry_cli::core::GantryError;
use gantry_cli::test_utils::ManifestFixture;

fn client() -> GraphClient {
    GraphClient::with_binary(env!("CARGO_BIN_EXE_gantry"))
}

/// The client loads a full graph out of a real project
#[tokio::test]
async fn test_load_graph_from_project() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::basic())?;

    let graph = client().load_graph(Some(project.project_path())).await?;

    assert_eq!(graph.name(), "Shop");
    assert_eq!(graph.node_count(), 4);

    let deps: Vec<String> = graph
        .direct_dependencies("App")
        .iter()
        .map(|n| n.name.clone())
        .collect();
    assert!(deps.contains(&"UI".to_string()));
    assert!(deps.contains(&"Net".to_string()));

    Ok(())
}

/// Externals survive the export round trip
#[tokio::test]
async fn test_load_graph_includes_externals() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::with_external())?;

    let graph = client().load_graph(Some(project.project_path())).await?;

    assert!(graph.contains("Analytics"));

    Ok(())
}

/// A failing export surfaces the binary's exit code and stderr unchanged
#[tokio::test]
async fn test_load_graph_propagates_export_failure() -> Result<()> {
    let empty = TempDir::new()?;

    let err = client().load_graph(Some(empty.path())).await.unwrap_err();
    match err {
        GantryError::CommandExited { code, stderr, .. } => {
            assert_eq!(code, 1);
            assert!(
                stderr.contains("Manifest file gantry.toml not found"),
                "unexpected stderr: {stderr}"
            );
        }
        other => panic!("expected CommandExited, got {other:?}"),
    }

    Ok(())
}

/// A cyclic project fails the export rather than producing a bogus graph
#[tokio::test]
async fn test_load_graph_fails_on_cycle() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::cyclic())?;

    let err = client().load_graph(Some(project.project_path())).await.unwrap_err();
    match err {
        GantryError::CommandExited { stderr, .. } => {
            assert!(stderr.contains("Circular dependency detected"));
        }
        other => panic!("expected CommandExited, got {other:?}"),
    }

    Ok(())
}
