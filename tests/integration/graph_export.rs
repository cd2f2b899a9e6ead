//! Integration tests for graph export in JSON and DOT formats

use anyhow::Result;

use crate::common::{FileAssert, TestProject};
use gantry_cli::graph::WireGraph;
use gantry_cli::test_utils::ManifestFixture;

/// `gantry graph` writes graph.json into the working directory and the
/// export round-trips through the wire format
#[test]
fn test_graph_export_json() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::basic())?;

    let output = project.run_gantry(&["graph"])?;
    output.assert_success().assert_stdout_contains("Graph exported to");

    let export_path = project.project_path().join("graph.json");
    FileAssert::exists(&export_path);

    let raw = std::fs::read_to_string(&export_path)?;
    let graph = WireGraph::from_json(&raw)?.into_graph()?;
    assert_eq!(graph.name(), "Shop");
    assert_eq!(graph.node_count(), 4);
    assert!(graph.contains("App"));

    let deps: Vec<String> = graph
        .direct_dependencies("App")
        .iter()
        .map(|n| n.name.clone())
        .collect();
    assert!(deps.contains(&"UI".to_string()));
    assert!(deps.contains(&"Net".to_string()));

    Ok(())
}

/// The raw JSON shape is stable enough for third-party consumers
#[test]
fn test_graph_export_json_shape() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    project.run_gantry(&["graph"])?.assert_success();

    let raw = std::fs::read_to_string(project.project_path().join("graph.json"))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    assert_eq!(value["name"], "Focus");
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert!(nodes.iter().any(|n| n["name"] == "App"));

    Ok(())
}

/// `--format dot` emits a Graphviz digraph into --output-path
#[test]
fn test_graph_export_dot() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let out_dir = project.project_path().join("exports");
    let out = out_dir.display().to_string();
    let output = project.run_gantry(&["graph", "--format", "dot", "--output-path", &out])?;
    output.assert_success();

    let dot = std::fs::read_to_string(out_dir.join("graph.dot"))?;
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("label = \"App\""));
    assert!(dot.contains("label = \"Core\""));

    Ok(())
}

/// Unsupported formats are rejected by argument parsing
#[test]
fn test_graph_export_rejects_unknown_format() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let output = project.run_gantry(&["graph", "--format", "yaml"])?;
    output.assert_failure();
    assert_eq!(output.code, Some(2));

    Ok(())
}

/// Graph export fails on a cyclic manifest instead of producing a file
#[test]
fn test_graph_export_fails_on_cycle() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::cyclic())?;

    let output = project.run_gantry(&["graph"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Circular dependency detected");
    FileAssert::not_exists(project.project_path().join("graph.json"));

    Ok(())
}
