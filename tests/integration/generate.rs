//! Integration tests for full workspace generation
//!
//! These drive `gantry generate` end to end: manifest discovery, graph
//! resolution, glob expansion, and the workspace document on disk.

use anyhow::Result;

use crate::common::{FileAssert, TestProject};
use gantry_cli::generator::{TargetDisposition, WorkspaceDocument};
use gantry_cli::graph::NodeKind;
use gantry_cli::test_utils::ManifestFixture;

fn seed_shop_sources(project: &TestProject) -> Result<()> {
    project.create_source_file("App/Sources/main.swift", "// main")?;
    project.create_source_file("App/Sources/scene.swift", "// scene")?;
    project.create_source_file("UI/Sources/view.swift", "// view")?;
    project.create_source_file("Net/Sources/client.swift", "// client")?;
    project.create_source_file("Core/Sources/lib.swift", "// lib")?;
    Ok(())
}

/// A plain `gantry generate` emits a workspace with every target built from
/// source and all glob patterns expanded
#[test]
fn test_generate_full_workspace() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::basic())?;
    seed_shop_sources(&project)?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_success()
        .assert_stdout_contains("Project generated.")
        .assert_stdout_contains("Total time taken:");

    let document = project.read_workspace_document("Shop")?;
    assert_eq!(document.name, "Shop");

    let names: Vec<&str> = document.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Core", "Net", "UI"]);
    assert!(
        document
            .targets
            .iter()
            .all(|t| t.disposition == TargetDisposition::Source)
    );

    let app = &document.targets[0];
    assert_eq!(
        app.sources,
        vec!["App/Sources/main.swift", "App/Sources/scene.swift"]
    );
    assert_eq!(app.dependencies, vec!["UI", "Net"]);

    Ok(())
}

/// `--output-path` redirects the workspace away from the project root
#[test]
fn test_generate_into_output_path() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;
    project.create_source_file("App/main.swift", "// main")?;
    project.create_source_file("Core/lib.swift", "// lib")?;

    let out_dir = project.project_path().join("build/workspaces");
    let out = out_dir.display().to_string();
    let output = project.run_gantry(&["generate", "--no-open", "--output-path", &out])?;
    output.assert_success();

    FileAssert::exists(out_dir.join("Focus.gworkspace/workspace.json"));
    FileAssert::not_exists(project.workspace_dir("Focus"));

    Ok(())
}

/// Running generation twice yields the same workspace shape
#[test]
fn test_generate_is_idempotent() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;
    project.create_source_file("App/main.swift", "// main")?;
    project.create_source_file("Core/lib.swift", "// lib")?;

    project.run_gantry(&["generate", "--no-open"])?.assert_success();
    let first = project.read_workspace_document("Focus")?;

    project.run_gantry(&["generate", "--no-open"])?.assert_success();
    let second = project.read_workspace_document("Focus")?;

    let shape = |doc: &WorkspaceDocument| -> Vec<(String, TargetDisposition)> {
        doc.targets.iter().map(|t| (t.name.clone(), t.disposition)).collect()
    };
    assert_eq!(shape(&first), shape(&second));

    Ok(())
}

/// External prebuilt dependencies appear in the workspace as external
/// targets with no sources of their own
#[test]
fn test_generate_includes_external_targets() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::with_external())?;
    project.create_source_file("App/main.swift", "// main")?;
    project.create_source_file("Core/lib.swift", "// lib")?;

    project.run_gantry(&["generate", "--no-open"])?.assert_success();
    let document = project.read_workspace_document("Shop")?;

    let analytics = document.targets.iter().find(|t| t.name == "Analytics").unwrap();
    assert_eq!(analytics.kind, NodeKind::External);
    assert!(analytics.sources.is_empty());

    let app = document.targets.iter().find(|t| t.name == "App").unwrap();
    assert!(app.dependencies.contains(&"Analytics".to_string()));

    Ok(())
}

/// Glob patterns matching nothing produce a target with an empty source
/// list rather than an error
#[test]
fn test_generate_with_no_matching_sources() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    let app = document.targets.iter().find(|t| t.name == "App").unwrap();
    assert!(app.sources.is_empty());

    Ok(())
}
