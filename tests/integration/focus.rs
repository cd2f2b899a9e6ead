//! Integration tests for focused generation and cache substitution
//!
//! Focused runs name one or more targets on the command line. The workspace
//! must contain exactly the requested targets plus their transitive
//! dependencies; cached dependencies are replaced by prebuilt artifacts,
//! requested targets never are.

use anyhow::Result;

use crate::common::{FileAssert, TestProject};
use gantry_cli::generator::TargetDisposition;
use gantry_cli::test_utils::ManifestFixture;

fn focus_project() -> Result<TestProject> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;
    project.create_source_file("App/main.swift", "// main")?;
    project.create_source_file("Core/lib.swift", "// lib")?;
    project.create_source_file("Tool/tool.swift", "// tool")?;
    Ok(project)
}

/// Focusing on App keeps its dependency closure and drops the unrelated
/// Tool target from the workspace
#[test]
fn test_focused_generation_prunes_unrelated_targets() -> Result<()> {
    let project = focus_project()?;

    let output = project.run_gantry(&["generate", "App", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    let names: Vec<&str> = document.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Core"]);

    Ok(())
}

/// Requesting a leaf drops its cached dependents entirely. App has a cache
/// entry, but it is not in Core's closure, so it is pruned rather than
/// substituted
#[test]
fn test_requesting_leaf_drops_cached_dependents() -> Result<()> {
    let project = focus_project()?;
    project.seed_artifact("App")?;

    let output = project.run_gantry(&["generate", "Core", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    let names: Vec<&str> = document.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Core"]);
    assert_eq!(document.targets[0].disposition, TargetDisposition::Source);
    assert!(document.targets[0].artifact.is_none());

    Ok(())
}

/// A cached, unrequested dependency is marked prebuilt and carries the
/// artifact descriptor instead of sources
#[test]
fn test_cached_dependency_becomes_prebuilt() -> Result<()> {
    let project = focus_project()?;
    let artifact_path = project.seed_artifact("Core")?;
    let expected = project.fingerprint_of("Core")?;

    let output = project.run_gantry(&["generate", "App", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;

    let core = document.targets.iter().find(|t| t.name == "Core").unwrap();
    assert_eq!(core.disposition, TargetDisposition::Prebuilt);
    assert!(core.sources.is_empty());
    let artifact = core.artifact.as_ref().unwrap();
    assert_eq!(artifact.fingerprint, expected);
    assert_eq!(artifact.path, artifact_path);

    // The requested target itself always builds from source
    let app = document.targets.iter().find(|t| t.name == "App").unwrap();
    assert_eq!(app.disposition, TargetDisposition::Source);
    assert_eq!(app.sources, vec!["App/main.swift"]);

    Ok(())
}

/// `--ignore-cache` skips substitution even when a matching artifact exists
#[test]
fn test_ignore_cache_builds_everything_from_source() -> Result<()> {
    let project = focus_project()?;
    project.seed_artifact("Core")?;

    let output = project.run_gantry(&["generate", "App", "--ignore-cache", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    assert!(
        document
            .targets
            .iter()
            .all(|t| t.disposition == TargetDisposition::Source)
    );

    Ok(())
}

/// A cache entry whose artifact file vanished is treated as a miss
#[test]
fn test_vanished_artifact_falls_back_to_source() -> Result<()> {
    let project = focus_project()?;
    project.seed_dangling_artifact("Core")?;

    let output = project.run_gantry(&["generate", "App", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    let core = document.targets.iter().find(|t| t.name == "Core").unwrap();
    assert_eq!(core.disposition, TargetDisposition::Source);
    assert!(!core.sources.is_empty());

    Ok(())
}

/// Artifacts cached under one profile are invisible to another; the release
/// namespace is empty, so Core stays a source build
#[test]
fn test_profiles_use_separate_cache_namespaces() -> Result<()> {
    let project = focus_project()?;
    project.seed_artifact("Core")?;

    let output =
        project.run_gantry(&["generate", "App", "--profile", "release", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    let core = document.targets.iter().find(|t| t.name == "Core").unwrap();
    assert_eq!(core.disposition, TargetDisposition::Source);

    Ok(())
}

/// Focusing on every declared target behaves like a full generation with no
/// substitution at all
#[test]
fn test_requesting_all_targets_never_substitutes() -> Result<()> {
    let project = focus_project()?;
    project.seed_artifact("App")?;
    project.seed_artifact("Core")?;
    project.seed_artifact("Tool")?;

    let output =
        project.run_gantry(&["generate", "App", "Core", "Tool", "--no-open"])?;
    output.assert_success();

    let document = project.read_workspace_document("Focus")?;
    assert_eq!(document.targets.len(), 3);
    assert!(
        document
            .targets
            .iter()
            .all(|t| t.disposition == TargetDisposition::Source)
    );

    Ok(())
}

/// A failed focused run must not leave a partial workspace behind
#[test]
fn test_failed_focus_leaves_no_workspace() -> Result<()> {
    let project = focus_project()?;

    let output = project.run_gantry(&["generate", "Ghost", "--no-open"])?;
    output.assert_failure();

    FileAssert::not_exists(project.workspace_dir("Focus"));

    Ok(())
}
