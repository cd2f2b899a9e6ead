//! Integration tests for error handling and edge cases
//!
//! Every failure here must exit non-zero with a message naming the actual
//! problem on stderr, and must not leave partial output behind.

use anyhow::Result;
use std::fs;

use crate::common::{FileAssert, TestProject};
use gantry_cli::test_utils::{ConfigFixture, ManifestFixture};

/// Requesting a target the manifest does not declare fails and names it
#[test]
fn test_unknown_target_fails_and_names_it() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let output = project.run_gantry(&["generate", "Ghost", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Target 'Ghost' is not declared in the manifest");
    assert_eq!(output.code, Some(1));

    FileAssert::not_exists(project.workspace_dir("Focus"));

    Ok(())
}

/// A dependency cycle in the manifest is reported with the cycle path
#[test]
fn test_cycle_is_detected() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::cyclic())?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Circular dependency detected");

    Ok(())
}

/// A dependency on an undeclared target is reported with both names
#[test]
fn test_unknown_dependency_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::unknown_dependency())?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Unknown dependency 'Coer' required by 'App'");

    Ok(())
}

/// Selecting a profile the configuration does not define fails
#[test]
fn test_unknown_profile_is_rejected() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let output = project.run_gantry(&["generate", "--profile", "ci", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Cache profile 'ci' is not defined in the configuration");

    Ok(())
}

/// A configuration without a default profile requires an explicit --profile
#[test]
fn test_missing_default_profile_requires_explicit_flag() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;
    project.write_config(&ConfigFixture::without_default_profile(project.cache_path()))?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("No cache profile selected");

    // Naming the profile explicitly works with the same configuration
    let output = project.run_gantry(&["generate", "--profile", "development", "--no-open"])?;
    output.assert_success();

    Ok(())
}

/// Running outside a project fails with a manifest discovery error
#[test]
fn test_missing_manifest() -> Result<()> {
    let project = TestProject::new()?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Manifest file gantry.toml not found");

    Ok(())
}

/// Broken TOML in the manifest is reported as a parse failure
#[test]
fn test_invalid_manifest_syntax() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::invalid_syntax())?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Invalid manifest file syntax");

    Ok(())
}

/// GANTRY_CONFIG pointing at a missing file is an error, not a silent
/// fallback to defaults
#[test]
fn test_missing_config_file_is_an_error() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;
    fs::remove_file(project.config_path())?;

    let output = project.run_gantry(&["generate", "--no-open"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Configuration file not found");

    Ok(())
}

/// Unknown subcommands and flags are rejected by the parser
#[test]
fn test_unknown_flag_is_rejected() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&ManifestFixture::app_core())?;

    let output = project.run_gantry(&["generate", "--frobnicate"])?;
    output.assert_failure();
    assert_eq!(output.code, Some(2));

    Ok(())
}
