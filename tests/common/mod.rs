//! Shared harness for gantry integration tests
//!
//! Everything here revolves around [`TestProject`]: one temporary directory
//! holding a project, a private cache, and a config file wired to that cache,
//! plus assertion helpers for the binary's output and the files it writes.

// Not every test file uses every helper.
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use gantry_cli::config::{CacheProfile, Config};
use gantry_cli::constants::MANIFEST_FILE;
use gantry_cli::generator::WorkspaceDocument;
use gantry_cli::graph::{Fingerprint, FingerprintEngine};
use gantry_cli::manifest::Manifest;
use gantry_cli::resolver::GraphResolver;
use gantry_cli::test_utils::{ConfigFixture, ManifestFixture, descriptor, seed_cache_entry};

/// An isolated project directory with its own cache and configuration.
///
/// The configuration points the cache at a sibling of the project inside the
/// same temporary directory, so runs never read or write the real user cache.
pub struct TestProject {
    _temp_dir: TempDir, // Dropping this deletes the whole tree
    project_dir: PathBuf,
    cache_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    /// Set up the directory layout and a cache-local configuration.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let cache_dir = temp_dir.path().join("cache");
        for dir in [&project_dir, &cache_dir] {
            fs::create_dir_all(dir)?;
        }

        let config_path = ConfigFixture::with_cache_dir(&cache_dir).write_to(temp_dir.path())?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            cache_dir,
            config_path,
        })
    }

    /// Where gantry.toml and the generated workspace live.
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// The cache root the test configuration points at.
    pub fn cache_path(&self) -> &Path {
        &self.cache_dir
    }

    /// The configuration file handed to the binary via `GANTRY_CONFIG`.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write a manifest fixture into the project directory.
    pub fn write_manifest(&self, fixture: &ManifestFixture) -> Result<PathBuf> {
        fixture.write_to(&self.project_dir)
    }

    /// Replace the configuration file with a different fixture.
    pub fn write_config(&self, fixture: &ConfigFixture) -> Result<()> {
        fs::write(&self.config_path, &fixture.content)
            .with_context(|| format!("Failed to write config to {:?}", self.config_path))?;
        Ok(())
    }

    /// Create a source file (parents included) inside the project directory.
    pub fn create_source_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;
        Ok(())
    }

    /// Path of the workspace directory a generation run produces.
    pub fn workspace_dir(&self, name: &str) -> PathBuf {
        self.project_dir.join(format!("{name}.gworkspace"))
    }

    /// Read and parse the generated workspace document.
    pub fn read_workspace_document(&self, name: &str) -> Result<WorkspaceDocument> {
        let path = self.workspace_dir(name).join("workspace.json");
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read workspace document {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse workspace document {}", path.display()))
    }

    /// Compute a target's fingerprint exactly as a generation run will.
    pub fn fingerprint_of(&self, target: &str) -> Result<Fingerprint> {
        let manifest = Manifest::load(&self.project_dir.join(MANIFEST_FILE))?;
        let config = Config::bootstrap();
        let graph = GraphResolver::new(&manifest, &config).build_graph()?;
        Ok(FingerprintEngine::new().fingerprint(target, &graph)?)
    }

    /// Seed a cache entry for `target` under the `development` profile,
    /// backed by a real artifact file inside the cache directory.
    pub fn seed_artifact(&self, target: &str) -> Result<PathBuf> {
        let fingerprint = self.fingerprint_of(target)?;
        let artifact = self.cache_dir.join(format!("{target}.framework"));
        fs::write(&artifact, b"prebuilt")?;

        let profile = development_profile();
        let desc = descriptor(fingerprint, target, &profile.configuration, &artifact);
        seed_cache_entry(&self.cache_dir, &profile, &desc)?;
        Ok(artifact)
    }

    /// Seed a cache entry whose artifact file does not exist on disk.
    pub fn seed_dangling_artifact(&self, target: &str) -> Result<()> {
        let fingerprint = self.fingerprint_of(target)?;
        let missing = self.cache_dir.join(format!("{target}.gone"));

        let profile = development_profile();
        let desc = descriptor(fingerprint, target, &profile.configuration, &missing);
        seed_cache_entry(&self.cache_dir, &profile, &desc)?;
        Ok(())
    }

    /// Run the gantry binary in the project directory and capture its output.
    ///
    /// Progress and color are switched off so assertions see plain text.
    pub fn run_gantry(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(env!("CARGO_BIN_EXE_gantry"))
            .args(args)
            .current_dir(&self.project_dir)
            .env("GANTRY_CONFIG", &self.config_path)
            .env("GANTRY_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run gantry command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// The profile the test configuration marks as default.
pub fn development_profile() -> CacheProfile {
    CacheProfile {
        name: "development".to_string(),
        configuration: "debug".to_string(),
    }
}

/// Captured output of one binary invocation.
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Panic unless the run succeeded, dumping both streams.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "gantry exited with {:?}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Panic unless the run failed.
    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "gantry unexpectedly succeeded\n--- stdout ---\n{}",
            self.stdout
        );
        self
    }

    /// Panic unless stdout contains `text`.
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "stdout is missing {text:?}\n--- stdout ---\n{}",
            self.stdout
        );
        self
    }

    /// Panic unless stderr contains `text`.
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "stderr is missing {text:?}\n--- stderr ---\n{}",
            self.stderr
        );
        self
    }
}

/// Assertions about files a run should or should not have produced.
pub struct FileAssert;

impl FileAssert {
    /// Panic unless `path` exists.
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "missing expected file: {}", path.display());
    }

    /// Panic if `path` exists.
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "file should not exist: {}", path.display());
    }
}
