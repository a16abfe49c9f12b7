//! Configuration file support for funcsize
//!
//! Loads scan settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.funcsizerc.json` in the working directory
//! 3. `funcsize.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MIN_SIZE: usize = 1;
pub const DEFAULT_TOP: usize = 5;
pub const DEFAULT_JOBS: usize = 4;
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 300;

/// Config file names probed in order during discovery
const CONFIG_FILE_NAMES: &[&str] = &[".funcsizerc.json", "funcsize.config.json"];

/// funcsize configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuncsizeConfig {
    /// Glob patterns for files to include (default: all supported extensions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude, matched against repository-relative paths
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra directory names skipped during discovery
    #[serde(default)]
    pub skip_dirs: Vec<String>,

    /// Smallest function size (in lines) to report
    #[serde(default)]
    pub min_size: Option<usize>,

    /// Number of largest functions reported per repository
    #[serde(default)]
    pub top: Option<usize>,

    /// Repositories scanned in parallel
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Timeout for cloning a remote repository, in seconds
    #[serde(default)]
    pub clone_timeout_secs: Option<u64>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Source patterns, kept for display
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub skip_dirs: Vec<String>,
    pub min_size: usize,
    pub top: usize,
    pub jobs: usize,
    pub clone_timeout: Duration,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl FuncsizeConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_size", self.min_size),
            ("top", self.top),
            ("jobs", self.jobs),
        ] {
            if value == Some(0) {
                anyhow::bail!("{} must be at least 1 (got 0)", name);
            }
        }

        if self.clone_timeout_secs == Some(0) {
            anyhow::bail!("clone_timeout_secs must be positive (got 0)");
        }

        for dir in &self.skip_dirs {
            if dir.is_empty() || dir.contains('/') || dir.contains('\\') {
                anyhow::bail!("skip_dirs entries must be plain directory names (got {:?})", dir);
            }
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_globset(&self.include)?)
        };
        let exclude = build_globset(&self.exclude)?;

        Ok(ResolvedConfig {
            include,
            exclude,
            include_patterns: self.include.clone(),
            exclude_patterns: self.exclude.clone(),
            skip_dirs: self.skip_dirs.clone(),
            min_size: self.min_size.unwrap_or(DEFAULT_MIN_SIZE),
            top: self.top.unwrap_or(DEFAULT_TOP),
            jobs: self.jobs.unwrap_or(DEFAULT_JOBS),
            clone_timeout: Duration::from_secs(
                self.clone_timeout_secs
                    .unwrap_or(DEFAULT_CLONE_TIMEOUT_SECS),
            ),
            config_path: None,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

impl ResolvedConfig {
    /// Check if a repository-relative path should be scanned
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        // Check exclude first
        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        // If include patterns exist, file must match at least one
        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Check if a directory name was configured to be skipped
    pub fn skips_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        FuncsizeConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(FuncsizeConfig, PathBuf)>> {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<FuncsizeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: FuncsizeConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (FuncsizeConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
