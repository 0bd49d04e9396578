//! Resolved settings consumed by the orchestrator and audit log.
//!
//! Loaded from `.axcheck.yml` (or a `--config` override). A missing file
//! yields the built-in defaults; unknown keys are ignored so configs can
//! carry forward-compatible sections.

use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::Path;

/// Sentinel `audit_path` value selecting the ephemeral in-memory store.
pub const MEMORY_AUDIT_PATH: &str = ":memory:";

const DEFAULT_AUDIT_PATH: &str = ".axcheck/audit.sqlite";

fn default_strictness() -> String {
    "warn".to_string()
}

/// Global settings (`global:` in `.axcheck.yml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub strictness: String,
    pub enabled: bool,
    /// Audit store location; [`MEMORY_AUDIT_PATH`] selects the in-memory store.
    pub audit_path: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            strictness: default_strictness(),
            enabled: true,
            audit_path: DEFAULT_AUDIT_PATH.to_string(),
        }
    }
}

/// Per-rule-category settings (`engines.spec:`, `engines.test:`, …).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub enabled: bool,
    pub strictness: String,
    pub min_coverage: Option<u32>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strictness: default_strictness(),
            min_coverage: None,
        }
    }
}

/// The engine settings table, one entry per rule category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Engines {
    pub spec: EngineSettings,
    pub test: EngineSettings,
    #[serde(alias = "traceability")]
    pub trace: EngineSettings,
}

/// Fully resolved configuration. The core only ever sees this value —
/// file parsing and validation happen before any engine runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "global")]
    pub global_settings: GlobalSettings,
    pub engines: Engines,
}

/// Load configuration from a YAML file, falling back to defaults when the
/// file does not exist. A present-but-malformed file is a hard error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
