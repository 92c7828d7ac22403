//! Resolver configuration.
//!
//! The config is a small JSON document; every key is optional so a partial
//! file only overrides what it names.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Settings consumed by the Maven artifact resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JarvizConfig {
    /// Local repository root: cache of fetched artifacts and fetch destination.
    pub artifact_directory: PathBuf,
    /// Absorb fetch failures instead of failing the resolve.
    pub continue_on_maven_error: bool,
    pub maven_time_out_seconds: u64,
    /// Explicit fetch tool; defaults to `mvn` (`mvn.cmd` on Windows) from PATH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maven_tool: Option<PathBuf>,
}

impl Default for JarvizConfig {
    fn default() -> Self {
        default_config()
    }
}

fn default_artifact_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("jarviz")
        .join("artifacts")
}

/// Build the config used when no file is given.
pub fn default_config() -> JarvizConfig {
    JarvizConfig {
        artifact_directory: default_artifact_directory(),
        continue_on_maven_error: false,
        maven_time_out_seconds: DEFAULT_TIMEOUT_SECONDS,
        maven_tool: None,
    }
}

/// Load a config file, filling absent keys with defaults.
pub fn load_config(path: &Path) -> Result<JarvizConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: JarvizConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(path: &Path, config: &JarvizConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &JarvizConfig) -> Result<()> {
    if config.artifact_directory.as_os_str().is_empty() {
        return Err(anyhow!("artifactDirectory must not be empty"));
    }
    if config.maven_time_out_seconds == 0 {
        return Err(anyhow!("mavenTimeOutSeconds must be greater than zero"));
    }
    if let Some(tool) = &config.maven_tool {
        if tool.as_os_str().is_empty() {
            return Err(anyhow!("mavenTool must not be empty when set"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
