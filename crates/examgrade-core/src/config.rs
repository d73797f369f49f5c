//! examgrade configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::AttemptEngineConfig;
use crate::grader::TextMatchPolicy;

/// Top-level examgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamgradeConfig {
    /// How fill-in-blank and reading answers are compared.
    #[serde(default)]
    pub text_match: TextMatchPolicy,
    /// Where attempt records are stored.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Max attempts graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("./examgrade-results")
}
fn default_parallelism() -> usize {
    4
}

impl Default for ExamgradeConfig {
    fn default() -> Self {
        Self {
            text_match: TextMatchPolicy::default(),
            results_dir: default_results_dir(),
            parallelism: default_parallelism(),
        }
    }
}

impl ExamgradeConfig {
    pub fn engine_config(&self) -> AttemptEngineConfig {
        AttemptEngineConfig {
            parallelism: self.parallelism,
            text_match: self.text_match,
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examgrade.toml` in the current directory
/// 2. `~/.config/examgrade/config.toml`
///
/// Environment variable override: `EXAMGRADE_TEXT_MATCH`.
pub fn load_config() -> Result<ExamgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => ExamgradeConfig::default(),
    };

    if let Ok(policy) = std::env::var("EXAMGRADE_TEXT_MATCH") {
        config.text_match = policy
            .parse()
            .map_err(|e: String| anyhow::anyhow!("EXAMGRADE_TEXT_MATCH: {e}"))?;
    }

    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<ExamgradeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ExamgradeConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examgrade"))
}
