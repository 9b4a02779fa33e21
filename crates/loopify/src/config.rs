//! Project configuration (`loopify.toml`)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use loopify_transform::RuleConfig;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "loopify.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub rules: RuleConfig,
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Load the rule configuration.
///
/// An explicit path must exist. Without one, `loopify.toml` in `root` is used
/// when present and every rule is enabled otherwise.
pub fn load(explicit: Option<&Path>, root: &Path) -> Result<RuleConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = root.join(CONFIG_FILE);
            if !candidate.is_file() {
                log::debug!("no {} in {}, enabling every rule", CONFIG_FILE, root.display());
                return Ok(RuleConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let config = ProjectConfig::parse(&content)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    log::info!("loaded rule configuration from {}", path.display());
    Ok(config.rules)
}
