//! Configuration file (templift.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use templift_transform::UpgradeOptions;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub upgrade: UpgradeSettings,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeSettings {
    /// Transform options (`controller_vars`)
    #[serde(flatten)]
    pub options: UpgradeOptions,

    /// File extensions picked up when walking directories
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for UpgradeSettings {
    fn default() -> Self {
        Self {
            options: UpgradeOptions::default(),
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

/// Load configuration if the file exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

pub const DEFAULT_CONFIG: &str = r#"# templift configuration

[upgrade]
# Controller aliases stripped from expressions ($ctrl.name -> name)
controller_vars = ["$ctrl"]

# Extensions of template files picked up from directories
extensions = ["html"]
"#;
