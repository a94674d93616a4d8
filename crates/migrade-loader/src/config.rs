use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use migrade_config::MigradeConfig;

/// Load migrade.json config from current directory.
pub fn load_config() -> Result<MigradeConfig> {
    let path = PathBuf::from("migrade.json");
    if !path.exists() {
        anyhow::bail!("migrade.json not found. Run 'migrade init' first.");
    }
    load_config_from_path(path)
}

/// Load config from a specific path.
pub fn load_config_from_path(path: PathBuf) -> Result<MigradeConfig> {
    if !path.exists() {
        anyhow::bail!("migrade.json not found at: {}", path.display());
    }

    let content = fs::read_to_string(&path).context("read migrade.json")?;
    let config: MigradeConfig = serde_json::from_str(&content).context("parse migrade.json")?;
    Ok(config)
}

/// Load config from a project root, with fallback to defaults.
pub fn load_config_or_default(project_root: Option<PathBuf>) -> Result<MigradeConfig> {
    let config_path = if let Some(root) = project_root {
        root.join("migrade.json")
    } else {
        PathBuf::from("migrade.json")
    };

    if config_path.exists() {
        load_config_from_path(config_path)
    } else {
        Ok(MigradeConfig::default())
    }
}
