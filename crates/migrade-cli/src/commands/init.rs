use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use migrade_config::MigradeConfig;

pub fn cmd_init() -> Result<()> {
    let path = PathBuf::from("migrade.json");
    if path.exists() {
        bail!("migrade.json already exists");
    }

    let config = MigradeConfig::default();
    let json = serde_json::to_string_pretty(&config).context("serialize default config")?;
    fs::write(&path, json).context("write migrade.json")?;
    println!("created {:?}", path);
    Ok(())
}
