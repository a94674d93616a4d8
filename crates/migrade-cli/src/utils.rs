use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use migrade_gate::MemoryStore;

/// Load a durable-store snapshot from a JSON object of key to value.
pub fn load_store(path: Option<PathBuf>) -> Result<MemoryStore> {
    let Some(path) = path else {
        return Ok(MemoryStore::new());
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("read store snapshot: {}", path.display()))?;
    let entries: BTreeMap<String, String> =
        serde_json::from_str(&content).context("parse store snapshot")?;
    Ok(entries.into_iter().collect())
}
