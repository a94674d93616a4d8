use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use migrade_core::{PluginCatalog, PluginDescriptor};

/// Load every plugin descriptor from a directory into a catalog.
///
/// Descriptors are JSON or YAML files carrying `name` and `version` fields.
/// A missing directory yields an empty catalog; a malformed descriptor is an
/// error, since an unreadable version would silently break gating for that
/// plugin.
pub fn load_catalog(dir: &Path) -> Result<PluginCatalog> {
    let mut catalog = PluginCatalog::new();
    if !dir.exists() {
        return Ok(catalog);
    }

    let entries = fs::read_dir(dir).context("read plugins directory")?;
    for entry in entries {
        let entry = entry.context("read directory entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|s| s.to_str());
        let descriptor: PluginDescriptor = match ext {
            Some("json") => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("read plugin descriptor: {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("parse plugin descriptor: {}", path.display()))?
            }
            Some("yaml") | Some("yml") => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("read plugin descriptor: {}", path.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("parse plugin descriptor: {}", path.display()))?
            }
            _ => continue,
        };
        catalog.insert(descriptor.name, descriptor.version);
    }

    tracing::debug!(plugins = catalog.len(), "plugin catalog loaded");
    Ok(catalog)
}
