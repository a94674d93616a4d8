use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One candidate migration script: its path relative to the scripts root
/// (forward slashes, the form the path parser consumes) and its location on
/// disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub rel: String,
    pub path: PathBuf,
}

/// Enumerate every `.sql` file under the scripts root, in ascending relative
/// path order. The ordering is load-bearing: the decision pass depends on it.
pub fn discover_scripts(root: &Path) -> Result<Vec<ScriptFile>> {
    let mut scripts = Vec::new();
    if !root.exists() {
        return Ok(scripts);
    }

    visit(root, root, &mut scripts)?;
    scripts.sort_by(|a, b| a.rel.cmp(&b.rel));
    tracing::debug!(count = scripts.len(), "candidate scripts discovered");
    Ok(scripts)
}

fn visit(dir: &Path, root: &Path, out: &mut Vec<ScriptFile>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read scripts directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("read directory entry")?;
        let path = entry.path();
        if path.is_dir() {
            visit(&path, root, out)?;
        } else if path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
        {
            let rel = path
                .strip_prefix(root)
                .context("script path outside scripts root")?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(ScriptFile { rel, path });
        }
    }
    Ok(())
}
