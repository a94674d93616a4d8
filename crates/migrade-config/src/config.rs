use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Detects whether the migration tool has ever run: counts its bookkeeping
/// tables. A result of 0 means it never ran.
pub fn default_bookkeeping_probe() -> String {
    "select count(*) FROM information_schema.tables where table_name='DATABASECHANGELOG';"
        .to_string()
}

/// Detects whether the database is empty: counts the tables of the current
/// schema. A result of 0 means an empty database.
pub fn default_empty_db_probe() -> String {
    "SELECT count(*) FROM information_schema.tables where table_schema=database();".to_string()
}

fn default_namespace() -> String {
    "core".to_string()
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("sql")
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("plugins")
}

/// Top-level migrade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigradeConfig {
    /// Whether the migration pass runs at all. Off by default: nothing runs
    /// unless the operator explicitly opts in.
    #[serde(default)]
    pub enabled: bool,
    /// Key prefix for durable plugin-status entries.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Root directory of the candidate migration scripts.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
    /// Directory holding plugin descriptor files.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: PathBuf,
    /// Overridable SQL probe for "has the tool ever run".
    #[serde(default = "default_bookkeeping_probe")]
    pub bookkeeping_probe: String,
    /// Overridable SQL probe for "is the database empty".
    #[serde(default = "default_empty_db_probe")]
    pub empty_db_probe: String,
    /// Allow re-applying the latest update script of a snapshot version.
    #[serde(default)]
    pub accept_snapshot: bool,
    /// Allow re-applying the latest update script of an unstable version.
    #[serde(default)]
    pub accept_unstable: bool,
    /// Target SQL dialect for line rewriting, e.g. `mysql`.
    #[serde(default)]
    pub dialect: Option<String>,
    /// Rules file for the per-dialect line filter.
    #[serde(default)]
    pub filter_rules: Option<PathBuf>,
}

impl Default for MigradeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: default_namespace(),
            scripts_dir: default_scripts_dir(),
            plugins_dir: default_plugins_dir(),
            bookkeeping_probe: default_bookkeeping_probe(),
            empty_db_probe: default_empty_db_probe(),
            accept_snapshot: false,
            accept_unstable: false,
            dialect: None,
            filter_rules: None,
        }
    }
}

impl MigradeConfig {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    pub fn bookkeeping_probe(&self) -> &str {
        &self.bookkeeping_probe
    }

    pub fn empty_db_probe(&self) -> &str {
        &self.empty_db_probe
    }

    pub fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref()
    }

    pub fn filter_rules(&self) -> Option<&Path> {
        self.filter_rules.as_deref()
    }
}
