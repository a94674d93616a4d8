use std::collections::{BTreeMap, HashMap};

use migrade_core::{PluginCatalog, PluginVersion, CORE_PLUGIN};

use crate::error::GateError;
use crate::store::VersionStore;

/// Stored when the core pseudo-plugin has no recorded version: newer than any
/// real version, so core scripts are never replayed against an externally
/// provisioned database.
const CORE_SENTINEL_VERSION: &str = "2147483647";

const LAST_RUN_CREATE: &str = "create/init";
const LAST_RUN_UPDATE: &str = "update";

/// Kind of the script last applied for a plugin, as recorded durably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastRunKind {
    Create,
    Update,
}

impl LastRunKind {
    pub fn as_store_value(self) -> &'static str {
        match self {
            LastRunKind::Create => LAST_RUN_CREATE,
            LastRunKind::Update => LAST_RUN_UPDATE,
        }
    }

    fn from_store_value(value: &str) -> Option<Self> {
        match value {
            LAST_RUN_CREATE => Some(LastRunKind::Create),
            LAST_RUN_UPDATE => Some(LastRunKind::Update),
            _ => None,
        }
    }
}

/// The two run-wide facts probed from the database at run start.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFacts {
    /// The schema has zero tables.
    pub empty_db: bool,
    /// No migration-bookkeeping tables exist.
    pub never_ran: bool,
}

/// Operator-configured leniency toward pre-release versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leniency {
    pub accept_snapshot: bool,
    pub accept_unstable: bool,
}

/// Bookkeeping staged for one plugin; last write wins per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedStatus {
    pub version: Option<String>,
    pub last_run: Option<LastRunKind>,
}

#[derive(Debug, Clone)]
struct PluginFacts {
    installed: Option<PluginVersion>,
    last_run: Option<LastRunKind>,
}

/// Run-scoped state of one migration pass.
///
/// Built once from the two schema probes, mutated only through staging, and
/// consumed by [`commit`](Self::commit) — the single code path that writes
/// the durable store, taken only after every selected script executed without
/// error. Dropping the state discards the staging area.
#[derive(Debug)]
pub struct MigrationState<'s, S: VersionStore> {
    facts: RunFacts,
    leniency: Leniency,
    namespace: String,
    catalog: PluginCatalog,
    store: &'s mut S,
    cached: HashMap<String, PluginFacts>,
    staged: BTreeMap<String, StagedStatus>,
}

impl<'s, S: VersionStore> MigrationState<'s, S> {
    pub fn new(
        facts: RunFacts,
        leniency: Leniency,
        namespace: impl Into<String>,
        catalog: PluginCatalog,
        store: &'s mut S,
    ) -> Self {
        Self {
            facts,
            leniency,
            namespace: namespace.into(),
            catalog,
            store,
            cached: HashMap::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn empty_db(&self) -> bool {
        self.facts.empty_db
    }

    pub fn never_ran(&self) -> bool {
        self.facts.never_ran
    }

    pub fn accept_snapshot(&self) -> bool {
        self.leniency.accept_snapshot
    }

    pub fn accept_unstable(&self) -> bool {
        self.leniency.accept_unstable
    }

    /// The version declared in the plugin's metadata, if any.
    pub fn declared_version(&self, plugin: &str) -> Option<&str> {
        self.catalog.declared_version(plugin)
    }

    pub fn version_key(&self, plugin: &str) -> String {
        format!("{}.plugins.status.{}.version", self.namespace, plugin)
    }

    pub fn last_run_key(&self, plugin: &str) -> String {
        format!(
            "{}.plugins.status.{}.lastRunScriptType",
            self.namespace, plugin
        )
    }

    /// Installed version recorded for a plugin, read lazily and cached for
    /// the run. Staged writes are not visible here.
    pub fn installed_version(&mut self, plugin: &str) -> Result<Option<PluginVersion>, GateError> {
        Ok(self.plugin_facts(plugin)?.installed)
    }

    /// Kind of the script last applied for a plugin, read lazily and cached.
    pub fn last_run_kind(&mut self, plugin: &str) -> Result<Option<LastRunKind>, GateError> {
        Ok(self.plugin_facts(plugin)?.last_run)
    }

    fn plugin_facts(&mut self, plugin: &str) -> Result<PluginFacts, GateError> {
        if let Some(facts) = self.cached.get(plugin) {
            return Ok(facts.clone());
        }

        let version_key = self.version_key(plugin);
        let mut version_text = self.store.get(&version_key).map_err(|source| {
            GateError::Store {
                key: version_key.clone(),
                source,
            }
        })?;
        if version_text.is_none() && plugin == CORE_PLUGIN {
            version_text = Some(CORE_SENTINEL_VERSION.to_string());
        }
        let installed = version_text
            .map(|text| {
                PluginVersion::parse(&text).map_err(|source| GateError::StoredVersion {
                    plugin: plugin.to_string(),
                    source,
                })
            })
            .transpose()?;

        let last_run_key = self.last_run_key(plugin);
        let last_run = self
            .store
            .get(&last_run_key)
            .map_err(|source| GateError::Store {
                key: last_run_key,
                source,
            })?
            .as_deref()
            .and_then(LastRunKind::from_store_value);

        let facts = PluginFacts {
            installed,
            last_run,
        };
        self.cached.insert(plugin.to_string(), facts.clone());
        Ok(facts)
    }

    /// Stage the plugin's version for the durable store; overwrites any
    /// earlier staged version for the same plugin.
    pub fn stage_version(&mut self, plugin: &str, version: &str) {
        self.staged
            .entry(plugin.to_string())
            .or_default()
            .version = Some(version.to_string());
    }

    /// Stage the kind of script applied for the plugin; overwrites any
    /// earlier staged kind for the same plugin.
    pub fn stage_last_run(&mut self, plugin: &str, kind: LastRunKind) {
        self.staged
            .entry(plugin.to_string())
            .or_default()
            .last_run = Some(kind);
    }

    /// Staged bookkeeping, keyed by plugin name.
    pub fn staged(&self) -> &BTreeMap<String, StagedStatus> {
        &self.staged
    }

    /// Flush every staged entry to the durable store. Consumes the state, so
    /// a run can commit at most once; on failure the remaining staged entries
    /// go down with the state.
    pub fn commit(self) -> Result<usize, GateError> {
        let mut written = 0;
        for (plugin, status) in &self.staged {
            if let Some(version) = &status.version {
                let key = format!("{}.plugins.status.{}.version", self.namespace, plugin);
                self.store
                    .set(&key, version)
                    .map_err(|source| GateError::Commit { key, source })?;
                written += 1;
            }
            if let Some(kind) = status.last_run {
                let key = format!(
                    "{}.plugins.status.{}.lastRunScriptType",
                    self.namespace, plugin
                );
                self.store
                    .set(&key, kind.as_store_value())
                    .map_err(|source| GateError::Commit { key, source })?;
                written += 1;
            }
        }
        Ok(written)
    }
}
