// Re-export the commonly used items so embedders depend on one crate.
pub use migrade_config::MigradeConfig;
pub use migrade_core::{PluginCatalog, PluginVersion, ScriptInfo, ScriptKind};
pub use migrade_gate::{
    decide, GateError, LastRunKind, Leniency, MemoryStore, MigrationState, RunFacts, VersionStore,
};
pub use migrade_loader::{
    discover_scripts, load_catalog, load_config_or_default, load_filter, SqlLineFilter,
};
pub use migrade_runner::{
    PreparedScript, RunCoordinator, RunReport, RunnerError, SessionError, SqlSession,
};
