pub mod catalog;
pub mod script;
pub mod version;

pub use catalog::{PluginCatalog, PluginDescriptor};
pub use script::{ScriptInfo, ScriptKind, CORE_PLUGIN};
pub use version::{PluginVersion, Qualifier, VersionError};
