pub mod catalog;
pub mod config;
pub mod filter;
pub mod scripts;

pub use catalog::load_catalog;
pub use config::{load_config, load_config_from_path, load_config_or_default};
pub use filter::{load_filter, FilterRules, RewriteRule, SqlLineFilter};
pub use scripts::{discover_scripts, ScriptFile};
