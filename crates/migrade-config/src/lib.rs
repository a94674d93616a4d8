pub mod config;

pub use config::{default_bookkeeping_probe, default_empty_db_probe, MigradeConfig};
