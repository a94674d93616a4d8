pub mod decide;
pub mod error;
pub mod state;
pub mod store;

pub use decide::decide;
pub use error::GateError;
pub use state::{LastRunKind, Leniency, MigrationState, RunFacts, StagedStatus};
pub use store::{MemoryStore, StoreError, VersionStore};
