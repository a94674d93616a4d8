pub mod error;
pub mod run;
pub mod session;

pub use error::RunnerError;
pub use run::{plan_decisions, DecisionOutcome, RunCoordinator, RunReport, ScriptDecision};
pub use session::{PreparedScript, SessionError, SqlSession};
