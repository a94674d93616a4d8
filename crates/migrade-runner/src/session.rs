use thiserror::Error;

#[derive(Debug, Error)]
#[error("session error: {0}")]
pub struct SessionError(pub String);

/// One script ready for the engine: its relative path and its SQL text after
/// dialect filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    pub path: String,
    pub sql: String,
}

/// The single connection-scoped handle used for the whole run.
///
/// Everything is synchronous and blocking: the run happens once per process
/// lifetime, off the request path. `apply` takes the ordered batch of
/// included scripts and applies them transactionally; it either fully
/// succeeds or reports failure. `close` releases the underlying connection —
/// some pools raise a spurious error here after a fully successful apply,
/// which the coordinator suppresses.
pub trait SqlSession {
    fn scalar_count(&mut self, sql: &str) -> Result<i64, SessionError>;
    fn apply(&mut self, scripts: &[PreparedScript]) -> Result<(), SessionError>;
    fn close(self) -> Result<(), SessionError>
    where
        Self: Sized;
}
