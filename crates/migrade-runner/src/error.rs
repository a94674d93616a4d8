use migrade_gate::GateError;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("schema probe failed: {0}")]
    Probe(#[source] SessionError),
    #[error("changelog apply failed: {0}")]
    Apply(#[source] SessionError),
    #[error("bookkeeping commit failed: {0}")]
    Commit(#[from] GateError),
    #[error("read script {path}: {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
