use migrade_core::VersionError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("datastore read failed for key {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("stored version for plugin {plugin} is unreadable: {source}")]
    StoredVersion {
        plugin: String,
        #[source]
        source: VersionError,
    },
    #[error("commit failed writing key {key}: {source}")]
    Commit {
        key: String,
        #[source]
        source: StoreError,
    },
}
