//! Bootstrap error taxonomy
//!
//! Every failure is fatal to the bootstrap and is handed back to the caller
//! unrecovered. Nothing here is retried or repaired.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A directory or file could not be created, written, or read
    #[error("{action} failed at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: io::Error,
    },

    /// The persisted configuration document is not a valid document
    #[error("configuration document at {path:?} is malformed: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No home directory to derive the default root from
    #[error("cannot resolve configuration root: neither {override_env} nor HOME is set")]
    HomeUnavailable { override_env: &'static str },
}

impl BootstrapError {
    pub(crate) fn filesystem(path: &Path, action: &'static str, source: io::Error) -> Self {
        BootstrapError::Filesystem {
            path: path.to_path_buf(),
            action,
            source,
        }
    }

    /// Stable error code used in responses
    pub fn code(&self) -> &'static str {
        match self {
            BootstrapError::Filesystem { .. } => "FILESYSTEM_ERROR",
            BootstrapError::ConfigParse { .. } => "CONFIG_PARSE_ERROR",
            BootstrapError::HomeUnavailable { .. } => "HOME_UNAVAILABLE",
        }
    }
}
