//! Node path layout
//!
//! Every path the bootstrapper touches or writes into the configuration
//! document is derived here from a single root, so the document and the
//! directories created on disk cannot drift apart.
//!
//! Layout:
//! ```text
//! {ROOT}/
//!   aidpcore-node.json    # Configuration document
//!   data/                 # Node daemon data directory
//!   pushtx.log            # Referenced by the node-daemon fragment
//!   bin/aidpd             # Referenced by the node-daemon fragment
//! ```

use crate::config;
use crate::error::BootstrapError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePaths {
    root: PathBuf,
}

impl NodePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root from the process environment
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolve the root with precedence: override env var > `$HOME/<home_folder>`
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BootstrapError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(root) = non_empty(config::HOME_OVERRIDE_ENV) {
            return Ok(Self::new(root));
        }

        match non_empty("HOME") {
            Some(home) => Ok(Self::new(PathBuf::from(home).join(config::home_folder()))),
            None => Err(BootstrapError::HomeUnavailable {
                override_env: config::HOME_OVERRIDE_ENV,
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(config::config_file_name())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(config::DATA_DIR_NAME)
    }

    pub fn send_tx_log(&self) -> PathBuf {
        self.root.join(config::SEND_TX_LOG_NAME)
    }

    pub fn daemon_exec(&self) -> PathBuf {
        self.root.join(config::DAEMON_EXEC_RELATIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_home_derived_root() {
        let paths = NodePaths::from_lookup(lookup_from(&[("HOME", "/home/node")])).unwrap();
        assert_eq!(paths.root(), Path::new("/home/node").join(config::home_folder()));
    }

    #[test]
    fn test_override_wins_over_home() {
        let paths = NodePaths::from_lookup(lookup_from(&[
            ("HOME", "/home/node"),
            ("AIDPCORE_HOME", "/srv/aidpcore"),
        ]))
        .unwrap();
        assert_eq!(paths.root(), Path::new("/srv/aidpcore"));
    }

    #[test]
    fn test_empty_override_falls_back_to_home() {
        let paths = NodePaths::from_lookup(lookup_from(&[
            ("HOME", "/home/node"),
            ("AIDPCORE_HOME", ""),
        ]))
        .unwrap();
        assert_eq!(paths.root(), Path::new("/home/node").join(config::home_folder()));
    }

    #[test]
    fn test_no_home_is_an_error() {
        let err = NodePaths::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err.code(), "HOME_UNAVAILABLE");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let lookup = lookup_from(&[("HOME", "/home/node")]);
        let first = NodePaths::from_lookup(&lookup).unwrap();
        let second = NodePaths::from_lookup(&lookup).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_layout_is_beneath_root() {
        let paths = NodePaths::new("/srv/aidpcore");
        assert_eq!(
            paths.config_file(),
            Path::new("/srv/aidpcore").join(config::config_file_name())
        );
        assert_eq!(paths.data_dir(), Path::new("/srv/aidpcore/data"));
        assert_eq!(paths.send_tx_log(), Path::new("/srv/aidpcore/pushtx.log"));
        assert_eq!(paths.daemon_exec(), Path::new("/srv/aidpcore/bin/aidpd"));
    }
}
