//! Configuration bootstrap
//!
//! Guarantees that the configuration root, the configuration document, and
//! the data directory exist, then hands back the parsed document.
//!
//! Lifecycle of a root:
//! - `Uninitialized`: no document on disk
//! - `Initialized`: this call generated and wrote the document
//! - `Loaded`: the document already existed and was read back as-is
//!
//! A document on disk is never regenerated or rewritten. Options only shape
//! the document generated on the first run; on later runs they are ignored.
//!
//! Single writer per root is assumed. The document write is exclusive, so a
//! racing first run loses cleanly and loads the winner's document instead of
//! overwriting it.

use crate::document::ConfigDocument;
use crate::error::BootstrapError;
use crate::options::BootstrapOptions;
use crate::paths::NodePaths;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapState {
    Uninitialized,
    Initialized,
    Loaded,
}

/// Result of a successful resolve
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub path: PathBuf,
    /// Typed view of the document
    pub config: ConfigDocument,
    /// The document exactly as persisted
    pub raw: Value,
    pub state: BootstrapState,
}

/// On-disk state of a root, observed without touching it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapStatus {
    pub root: PathBuf,
    pub state: BootstrapState,
    pub root_exists: bool,
    pub config_exists: bool,
    pub data_dir_exists: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigBootstrap {
    paths: NodePaths,
}

// =============================================================================
// Bootstrap
// =============================================================================

impl ConfigBootstrap {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: NodePaths::new(root),
        }
    }

    /// Bootstrap the root derived from the environment (`AIDPCORE_HOME` or `~/.aidpcore`)
    pub fn from_env() -> Result<Self, BootstrapError> {
        Ok(Self {
            paths: NodePaths::from_env()?,
        })
    }

    pub fn paths(&self) -> &NodePaths {
        &self.paths
    }

    /// Ensure root, document and data directory exist, then load the document
    pub fn resolve(
        &self,
        options: Option<&BootstrapOptions>,
    ) -> Result<ResolvedConfig, BootstrapError> {
        let default_options = BootstrapOptions::default();
        let options = options.unwrap_or(&default_options);

        let root = self.paths.root();
        ensure_dir(root)?;

        let config_path = self.paths.config_file();
        let mut state = BootstrapState::Loaded;

        if config_path.exists() {
            if !options.additional_services.is_empty() {
                tracing::debug!(
                    op = "bootstrap.options.unused",
                    path = %config_path.display(),
                    additional = options.additional_services.len(),
                    "Document already exists, additional services not applied"
                );
            }
        } else {
            state = self.generate_document(&config_path, options)?;
        }

        ensure_dir(&self.paths.data_dir())?;

        let (raw, config) = read_document(&config_path)?;

        tracing::info!(
            op = "bootstrap.resolved",
            root = %root.display(),
            network = %config.network,
            state = ?state,
            "Configuration resolved"
        );

        Ok(ResolvedConfig {
            path: root.to_path_buf(),
            config,
            raw,
            state,
        })
    }

    /// Write the default document. `Loaded` if another writer got there first.
    fn generate_document(
        &self,
        config_path: &Path,
        options: &BootstrapOptions,
    ) -> Result<BootstrapState, BootstrapError> {
        let document = ConfigDocument::default_for(&self.paths, options)?;

        if !write_document(config_path, &document)? {
            return Ok(BootstrapState::Loaded);
        }

        tracing::info!(
            op = "bootstrap.config.created",
            path = %config_path.display(),
            services = document.services.len(),
            "Default configuration written"
        );

        Ok(BootstrapState::Initialized)
    }

    /// Report what exists under the root without creating anything
    pub fn status(&self) -> BootstrapStatus {
        let config_exists = self.paths.config_file().is_file();
        let state = if config_exists {
            BootstrapState::Loaded
        } else {
            BootstrapState::Uninitialized
        };

        BootstrapStatus {
            root: self.paths.root().to_path_buf(),
            state,
            root_exists: self.paths.root().is_dir(),
            config_exists,
            data_dir_exists: self.paths.data_dir().is_dir(),
        }
    }
}

// =============================================================================
// Filesystem helpers
// =============================================================================

/// Create `path` and missing ancestors. Returns true if it was created.
fn ensure_dir(path: &Path) -> Result<bool, BootstrapError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(false);
        }
        return Err(BootstrapError::filesystem(
            path,
            "create directory",
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        ));
    }

    fs::create_dir_all(path)
        .map_err(|e| BootstrapError::filesystem(path, "create directory", e))?;

    tracing::info!(
        op = "bootstrap.dir.created",
        path = %path.display(),
        "Directory created"
    );

    Ok(true)
}

/// Write `document` to `path` unless something is already there
///
/// The document is staged in a temp file beside the target and published with
/// a hard link, which fails instead of replacing an existing file. Returns
/// false if another writer published first.
fn write_document(path: &Path, document: &ConfigDocument) -> Result<bool, BootstrapError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| BootstrapError::filesystem(path, "serialize document", e.into()))?;

    let temp_path = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));

    let published = create_exclusive(&temp_path, json.as_bytes())
        .and_then(|()| publish_exclusive(&temp_path, path, json.as_bytes()));

    // The temp file is only a staging copy, whatever happened above
    if let Err(e) = fs::remove_file(&temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(
                op = "bootstrap.config.staging_left",
                path = %temp_path.display(),
                error = %e,
                "Failed to remove staging file"
            );
        }
    }

    match published {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::warn!(
                op = "bootstrap.config.conflict",
                path = %path.display(),
                "Document appeared during bootstrap, keeping the existing one"
            );
            Ok(false)
        }
        Err(e) => Err(BootstrapError::filesystem(path, "write document", e)),
    }
}

/// Create `path` with `contents`, failing if it already exists
fn create_exclusive(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;

    // Holds a database password
    #[cfg(unix)]
    {
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Filesystems without hard links report either of these (EPERM on FAT)
fn links_unavailable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

fn publish_exclusive(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    match fs::hard_link(temp_path, path) {
        // Exclusive create, not atomic
        Err(e) if links_unavailable(&e) => create_exclusive(path, contents),
        other => other,
    }
}

/// Load the document: raw as persisted, plus its typed view
///
/// Only content that is not a JSON object is rejected.
fn read_document(path: &Path) -> Result<(Value, ConfigDocument), BootstrapError> {
    let content = fs::read_to_string(path)
        .map_err(|e| BootstrapError::filesystem(path, "read document", e))?;

    let parse_err = |source: serde_json::Error| BootstrapError::ConfigParse {
        path: path.to_path_buf(),
        source,
    };

    let raw: Value = serde_json::from_str(&content).map_err(parse_err)?;
    if !raw.is_object() {
        return Err(parse_err(<serde_json::Error as serde::de::Error>::custom(
            "document must be a JSON object",
        )));
    }

    let config = ConfigDocument::deserialize(&raw).map_err(parse_err)?;

    Ok((raw, config))
}
