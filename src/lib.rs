//! Aidpcore node configuration bootstrap
//!
//! Materializes `~/.aidpcore` (or `$AIDPCORE_HOME`) on first use: the root
//! directory, a default `aidpcore-node.json` and the `data/` directory. Later
//! calls load the persisted document untouched.
//!
//! ```no_run
//! use aidpcore_node::{BootstrapOptions, ConfigBootstrap};
//!
//! let bootstrap = ConfigBootstrap::from_env()?;
//! let resolved = bootstrap.resolve(Some(&BootstrapOptions::with_services(["insight-api"])))?;
//! let daemon = resolved.config.service_config("node-daemon");
//! # let _ = daemon;
//! # Ok::<(), aidpcore_node::BootstrapError>(())
//! ```

pub mod bootstrap;
pub mod config;
pub mod document;
pub mod error;
pub mod options;
pub mod paths;

pub use bootstrap::{BootstrapState, BootstrapStatus, ConfigBootstrap, ResolvedConfig};
pub use document::{ConfigDocument, Network};
pub use error::BootstrapError;
pub use options::BootstrapOptions;
pub use paths::NodePaths;
