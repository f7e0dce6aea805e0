//! Configuration document
//!
//! The document persisted at `{ROOT}/aidpcore-node.json`. Field names are part
//! of the on-disk format and are consumed by the node process and the web
//! services, so they must stay stable.
//!
//! `servicesConfig` is opaque to the bootstrapper: each fragment belongs to the
//! service it is named after. Unknown top-level keys are carried through as-is.
//!
//! Reading is lenient. Any JSON object is a loadable document: a field that is
//! missing, `null` or of an unexpected type reads as its default in the typed
//! view, while the persisted text stays untouched.

use crate::config;
use crate::error::BootstrapError;
use crate::options::BootstrapOptions;
use crate::paths::NodePaths;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::io;
use std::path::Path;

// =============================================================================
// Types
// =============================================================================

/// Network the node daemon joins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Livenet,
    Testnet,
    Regtest,
    /// Any other name written by hand
    Other(String),
}

impl Network {
    pub fn from_name(name: &str) -> Self {
        match name {
            "livenet" => Network::Livenet,
            "testnet" => Network::Testnet,
            "regtest" => Network::Regtest,
            other => Network::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Livenet => "livenet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Network::from_name).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default)]
    pub network: Network,
    #[serde(default = "default_port", deserialize_with = "lenient_port")]
    pub port: u64,
    /// Active services, in start order. Not deduplicated.
    #[serde(default, deserialize_with = "lenient_services")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub message_log: String,
    /// Per-service fragments, keyed by service name
    #[serde(default, deserialize_with = "or_default")]
    pub services_config: Map<String, Value>,
    /// Top-level keys this crate does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Lenient field readers
// =============================================================================

fn default_port() -> u64 {
    u64::from(config::DEFAULT_PORT)
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Numbers and numeric strings are both accepted
fn lenient_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let port = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(port.unwrap_or_else(default_port))
}

/// Non-string entries are skipped
fn lenient_services<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

// =============================================================================
// Defaults
// =============================================================================

impl ConfigDocument {
    /// Build the document written on first bootstrap of `paths`
    ///
    /// Services are the base list followed by `options.additional_services`,
    /// concatenated as given. Fails for roots that are not valid UTF-8, since
    /// the paths written into the document must name the directories on disk.
    pub fn default_for(
        paths: &NodePaths,
        options: &BootstrapOptions,
    ) -> Result<Self, BootstrapError> {
        let services = config::BASE_SERVICES
            .iter()
            .map(|s| s.to_string())
            .chain(options.additional_services.iter().cloned())
            .collect();

        Ok(Self {
            network: Network::default(),
            port: default_port(),
            services,
            message_log: String::new(),
            services_config: default_services_config(paths)?,
            extra: Map::new(),
        })
    }

    /// Fragment for `service`, if the document carries one
    pub fn service_config(&self, service: &str) -> Option<&Value> {
        self.services_config.get(service)
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }
}

fn utf8_path(path: &Path) -> Result<String, BootstrapError> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        BootstrapError::filesystem(
            path,
            "build default document",
            io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        )
    })
}

fn default_services_config(paths: &NodePaths) -> Result<Map<String, Value>, BootstrapError> {
    let send_tx_log = utf8_path(&paths.send_tx_log())?;
    let data_dir = utf8_path(&paths.data_dir())?;
    let daemon_exec = utf8_path(&paths.daemon_exec())?;

    let mut fragments = Map::new();

    fragments.insert(
        config::WEB_SERVICE.to_string(),
        json!({
            "disablePolling": true,
            "enableSocketRPC": false,
        }),
    );

    fragments.insert(
        config::INSIGHT_UI_SERVICE.to_string(),
        json!({
            "routePrefix": "",
            "apiPrefix": "api",
        }),
    );

    fragments.insert(
        config::INSIGHT_API_SERVICE.to_string(),
        json!({
            "routePrefix": "api",
            "coinTicker": config::COIN_TICKER_URL,
            "coinShort": config::COIN_SHORT,
            "db": {
                "host": "127.0.0.1",
                "port": "27017",
                "database": "aidp-api-livenet",
                "user": "aidpcore",
                "password": "password123",
            },
        }),
    );

    fragments.insert(
        config::NODE_DAEMON_SERVICE.to_string(),
        json!({
            "sendTxLog": send_tx_log,
            "spawn": {
                "datadir": data_dir,
                "exec": daemon_exec,
                "rpcqueue": config::DAEMON_RPC_QUEUE,
                "rpcport": config::DAEMON_RPC_PORT,
                "zmqpubrawtx": config::DAEMON_ZMQ_ENDPOINT,
                "zmqpubhashblock": config::DAEMON_ZMQ_ENDPOINT,
            },
        }),
    );

    Ok(fragments)
}
