//! Build-time overridable configuration
//!
//! Folder and file names may be baked in at build time through environment
//! variables; otherwise the stock aidpcore layout is used.

macro_rules! baked_config {
    ($name:ident, $env:literal, $default:literal) => {
        pub fn $name() -> &'static str {
            match option_env!($env) {
                Some(value) if !value.is_empty() => value,
                _ => $default,
            }
        }
    };
}

// Root folder created under the user's home (e.g., ".aidpcore")
baked_config!(home_folder, "AIDPCORE_HOME_FOLDER", ".aidpcore");

// Configuration document filename (e.g., "aidpcore-node.json")
baked_config!(config_file_name, "AIDPCORE_CONFIG_FILE", "aidpcore-node.json");

/// Runtime override for the configuration root
pub const HOME_OVERRIDE_ENV: &str = "AIDPCORE_HOME";

/// Data directory beneath the root
pub const DATA_DIR_NAME: &str = "data";

/// Transaction push log beneath the root
pub const SEND_TX_LOG_NAME: &str = "pushtx.log";

/// Node daemon executable, relative to the root
pub const DAEMON_EXEC_RELATIVE: &str = "bin/aidpd";

pub const DEFAULT_PORT: u16 = 3001;

/// Services every fresh document starts with, in order
pub const BASE_SERVICES: [&str; 2] = ["node-daemon", "web"];

pub const NODE_DAEMON_SERVICE: &str = "node-daemon";
pub const WEB_SERVICE: &str = "web";
pub const INSIGHT_UI_SERVICE: &str = "insight-ui";
pub const INSIGHT_API_SERVICE: &str = "insight-api";

// Node daemon spawn defaults
pub const DAEMON_RPC_QUEUE: u32 = 1000;
pub const DAEMON_RPC_PORT: u16 = 8766;
pub const DAEMON_ZMQ_ENDPOINT: &str = "tcp://127.0.0.1:28332";

// Insight API defaults
pub const COIN_TICKER_URL: &str = "https://api.coinmarketcap.com/v1/ticker/aidpcoin/?convert=USD";
pub const COIN_SHORT: &str = "AIDP";
