//! Bootstrap options
//!
//! The only recognized option is `additionalServices`, appended to the base
//! service list when a fresh document is generated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapOptions {
    #[serde(default)]
    pub additional_services: Vec<String>,
}

impl BootstrapOptions {
    pub fn with_services<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            additional_services: services.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode options from a request payload
    ///
    /// Never fails: a missing or malformed payload yields empty options.
    pub fn from_value(payload: &Value) -> Self {
        let raw = match payload.get("additionalServices") {
            None | Some(Value::Null) => return Self::default(),
            Some(raw) => raw,
        };

        let services: Option<Vec<String>> = raw.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect()
        });

        match services {
            Some(additional_services) => Self { additional_services },
            None => {
                tracing::warn!(
                    op = "bootstrap.options.ignored",
                    "additionalServices is not a list of strings, treating as empty"
                );
                Self::default()
            }
        }
    }
}
