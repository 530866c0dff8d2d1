use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Path to the JSON document containing raw envelope records
    #[serde(default = "default_msgs_path")]
    pub msgs_path: String,

    /// Output path for the decoded JSON array; stdout when empty
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_msgs_path() -> String {
    "./msgs.json".to_string()
}

fn default_output_path() -> String {
    String::new()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("ENVIRO"))
            .build()?
            .try_deserialize()
    }
}
