mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, LogSettings, Settings};

/// Environment variable prefix, e.g. `POPSUB_BROKER__SHUTDOWN_GRACE_MS=2000`.
const ENV_PREFIX: &str = "POPSUB";

/// Loads the configuration from `config/default` and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the logging and broker configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit file base name (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("broker.topics"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        log: settings::LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
        broker: BrokerSettings {
            shutdown_grace_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.shutdown_grace_ms)
                .unwrap_or(default.broker.shutdown_grace_ms),
            topics: partial
                .broker
                .as_ref()
                .and_then(|b| b.topics.clone())
                .unwrap_or(default.broker.topics),
        },
    })
}
