use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for logging and the message broker.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log: LogSettings,
    pub broker: BrokerSettings,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Configuration settings for the broker.
///
/// `shutdown_grace_ms` bounds how long shutdown waits for in-flight publishes.
/// `topics` lists the topics the demo binary taps with a log subscriber.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub shutdown_grace_ms: u64,
    pub topics: Vec<String>,
}

impl BrokerSettings {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub log: Option<PartialLogSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Partial broker settings.
///
/// Used for broker configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub shutdown_grace_ms: Option<u64>,
    pub topics: Option<Vec<String>>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: 5000,
            topics: vec!["events".to_string()],
        }
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogSettings {
                level: "info".to_string(),
            },
            broker: BrokerSettings::default(),
        }
    }
}
