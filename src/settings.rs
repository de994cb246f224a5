//! Application settings

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::routers::apns::settings::ApnsSettings;

pub const ENV_PREFIX: &str = "pushbridge";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub max_data_bytes: usize,
    pub human_logs: bool,

    pub statsd_host: Option<String>,
    pub statsd_port: u16,
    pub statsd_label: String,

    pub apns: ApnsSettings,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_data_bytes: 8192,
            human_logs: false,
            statsd_host: None,
            statsd_port: 8125,
            statsd_label: "pushbridge".to_string(),
            apns: ApnsSettings::default(),
        }
    }
}

impl Settings {
    /// Load the settings from the config file if supplied, then the environment.
    pub fn with_env_and_config_file(filename: &Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::builder();

        // Merge the config file if supplied
        if let Some(config_filename) = filename {
            config = config.add_source(File::with_name(config_filename));
        }

        // Merge the environment overrides. The `__` separator routes
        // variables like PUSHBRIDGE_APNS__KEY_ID into sub structures.
        config = config.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        config
            .build()?
            .try_deserialize::<Self>()
            .map_err(|error| match error {
                // Configuration errors are not very sysop friendly, Try to
                // make them a bit more 3AM useful.
                ConfigError::Message(error_msg) => {
                    println!("Bad configuration: {:?}", &error_msg);
                    println!("Please set in config file or use environment variable.");
                    println!(
                        "For example to set `human_logs` use env var `{}_HUMAN_LOGS`\n",
                        ENV_PREFIX.to_uppercase()
                    );
                    error!("Configuration error: Value undefined {:?}", &error_msg);
                    ConfigError::NotFound(error_msg)
                }
                _ => {
                    error!("Configuration error: Other: {:?}", &error);
                    error
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8000);
        assert!(!settings.human_logs);
        assert_eq!(settings.statsd_port, 8125);
        assert_eq!(settings.apns.topic, "org.pushbridge.mobile");
        assert!(!settings.apns.sandbox);
    }
}
