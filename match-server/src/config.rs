//! Loads the server settings from `ServerConfig.json`.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::fs;

/// The file we look for in the working directory.
pub const CONFIG_FILE: &str = "ServerConfig.json";
/// Environment variable that overrides the location of the config file.
pub const CONFIG_PATH_VARIABLE: &str = "MATCH_SERVER_CONFIG";

/// The settings of the server. Missing entries fall back to the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// The address the HTTP and web socket endpoints listen on.
    pub bind_address: String,
    /// Capacity of the outbound message queue of every connection.
    pub channel_buffer_size: usize,
    /// How often the watchdog looks for abandoned matches.
    pub cleanup_interval_secs: u64,
    /// How long a match may exist without any connection before the watchdog removes it.
    pub idle_match_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1:8080".into(),
            channel_buffer_size: protocol::CHANNEL_BUFFER_SIZE,
            cleanup_interval_secs: 1200, // 20 Min
            idle_match_secs: 1200,
        }
    }
}

impl ServerConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn idle_limit(&self) -> Duration {
        Duration::from_secs(self.idle_match_secs)
    }
}

/// Parses the content of a config file.
pub fn parse_config(json_content: &str) -> Result<ServerConfig, String> {
    let config: ServerConfig = serde_json::from_str(json_content)
        .map_err(|e| format!("Failed to parse JSON: {}", e))?;
    if config.channel_buffer_size == 0 {
        return Err("channel_buffer_size has to be positive".into());
    }
    if config.cleanup_interval_secs == 0 {
        return Err("cleanup_interval_secs has to be positive".into());
    }
    Ok(config)
}

/// The config file location, [`CONFIG_PATH_VARIABLE`] if set, otherwise [`CONFIG_FILE`].
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_VARIABLE).unwrap_or_else(|_| CONFIG_FILE.to_string())
}

/// Reads the config file from [`config_path`].
pub async fn load_config() -> Result<ServerConfig, String> {
    load_config_from(&config_path()).await
}

/// Reads a config file. A missing file yields the defaults, an unreadable or malformed file
/// is an error.
pub async fn load_config_from(path: &str) -> Result<ServerConfig, String> {
    match fs::read_to_string(path).await {
        Ok(json_content) => parse_config(&json_content),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::info!(path, "No config file found, using defaults.");
            Ok(ServerConfig::default())
        }
        Err(error) => Err(format!("Failed to read file {}: {}", path, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(r#"{"bind_address": "0.0.0.0:9000"}"#).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.channel_buffer_size, protocol::CHANNEL_BUFFER_SIZE);
        assert_eq!(config.idle_limit(), Duration::from_secs(1200));
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(parse_config("{bind_address").is_err());
        assert!(parse_config(r#"{"channel_buffer_size": 0}"#).is_err());
        assert!(parse_config(r#"{"cleanup_interval_secs": 0}"#).is_err());
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("{}-{}", uuid::Uuid::new_v4(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let config = load_config_from(&temp_path("absent.json")).await.unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[tokio::test]
    async fn environment_variable_overrides_the_path() {
        let path = temp_path(CONFIG_FILE);
        fs::write(&path, r#"{"bind_address": "0.0.0.0:9100", "idle_match_secs": 60}"#)
            .await
            .unwrap();
        // Only this test touches the variable.
        unsafe { std::env::set_var(CONFIG_PATH_VARIABLE, &path) };
        assert_eq!(config_path(), path);
        let loaded = load_config().await;
        unsafe { std::env::remove_var(CONFIG_PATH_VARIABLE) };
        let _ = fs::remove_file(&path).await;

        let config = loaded.unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9100");
        assert_eq!(config.idle_limit(), Duration::from_secs(60));
        assert_eq!(config.channel_buffer_size, protocol::CHANNEL_BUFFER_SIZE);
        assert_eq!(config_path(), CONFIG_FILE);
    }
}
