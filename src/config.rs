//! # Configuration Management
//!
//! Loads the service configuration from, in priority order:
//! 1. `HOST` / `PORT` environment variables (for deployment platforms)
//! 2. Environment variables with the `APP_` prefix, e.g. `APP_LIMITS__MAX_UPLOAD_BYTES`
//! 3. An optional `config.toml` in the working directory
//! 4. The defaults in [`AppConfig::default`]
//!
//! Every section can also be changed at runtime through `PUT /api/v1/config`,
//! which goes through [`AppConfig::update_from_json`] and is validated the same
//! way as a config file.

use crate::audio::{parse_timecode, SilencePosition};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Top-level configuration, one field per section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub defaults: EditDefaults,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Actix worker threads; 0 means one per CPU core.
    pub workers: usize,
}

/// On-disk copies of uploads and results.
///
/// ## Fields:
/// - `upload_dir`: where raw uploads are written when `persist` is on
/// - `processed_dir`: where results are written, as `<prefix>_<name>`
/// - `persist`: turn both off to keep everything in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub persist: bool,
}

/// Resource limits for a single request and for the whole service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted upload, per file, in bytes.
    pub max_upload_bytes: usize,
    /// Longest block of silence a request may insert.
    pub max_silence_seconds: u64,
    /// Edits allowed to run at once before new requests get 503.
    pub max_concurrent_jobs: usize,
}

/// Form values used when a request leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditDefaults {
    pub start_time: String,
    pub end_time: String,
    pub silence_duration: String,
    pub silence_position: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: 0,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                processed_dir: PathBuf::from("processed"),
                persist: true,
            },
            limits: LimitsConfig {
                max_upload_bytes: 100 * 1024 * 1024,   // 100MB per file
                max_silence_seconds: 3600,             // One hour
                max_concurrent_jobs: 8,
            },
            defaults: EditDefaults {
                start_time: "0:00".to_string(),
                end_time: "0:05".to_string(),
                silence_duration: "0:05".to_string(),
                silence_position: "start".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `config.toml` and the environment.
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER__PORT=3000`
    /// - `APP_STORAGE__PERSIST=false`
    /// - `APP_LIMITS__MAX_CONCURRENT_JOBS=2`
    /// - `HOST=0.0.0.0`, `PORT=3000`
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Check that the values are usable.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - Every limit is greater than 0
    /// - Default time codes parse and the default position is `start` or `end`
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size must be greater than 0"));
        }

        if self.limits.max_silence_seconds == 0 {
            return Err(anyhow::anyhow!("Max silence duration must be greater than 0"));
        }

        if self.limits.max_concurrent_jobs == 0 {
            return Err(anyhow::anyhow!("Max concurrent jobs must be greater than 0"));
        }

        for (name, value) in [
            ("defaults.start_time", &self.defaults.start_time),
            ("defaults.end_time", &self.defaults.end_time),
            ("defaults.silence_duration", &self.defaults.silence_duration),
        ] {
            parse_timecode(value).map_err(|e| anyhow::anyhow!("{}: {}", name, e))?;
        }

        self.defaults
            .silence_position
            .parse::<SilencePosition>()
            .map_err(|e| anyhow::anyhow!("defaults.silence_position: {}", e))?;

        Ok(())
    }

    /// Apply a partial JSON update, then validate the result.
    ///
    /// Only the keys present in the JSON are changed, so
    /// `{"limits": {"max_concurrent_jobs": 2}}` leaves everything else alone.
    /// On a validation failure `self` is left unchanged.
    pub fn update_from_json(&mut self, json_str: &str) -> Result<()> {
        let partial: serde_json::Value = serde_json::from_str(json_str)?;
        let mut updated = self.clone();

        if let Some(server) = partial.get("server") {
            if let Some(host) = server.get("host").and_then(|v| v.as_str()) {
                updated.server.host = host.to_string();
            }
            if let Some(port) = server.get("port").and_then(|v| v.as_u64()) {
                updated.server.port = u16::try_from(port)
                    .map_err(|_| anyhow::anyhow!("Server port {} is out of range", port))?;
            }
        }

        if let Some(storage) = partial.get("storage") {
            if let Some(persist) = storage.get("persist").and_then(|v| v.as_bool()) {
                updated.storage.persist = persist;
            }
        }

        if let Some(limits) = partial.get("limits") {
            if let Some(bytes) = limits.get("max_upload_bytes").and_then(|v| v.as_u64()) {
                updated.limits.max_upload_bytes = bytes as usize;
            }
            if let Some(seconds) = limits.get("max_silence_seconds").and_then(|v| v.as_u64()) {
                updated.limits.max_silence_seconds = seconds;
            }
            if let Some(jobs) = limits.get("max_concurrent_jobs").and_then(|v| v.as_u64()) {
                updated.limits.max_concurrent_jobs = jobs as usize;
            }
        }

        if let Some(defaults) = partial.get("defaults") {
            let fields = [
                ("start_time", &mut updated.defaults.start_time),
                ("end_time", &mut updated.defaults.end_time),
                ("silence_duration", &mut updated.defaults.silence_duration),
                ("silence_position", &mut updated.defaults.silence_position),
            ];
            for (key, slot) in fields {
                if let Some(value) = defaults.get(key).and_then(|v| v.as_str()) {
                    *slot = value.to_string();
                }
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.defaults.end_time, "0:05");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.defaults.start_time = "five".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.defaults.silence_position = "middle".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_update() {
        let mut config = AppConfig::default();
        let json = r#"{"limits": {"max_concurrent_jobs": 2}, "defaults": {"end_time": "1:00"}}"#;
        assert!(config.update_from_json(json).is_ok());
        assert_eq!(config.limits.max_concurrent_jobs, 2);
        assert_eq!(config.defaults.end_time, "1:00");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_rejected_update_leaves_config_unchanged() {
        let mut config = AppConfig::default();
        let json = r#"{"server": {"port": 9090}, "defaults": {"start_time": "bad"}}"#;
        assert!(config.update_from_json(json).is_err());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.defaults.start_time, "0:00");
    }

    #[test]
    fn test_config_renders_as_toml() {
        let rendered = toml::to_string(&AppConfig::default()).unwrap();
        assert!(rendered.contains("[limits]"));
        assert!(rendered.contains("max_concurrent_jobs = 8"));
    }
}
