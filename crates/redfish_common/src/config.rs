//! Client configuration
//!
//! Config file: ~/.config/redfish/config.toml or /etc/redfish/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_endpoint() -> String {
    "https://localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

/// Connection settings for the BMC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL that relative resource URIs are joined onto
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept self-signed BMC certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

/// Collection walk settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Member fetches in flight at once (1 = sequential walk)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedfishConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub walk: WalkConfig,
}

impl RedfishConfig {
    /// Get default user config path: ~/.config/redfish/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(Path::new(&xdg).join("redfish").join("config.toml"));
            }
        }

        let home = std::env::var("HOME").context("Cannot determine home directory")?;
        Ok(Path::new(&home)
            .join(".config")
            .join("redfish")
            .join("config.toml"))
    }

    /// Get system config path: /etc/redfish/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/redfish/config.toml")
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. User config
    /// 3. System config
    /// 4. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: RedfishConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = self.client.endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            anyhow::bail!(
                "Invalid endpoint: '{}'. Must start with http:// or https://",
                endpoint
            );
        }
        if self.client.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.walk.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedfishConfig::default();
        assert_eq!(config.client.endpoint, "https://localhost");
        assert_eq!(config.client.timeout_secs, 30);
        assert!(!config.client.accept_invalid_certs);
        assert_eq!(config.walk.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RedfishConfig = toml::from_str(
            r#"
            [client]
            endpoint = "https://10.0.0.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.client.endpoint, "https://10.0.0.5");
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.walk, WalkConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RedfishConfig::default();
        config.client.endpoint = "ftp://bmc".to_string();
        assert!(config.validate().is_err());

        let mut config = RedfishConfig::default();
        config.client.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = RedfishConfig::default();
        config.walk.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let original = RedfishConfig {
            client: ClientConfig {
                endpoint: "https://bmc.example".to_string(),
                timeout_secs: 5,
                accept_invalid_certs: true,
            },
            walk: WalkConfig { concurrency: 4 },
        };

        original.save_to(&path).unwrap();
        let loaded = RedfishConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(RedfishConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[walk]\nconcurrency = 0\n").unwrap();

        let err = RedfishConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("concurrency"));
    }
}
