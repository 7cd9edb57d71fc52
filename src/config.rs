use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Main Config Schema
// ============================================================================

/// The farmhand configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Farms: named groups of connections, plus the default-farm selection
    #[serde(default)]
    pub farms: FarmsConfig,

    /// Engine settings, including the connection registry
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Farm groupings and the default-farm selection
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FarmsConfig {
    /// Farm name -> set of connection names in that farm
    #[serde(default)]
    pub list: BTreeMap<String, BTreeSet<String>>,

    /// Name of the default farm; empty means no default
    #[serde(default)]
    pub default: String,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Connection registry: connection name -> destination descriptor.
    /// Read-only here; connections are created elsewhere.
    #[serde(default)]
    pub service_destinations: BTreeMap<String, Destination>,
}

/// A service destination (connection descriptor)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Destination {
    /// Endpoint URI (e.g., "ssh://core@host:22/run/podman/podman.sock")
    pub uri: String,

    /// Optional path to an identity (SSH key) file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl Config {
    /// Load the config from ~/.config/farmhand/config.toml
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load the config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Return default config if file doesn't exist
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content).context("Invalid TOML format in farmhand config")
    }

    /// Save the config to ~/.config/farmhand/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Could not write config file: {}", path.display()))?;
        Ok(())
    }

    /// Whether the registry knows a connection by this name
    pub fn has_connection(&self, name: &str) -> bool {
        self.engine.service_destinations.contains_key(name)
    }
}

/// Get the config file path
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("farmhand")
        .join("config.toml"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_config() {
        let toml = r#"
[farms]
default = "farm1"

[farms.list]
farm1 = ["con1", "con2"]
farm2 = []

[engine.service_destinations.con1]
uri = "ssh://core@host1:22/run/podman/podman.sock"
identity = "~/.ssh/id_ed25519"

[engine.service_destinations.con2]
uri = "ssh://core@host2:22/run/podman/podman.sock"
"#;

        let config: Config = toml::from_str(toml).expect("Failed to parse config");

        assert_eq!(config.farms.default, "farm1");
        assert_eq!(config.farms.list.len(), 2);
        let farm1 = &config.farms.list["farm1"];
        assert!(farm1.contains("con1"));
        assert!(farm1.contains("con2"));
        assert!(config.farms.list["farm2"].is_empty());

        assert!(config.has_connection("con1"));
        assert!(config.has_connection("con2"));
        assert!(!config.has_connection("con3"));
        assert_eq!(
            config.engine.service_destinations["con1"].identity.as_deref(),
            Some("~/.ssh/id_ed25519")
        );
        assert_eq!(config.engine.service_destinations["con2"].identity, None);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.farms.list.is_empty());
        assert!(config.farms.default.is_empty());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.farms.list.insert(
            "farm1".to_string(),
            ["con1", "con2"].iter().map(ToString::to_string).collect(),
        );
        config.farms.default = "farm1".to_string();
        config.engine.service_destinations.insert(
            "con1".to_string(),
            Destination {
                uri: "tcp://localhost:8080".to_string(),
                identity: None,
            },
        );

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[farms\nlist = oops").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
