//! Configuration Management
//!
//! Handles persistent configuration storage for the armsim binary.

use crate::arm::client::ClientOptions;
use crate::fault::FaultProfile;
use crate::paging::DEFAULT_PAGE_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Subscription used when nothing else is configured
pub const DEFAULT_SUBSCRIPTION: &str = "springfield-sub-12345";

/// Environment variable consulted for the subscription
pub const SUBSCRIPTION_ENV: &str = "ARMSIM_SUBSCRIPTION";

/// Which fault profile the simulator runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaultMode {
    #[default]
    Reference,
    Off,
}

fn default_latency_scale() -> f64 {
    1.0
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Last used subscription
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Fault injector seed; random when unset
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub faults: FaultMode,
    /// Multiplier applied to every latency bound
    #[serde(default = "default_latency_scale")]
    pub latency_scale: f64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subscription_id: None,
            seed: None,
            faults: FaultMode::default(),
            latency_scale: default_latency_scale(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("armsim").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective subscription (CLI > config > environment > default)
    pub fn effective_subscription(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.subscription_id.clone())
            .or_else(|| std::env::var(SUBSCRIPTION_ENV).ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_SUBSCRIPTION.to_string())
    }

    /// Set subscription and save
    pub fn set_subscription(&mut self, subscription_id: &str) -> Result<()> {
        self.subscription_id = Some(subscription_id.to_string());
        self.save()
    }

    /// Client options described by this configuration
    pub fn client_options(&self) -> ClientOptions {
        let profile = match self.faults {
            FaultMode::Reference => FaultProfile::reference().scale_latency(self.latency_scale),
            FaultMode::Off => FaultProfile::none(),
        };

        let mut options = ClientOptions::default()
            .with_faults(profile)
            .with_page_size(self.page_size);
        options.seed = self.seed;
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::OpKind;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"faults":"off","seed":7}"#).unwrap();
        assert_eq!(config.faults, FaultMode::Off);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.latency_scale, 1.0);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_huge_latency_scale_does_not_panic() {
        let config: Config = serde_json::from_str(r#"{"latency_scale":1e300}"#).unwrap();
        let options = config.client_options();
        assert_eq!(
            options.fault_profile.latency_for(OpKind::DeleteResourceGroup),
            FaultProfile::reference().latency_for(OpKind::DeleteResourceGroup)
        );
    }

    #[test]
    fn test_cli_subscription_wins() {
        let config = Config {
            subscription_id: Some("from-config".into()),
            ..Config::default()
        };
        assert_eq!(config.effective_subscription(Some("from-cli")), "from-cli");
        assert_eq!(config.effective_subscription(None), "from-config");
    }

    #[test]
    fn test_client_options_follow_config() {
        let config = Config {
            seed: Some(42),
            page_size: 10,
            ..Config::default()
        };
        let options = config.client_options();
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.page_size, 10);
    }
}
