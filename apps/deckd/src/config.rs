//! Driver configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sonos_deck_core::{DeckConfig, SurfaceKind};

/// Driver configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Speaker address to bind directly, skipping discovery.
    /// Override: `SONOS_DECK_IP`
    pub ip_address: Option<String>,

    /// Preferred device id (`RINCON_...`).
    /// Override: `SONOS_DECK_DEVICE_UUID`
    pub device_uuid: Option<String>,

    /// Milliseconds between surface refreshes.
    /// Override: `SONOS_DECK_RECONCILE_INTERVAL_MS`
    pub reconcile_interval_ms: u64,

    /// Volume change per dial tick.
    /// Override: `SONOS_DECK_VOLUME_STEP`
    pub volume_step: i32,

    /// SOAP request timeout in seconds.
    pub soap_timeout_secs: u64,

    /// mDNS browse window in milliseconds.
    pub discovery_timeout_ms: u64,

    /// Device description timeout in milliseconds.
    pub device_info_timeout_ms: u64,

    /// Surfaces to activate.
    pub surfaces: Vec<SurfaceKind>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let deck = DeckConfig::default();
        Self {
            ip_address: deck.ip_address,
            device_uuid: deck.device_uuid,
            reconcile_interval_ms: deck.reconcile_interval_ms,
            volume_step: deck.volume_step,
            soap_timeout_secs: deck.soap_timeout_secs,
            discovery_timeout_ms: deck.discovery_timeout_ms,
            device_info_timeout_ms: deck.device_info_timeout_ms,
            surfaces: deck.surfaces,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ip) = lookup("SONOS_DECK_IP").filter(|v| !v.trim().is_empty()) {
            self.ip_address = Some(ip);
        }

        if let Some(uuid) = lookup("SONOS_DECK_DEVICE_UUID").filter(|v| !v.trim().is_empty()) {
            self.device_uuid = Some(uuid);
        }

        if let Some(interval) =
            lookup("SONOS_DECK_RECONCILE_INTERVAL_MS").and_then(|v| v.parse().ok())
        {
            self.reconcile_interval_ms = interval;
        }

        if let Some(step) = lookup("SONOS_DECK_VOLUME_STEP").and_then(|v| v.parse().ok()) {
            self.volume_step = step;
        }
    }

    /// Converts to the core's validated `DeckConfig`.
    pub fn to_deck_config(&self) -> Result<DeckConfig> {
        let config = DeckConfig {
            soap_timeout_secs: self.soap_timeout_secs,
            discovery_timeout_ms: self.discovery_timeout_ms,
            device_info_timeout_ms: self.device_info_timeout_ms,
            reconcile_interval_ms: self.reconcile_interval_ms,
            volume_step: self.volume_step,
            ip_address: self.ip_address.clone(),
            device_uuid: self.device_uuid.clone(),
            surfaces: self.surfaces.clone(),
        };

        if let Err(reason) = config.validate() {
            bail!("Invalid configuration: {}", reason);
        }
        Ok(config)
    }
}
