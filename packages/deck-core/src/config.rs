//! Runtime configuration for the deck core.
//!
//! All fields have defaults taken from [`crate::protocol_constants`], so an
//! empty config file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_VOLUME_STEP, DEVICE_INFO_TIMEOUT_MS, DISCOVERY_TIMEOUT_MS, RECONCILE_INTERVAL_MS,
    SOAP_TIMEOUT_SECS,
};
use crate::surface::SurfaceKind;

/// Largest dial step accepted, per tick.
pub const MAX_VOLUME_STEP: i32 = 50;

/// Configuration for the deck session and its surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    // Transport
    /// Upper bound for each SOAP request (seconds).
    pub soap_timeout_secs: u64,

    // Discovery
    /// mDNS browse window (milliseconds).
    pub discovery_timeout_ms: u64,
    /// Device description fetch timeout (milliseconds).
    pub device_info_timeout_ms: u64,

    // Surfaces
    /// Period of each surface's recurring refresh (milliseconds).
    pub reconcile_interval_ms: u64,
    /// Default volume change per dial tick.
    pub volume_step: i32,
    /// Speaker address to bind directly, skipping discovery.
    pub ip_address: Option<String>,
    /// Preferred device id (RINCON_xxx).
    pub device_uuid: Option<String>,
    /// Surfaces to activate.
    pub surfaces: Vec<SurfaceKind>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            soap_timeout_secs: SOAP_TIMEOUT_SECS,
            discovery_timeout_ms: DISCOVERY_TIMEOUT_MS,
            device_info_timeout_ms: DEVICE_INFO_TIMEOUT_MS,
            reconcile_interval_ms: RECONCILE_INTERVAL_MS,
            volume_step: DEFAULT_VOLUME_STEP,
            ip_address: None,
            device_uuid: None,
            surfaces: SurfaceKind::ALL.to_vec(),
        }
    }
}

impl DeckConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.soap_timeout_secs == 0 {
            return Err("soap_timeout_secs must be >= 1".to_string());
        }
        if self.discovery_timeout_ms == 0 {
            return Err("discovery_timeout_ms must be >= 1".to_string());
        }
        if self.device_info_timeout_ms == 0 {
            return Err("device_info_timeout_ms must be >= 1".to_string());
        }
        if self.reconcile_interval_ms == 0 {
            return Err("reconcile_interval_ms must be >= 1 (interval panics on 0)".to_string());
        }
        if !(1..=MAX_VOLUME_STEP).contains(&self.volume_step) {
            return Err(format!(
                "volume_step must be between 1 and {}",
                MAX_VOLUME_STEP
            ));
        }
        if self.ip_address.as_deref().is_some_and(|ip| ip.trim().is_empty()) {
            return Err("ip_address must not be empty when set".to_string());
        }
        Ok(())
    }

    pub fn soap_timeout(&self) -> Duration {
        Duration::from_secs(self.soap_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn device_info_timeout(&self) -> Duration {
        Duration::from_millis(self.device_info_timeout_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }
}
