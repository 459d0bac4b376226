//! Sonos device discovery.
//!
//! # Discovery Pipeline
//!
//! 1. Browse `_sonos._tcp.local.` for a fixed window
//! 2. Drop candidates without a UUID or IPv4 address, keep the first record per UUID
//! 3. Fetch each device description in parallel (best-effort) to add the model name

pub mod mdns;
pub mod types;

pub use types::{DiscoveredDevice, DiscoveryError, DiscoveryResult, MdnsRecord};

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::future::join_all;
use mdns_sd::ServiceDaemon;
use reqwest::Client;

use crate::protocol_constants::{
    DEVICE_DESCRIPTION_PATH, DEVICE_INFO_TIMEOUT_MS, DISCOVERY_TIMEOUT_MS, SONOS_SERVICE_TYPE,
};
use crate::sonos::utils::{build_sonos_url, extract_non_empty_xml_text};

/// Configuration for the discovery coordinator.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// mDNS service type to browse.
    pub service_type: String,
    /// How long the browse collects answers.
    pub browse_window: Duration,
    /// Timeout for each device description fetch.
    pub description_fetch_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_type: SONOS_SERVICE_TYPE.to_string(),
            browse_window: Duration::from_millis(DISCOVERY_TIMEOUT_MS),
            description_fetch_timeout: Duration::from_millis(DEVICE_INFO_TIMEOUT_MS),
        }
    }
}

/// Runs mDNS discovery and model enrichment.
pub struct DiscoveryCoordinator {
    config: DiscoveryConfig,
    http_client: Client,
    /// Lazily initialized mDNS daemon (reused across discovery calls)
    mdns_daemon: OnceLock<Arc<ServiceDaemon>>,
}

impl std::fmt::Debug for DiscoveryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCoordinator")
            .field("config", &self.config)
            .field("daemon_started", &self.mdns_daemon.get().is_some())
            .finish()
    }
}

impl DiscoveryCoordinator {
    /// Creates a new coordinator sharing the given HTTP client.
    pub fn new(config: DiscoveryConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
            mdns_daemon: OnceLock::new(),
        }
    }

    /// Gets or creates the mDNS daemon.
    fn get_mdns_daemon(&self) -> DiscoveryResult<&Arc<ServiceDaemon>> {
        if let Some(daemon) = self.mdns_daemon.get() {
            return Ok(daemon);
        }

        let daemon = mdns::create_daemon()?;

        // Another caller may have won the race; the loser's daemon is dropped
        if let Err(unused) = self.mdns_daemon.set(Arc::new(daemon)) {
            let _ = unused.shutdown();
        }

        self.mdns_daemon.get().ok_or_else(|| {
            DiscoveryError::MdnsDaemon("failed to initialize mDNS daemon".to_string())
        })
    }

    /// Discovers Sonos devices on the local network.
    ///
    /// Completes within the browse window plus one description timeout.
    /// Zero answers is not an error.
    pub async fn discover_devices(&self) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        log::info!("[Discovery] Starting mDNS discovery");

        let daemon = self.get_mdns_daemon()?;
        let records = mdns::browse(daemon, &self.config.service_type, self.config.browse_window).await?;
        let devices = types::dedup_first_seen(&records);

        log::debug!(
            "[Discovery] {} record(s) -> {} unique device(s)",
            records.len(),
            devices.len()
        );

        let devices = enrich_devices(
            &self.http_client,
            devices,
            self.config.description_fetch_timeout,
        )
        .await;

        log::info!("[Discovery] Found {} device(s)", devices.len());
        Ok(devices)
    }
}

impl Drop for DiscoveryCoordinator {
    fn drop(&mut self) {
        if let Some(daemon) = self.mdns_daemon.get() {
            if let Err(e) = daemon.shutdown() {
                log::debug!("[mDNS] Daemon shutdown failed: {:?}", e);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model Enrichment
// ─────────────────────────────────────────────────────────────────────────────

/// Adds model names to devices in parallel, preserving order.
///
/// Failures leave the device unchanged.
pub async fn enrich_devices(
    client: &Client,
    devices: Vec<DiscoveredDevice>,
    timeout: Duration,
) -> Vec<DiscoveredDevice> {
    let futures = devices.into_iter().map(|device| async move {
        match fetch_model_name(client, &device.ip, timeout).await {
            Some(model) => device.with_model(model),
            None => device,
        }
    });
    join_all(futures).await
}

/// Fetches the model name from a speaker's device description.
async fn fetch_model_name(client: &Client, ip: &str, timeout: Duration) -> Option<String> {
    let url = build_sonos_url(ip, DEVICE_DESCRIPTION_PATH);

    let response = match client.get(&url).timeout(timeout).send().await {
        Ok(r) => r,
        Err(e) => {
            log::debug!("[Discovery] Device description fetch failed for {}: {}", ip, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::debug!(
            "[Discovery] Device description for {} returned {}",
            ip,
            response.status()
        );
        return None;
    }

    let body = response.text().await.ok()?;
    parse_model_name(&body)
}

fn parse_model_name(xml: &str) -> Option<String> {
    extract_non_empty_xml_text(xml, "modelName")
}
