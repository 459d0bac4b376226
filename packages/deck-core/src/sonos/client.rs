//! Concrete Sonos client backed by reqwest and mdns-sd.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::DeckConfig;
use crate::sonos::discovery::{
    DiscoveredDevice, DiscoveryConfig, DiscoveryCoordinator, DiscoveryResult,
};
use crate::sonos::soap::SoapResult;
use crate::sonos::traits::{SonosDiscovery, SonosPlayback, SonosTopology, SonosVolumeControl};
use crate::sonos::types::{PlayMode, TrackMetadata, TransportState, ZoneMember};
use crate::sonos::{playback, volume, zone_groups};

/// Concrete implementation of Sonos client traits.
///
/// This struct wraps the free functions in the command modules to provide
/// a testable, injectable interface for Sonos operations.
#[derive(Clone)]
pub struct SonosClientImpl {
    /// HTTP client for Sonos communication.
    client: Client,
    /// Upper bound for each SOAP request.
    soap_timeout: Duration,
    /// Discovery coordinator (owns the mDNS daemon).
    discovery: Arc<DiscoveryCoordinator>,
}

impl std::fmt::Debug for SonosClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonosClientImpl")
            .field("client", &"Client")
            .field("soap_timeout", &self.soap_timeout)
            .field("discovery", &self.discovery)
            .finish()
    }
}

impl SonosClientImpl {
    /// Creates a new SonosClientImpl with the given HTTP client and defaults.
    ///
    /// # Arguments
    /// * `client` - The HTTP client to use for all Sonos communication
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::from_config(client, &DeckConfig::default())
    }

    /// Creates a new SonosClientImpl using the timeouts from `config`.
    #[must_use]
    pub fn from_config(client: Client, config: &DeckConfig) -> Self {
        let discovery_config = DiscoveryConfig {
            browse_window: config.discovery_timeout(),
            description_fetch_timeout: config.device_info_timeout(),
            ..DiscoveryConfig::default()
        };

        Self {
            discovery: Arc::new(DiscoveryCoordinator::new(discovery_config, client.clone())),
            soap_timeout: config.soap_timeout(),
            client,
        }
    }
}

#[async_trait]
impl SonosPlayback for SonosClientImpl {
    async fn toggle_playback(&self, ip: &str) -> SoapResult<TransportState> {
        playback::toggle_playback(&self.client, ip, self.soap_timeout).await
    }

    async fn next(&self, ip: &str) -> SoapResult<()> {
        playback::next(&self.client, ip, self.soap_timeout).await
    }

    async fn previous(&self, ip: &str) -> SoapResult<()> {
        playback::previous(&self.client, ip, self.soap_timeout).await
    }

    async fn get_transport_state(&self, ip: &str) -> SoapResult<TransportState> {
        playback::get_transport_info(&self.client, ip, self.soap_timeout).await
    }

    async fn get_play_mode(&self, ip: &str) -> SoapResult<String> {
        playback::get_play_mode(&self.client, ip, self.soap_timeout).await
    }

    async fn set_play_mode(&self, ip: &str, mode: PlayMode) -> SoapResult<()> {
        playback::set_play_mode(&self.client, ip, mode, self.soap_timeout).await
    }

    async fn get_track_metadata(&self, ip: &str) -> SoapResult<Option<TrackMetadata>> {
        playback::get_position_info(&self.client, ip, self.soap_timeout).await
    }
}

#[async_trait]
impl SonosVolumeControl for SonosClientImpl {
    async fn get_volume(&self, ip: &str) -> SoapResult<u8> {
        volume::get_volume(&self.client, ip, self.soap_timeout).await
    }

    async fn set_volume(&self, ip: &str, level: u8) -> SoapResult<()> {
        volume::set_volume(&self.client, ip, level, self.soap_timeout).await
    }

    async fn get_mute(&self, ip: &str) -> SoapResult<bool> {
        volume::get_mute(&self.client, ip, self.soap_timeout).await
    }

    async fn set_mute(&self, ip: &str, mute: bool) -> SoapResult<()> {
        volume::set_mute(&self.client, ip, mute, self.soap_timeout).await
    }
}

#[async_trait]
impl SonosTopology for SonosClientImpl {
    async fn get_zone_members(&self, ip: &str) -> SoapResult<Vec<ZoneMember>> {
        zone_groups::get_zone_members(&self.client, ip, self.soap_timeout).await
    }
}

#[async_trait]
impl SonosDiscovery for SonosClientImpl {
    async fn discover_devices(&self) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        self.discovery.discover_devices().await
    }
}
