//! Trait abstractions for Sonos operations.
//!
//! These traits enable dependency injection for testability and modularity.
//! The session depends on traits rather than concrete implementations.

use async_trait::async_trait;

use crate::sonos::discovery::{DiscoveredDevice, DiscoveryResult};
use crate::sonos::soap::SoapResult;
use crate::sonos::types::{PlayMode, TrackMetadata, TransportState, ZoneMember};

/// Trait for transport control and queries on one speaker.
#[async_trait]
pub trait SonosPlayback: Send + Sync {
    /// Pauses a playing speaker or resumes a stopped/paused one.
    ///
    /// # Returns
    /// The state the speaker was commanded into.
    async fn toggle_playback(&self, ip: &str) -> SoapResult<TransportState>;

    /// Skips to the next track.
    async fn next(&self, ip: &str) -> SoapResult<()>;

    /// Returns to the previous track.
    async fn previous(&self, ip: &str) -> SoapResult<()>;

    /// Gets the current transport state.
    async fn get_transport_state(&self, ip: &str) -> SoapResult<TransportState>;

    /// Gets the raw play mode string reported by `GetTransportSettings`.
    async fn get_play_mode(&self, ip: &str) -> SoapResult<String>;

    /// Sets the play mode.
    async fn set_play_mode(&self, ip: &str, mode: PlayMode) -> SoapResult<()>;

    /// Gets metadata for the loaded track, `None` when the speaker has none.
    async fn get_track_metadata(&self, ip: &str) -> SoapResult<Option<TrackMetadata>>;
}

/// Trait for volume and mute control on one speaker.
#[async_trait]
pub trait SonosVolumeControl: Send + Sync {
    /// Gets the speaker volume (0-100).
    async fn get_volume(&self, ip: &str) -> SoapResult<u8>;

    /// Sets the speaker volume (0-100, values > 100 are clamped).
    async fn set_volume(&self, ip: &str, volume: u8) -> SoapResult<()>;

    /// Gets the speaker mute state.
    async fn get_mute(&self, ip: &str) -> SoapResult<bool>;

    /// Sets the speaker mute state.
    async fn set_mute(&self, ip: &str, mute: bool) -> SoapResult<()>;
}

/// Trait for the control-plane connection made when binding to an address.
#[async_trait]
pub trait SonosTopology: Send + Sync {
    /// Fetches the playable speakers known to the speaker at `ip`.
    ///
    /// The speaker answering at `ip` comes first when it is playable.
    async fn get_zone_members(&self, ip: &str) -> SoapResult<Vec<ZoneMember>>;
}

/// Trait for Sonos device discovery.
#[async_trait]
pub trait SonosDiscovery: Send + Sync {
    /// Discovers Sonos devices on the local network.
    async fn discover_devices(&self) -> DiscoveryResult<Vec<DiscoveredDevice>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for commands issued against a bound speaker.
pub trait SonosControl: SonosPlayback + SonosVolumeControl {}

/// Blanket implementation for any type implementing both traits.
impl<T: SonosPlayback + SonosVolumeControl> SonosControl for T {}

/// Combined trait for all Sonos operations.
///
/// Used by `SessionManager` to hold one client for discovery, binding and control.
pub trait SonosClient: SonosControl + SonosTopology + SonosDiscovery {}

/// Blanket implementation for any type implementing all traits.
impl<T: SonosControl + SonosTopology + SonosDiscovery> SonosClient for T {}
