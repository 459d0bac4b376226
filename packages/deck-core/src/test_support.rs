//! In-memory Sonos speaker and artwork fetcher for session-level tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::artwork::{ArtworkError, ArtworkFetcher, ArtworkResult};
use crate::sonos::discovery::{DiscoveredDevice, DiscoveryResult};
use crate::sonos::soap::{SoapError, SoapResult};
use crate::sonos::traits::{SonosDiscovery, SonosPlayback, SonosTopology, SonosVolumeControl};
use crate::sonos::types::{PlayMode, TrackMetadata, TransportState, ZoneMember};

pub fn device(uuid: &str, ip: &str) -> DiscoveredDevice {
    DiscoveredDevice {
        uuid: uuid.to_string(),
        name: format!("Room {}", uuid),
        ip: ip.to_string(),
        model: None,
    }
}

pub fn member(uuid: &str, ip: &str, zone_name: &str) -> ZoneMember {
    ZoneMember {
        uuid: uuid.to_string(),
        ip: ip.to_string(),
        zone_name: zone_name.to_string(),
    }
}

pub fn track(uri: &str, art: Option<&str>) -> TrackMetadata {
    TrackMetadata {
        track_uri: Some(uri.to_string()),
        title: Some(format!("Title of {}", uri)),
        artist: Some("Artist".to_string()),
        album: None,
        album_art_url: art.map(str::to_string),
    }
}

/// Mutable speaker state behind the mock.
#[derive(Debug, Clone)]
pub struct MockState {
    pub discovered: Vec<DiscoveredDevice>,
    pub members: Vec<ZoneMember>,
    pub transport: TransportState,
    pub volume: u8,
    pub muted: bool,
    pub play_mode: String,
    pub track: Option<TrackMetadata>,
    /// Fail every control call (transport, volume, mode, metadata).
    pub fail_control: bool,
    /// Fail only track metadata reads.
    pub fail_metadata: bool,
    /// Fail only volume writes.
    pub fail_volume_write: bool,
    /// Fail the topology request.
    pub fail_topology: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            discovered: Vec::new(),
            members: Vec::new(),
            transport: TransportState::Stopped,
            volume: 30,
            muted: false,
            play_mode: PlayMode::Normal.as_str().to_string(),
            track: None,
            fail_control: false,
            fail_metadata: false,
            fail_volume_write: false,
            fail_topology: false,
        }
    }
}

/// Mock Sonos client with call counters.
#[derive(Debug, Default)]
pub struct MockSonosClient {
    pub state: Mutex<MockState>,
    pub discover_calls: AtomicUsize,
    pub topology_calls: AtomicUsize,
    pub volume_reads: AtomicUsize,
    pub volume_writes: AtomicUsize,
    pub metadata_reads: AtomicUsize,
    pub transport_reads: AtomicUsize,
    /// Discoveries running right now, and the most ever running at once.
    pub discover_in_flight: AtomicUsize,
    pub discover_peak: AtomicUsize,
    /// When set, discovery and transport calls wait for a permit.
    pub gate: Mutex<Option<Arc<Semaphore>>>,
    /// Calls that have reached the gate.
    pub gated_calls: AtomicUsize,
    /// Addresses passed to `get_zone_members`, in order.
    pub topology_targets: Mutex<Vec<String>>,
}

impl MockSonosClient {
    pub fn new(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Default::default()
        }
    }

    /// A household of two speakers reachable through discovery.
    pub fn household() -> Self {
        Self::new(MockState {
            discovered: vec![
                device("RINCON_KITCHEN", "192.168.1.10"),
                device("RINCON_OFFICE", "192.168.1.20"),
            ],
            members: vec![
                member("RINCON_KITCHEN", "192.168.1.10", "Kitchen"),
                member("RINCON_OFFICE", "192.168.1.20", "Office"),
            ],
            ..Default::default()
        })
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Installs a closed gate and returns it; `add_permits(1)` opens it.
    pub fn close_gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Yields until `calls` calls are waiting at (or went through) the gate.
    pub async fn wait_at_gate(&self, calls: usize) {
        while Self::count(&self.gated_calls) < calls {
            tokio::task::yield_now().await;
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            self.gated_calls.fetch_add(1, Ordering::SeqCst);
            let _ = gate.acquire().await;
        }
    }

    fn control_guard(&self) -> SoapResult<()> {
        if self.state.lock().fail_control {
            Err(SoapError::Fault("simulated failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SonosDiscovery for MockSonosClient {
    async fn discover_devices(&self) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.discover_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.discover_peak.fetch_max(running, Ordering::SeqCst);
        self.pass_gate().await;
        self.discover_in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.state.lock().discovered.clone())
    }
}

#[async_trait]
impl SonosTopology for MockSonosClient {
    async fn get_zone_members(&self, ip: &str) -> SoapResult<Vec<ZoneMember>> {
        self.topology_calls.fetch_add(1, Ordering::SeqCst);
        self.topology_targets.lock().push(ip.to_string());
        let state = self.state.lock();
        if state.fail_topology {
            return Err(SoapError::HttpStatus(503, "unavailable".to_string()));
        }
        Ok(state.members.clone())
    }
}

#[async_trait]
impl SonosPlayback for MockSonosClient {
    async fn toggle_playback(&self, _ip: &str) -> SoapResult<TransportState> {
        self.pass_gate().await;
        self.control_guard()?;
        let mut state = self.state.lock();
        state.transport = if state.transport.is_active() {
            TransportState::Paused
        } else {
            TransportState::Playing
        };
        Ok(state.transport)
    }

    async fn next(&self, _ip: &str) -> SoapResult<()> {
        self.control_guard()
    }

    async fn previous(&self, _ip: &str) -> SoapResult<()> {
        self.control_guard()
    }

    async fn get_transport_state(&self, _ip: &str) -> SoapResult<TransportState> {
        self.transport_reads.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.control_guard()?;
        Ok(self.state.lock().transport)
    }

    async fn get_play_mode(&self, _ip: &str) -> SoapResult<String> {
        self.control_guard()?;
        Ok(self.state.lock().play_mode.clone())
    }

    async fn set_play_mode(&self, _ip: &str, mode: PlayMode) -> SoapResult<()> {
        self.control_guard()?;
        self.state.lock().play_mode = mode.as_str().to_string();
        Ok(())
    }

    async fn get_track_metadata(&self, _ip: &str) -> SoapResult<Option<TrackMetadata>> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        self.control_guard()?;
        let state = self.state.lock();
        if state.fail_metadata {
            return Err(SoapError::Fault("UPnPError (701)".to_string()));
        }
        Ok(state.track.clone())
    }
}

#[async_trait]
impl SonosVolumeControl for MockSonosClient {
    async fn get_volume(&self, _ip: &str) -> SoapResult<u8> {
        self.volume_reads.fetch_add(1, Ordering::SeqCst);
        self.control_guard()?;
        Ok(self.state.lock().volume)
    }

    async fn set_volume(&self, _ip: &str, volume: u8) -> SoapResult<()> {
        self.volume_writes.fetch_add(1, Ordering::SeqCst);
        self.control_guard()?;
        let mut state = self.state.lock();
        if state.fail_volume_write {
            return Err(SoapError::Fault("UPnPError (402)".to_string()));
        }
        state.volume = volume.min(100);
        Ok(())
    }

    async fn get_mute(&self, _ip: &str) -> SoapResult<bool> {
        self.control_guard()?;
        Ok(self.state.lock().muted)
    }

    async fn set_mute(&self, _ip: &str, mute: bool) -> SoapResult<()> {
        self.control_guard()?;
        self.state.lock().muted = mute;
        Ok(())
    }
}

/// Artwork fetcher that encodes the URL itself and counts fetches.
#[derive(Debug, Default)]
pub struct MockArtworkFetcher {
    pub fetches: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl ArtworkFetcher for MockArtworkFetcher {
    async fn fetch(&self, url: &str) -> ArtworkResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ArtworkError::HttpStatus(404));
        }
        Ok(format!("data:image/jpeg;base64,{}", url))
    }
}
