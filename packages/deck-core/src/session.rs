//! Device session: binding, lazy initialization and speaker commands.
//!
//! One [`SessionManager`] is constructed per process and shared by reference
//! (`Arc`) with every surface, so all surfaces observe the same binding.
//!
//! # States
//!
//! ```text
//! Uninitialized ──initialize──► Initializing ──ok──► Bound
//!       ▲                            │                 │
//!       └──────────failure───────────┘      select_device (Bound ► Bound)
//! ```
//!
//! The binding (active device plus registry) is swapped in as a whole under
//! a write lock, so readers see either the old binding or the new one.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::DeckConfig;
use crate::error::{SessionError, SessionResult};
use crate::protocol_constants::MAX_VOLUME;
use crate::sonos::discovery::DiscoveredDevice;
use crate::sonos::traits::SonosClient;
use crate::sonos::types::{PlayMode, TrackMetadata, TransportState, ZoneMember};

// ─────────────────────────────────────────────────────────────────────────────
// Device Handle
// ─────────────────────────────────────────────────────────────────────────────

/// A bound speaker and the control port used to reach it.
///
/// Handles are never mutated: selecting another device swaps in another handle.
pub struct DeviceHandle {
    uuid: String,
    name: String,
    ip: String,
    control: Arc<dyn SonosClient>,
}

impl DeviceHandle {
    fn new(member: ZoneMember, control: Arc<dyn SonosClient>) -> Self {
        Self {
            uuid: member.uuid,
            name: member.zone_name,
            ip: member.ip,
            control,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Room name of the speaker.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("ip", &self.ip)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Uninitialized,
    Initializing,
    Bound,
}

struct Binding {
    active: Arc<DeviceHandle>,
    /// Every playable speaker reported by the control-plane connection.
    registry: Vec<Arc<DeviceHandle>>,
}

/// Clamps an arbitrary volume request to the renderer's 0-100 scale.
pub fn clamp_volume(volume: i32) -> u8 {
    // Lossless: the clamp keeps the value within u8
    volume.clamp(0, i32::from(MAX_VOLUME)) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the device binding and issues every speaker command.
pub struct SessionManager {
    client: Arc<dyn SonosClient>,
    binding: RwLock<Option<Binding>>,
    /// Serializes binding attempts so concurrent callers don't discover twice.
    init_lock: tokio::sync::Mutex<()>,
    /// Held for each discovery. Browses of one service type share the mDNS
    /// querier, so the first to finish would cut the others short.
    discovery_lock: tokio::sync::Mutex<()>,
    /// Address used by auto-initialization: the last bound one, else the configured one.
    known_address: RwLock<Option<String>>,
    /// Device id preferred by auto-initialization.
    preferred_device: RwLock<Option<String>>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("status", &self.status())
            .field("active", &self.active_device())
            .field("known_address", &*self.known_address.read())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates an unbound session.
    pub fn new(client: Arc<dyn SonosClient>) -> Self {
        Self {
            client,
            binding: RwLock::new(None),
            init_lock: tokio::sync::Mutex::new(()),
            discovery_lock: tokio::sync::Mutex::new(()),
            known_address: RwLock::new(None),
            preferred_device: RwLock::new(None),
        }
    }

    /// Creates an unbound session that auto-initializes against the
    /// configured address and device id.
    pub fn with_config(client: Arc<dyn SonosClient>, config: &DeckConfig) -> Self {
        let session = Self::new(client);
        *session.known_address.write() = config.ip_address.clone();
        *session.preferred_device.write() = config.device_uuid.clone();
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the lifecycle state.
    pub fn status(&self) -> SessionStatus {
        if self.binding.read().is_some() {
            SessionStatus::Bound
        } else if self.init_lock.try_lock().is_err() {
            SessionStatus::Initializing
        } else {
            SessionStatus::Uninitialized
        }
    }

    /// Returns true when a device is bound.
    pub fn is_bound(&self) -> bool {
        self.binding.read().is_some()
    }

    /// Returns the active device, if bound.
    pub fn active_device(&self) -> Option<Arc<DeviceHandle>> {
        self.binding.read().as_ref().map(|b| Arc::clone(&b.active))
    }

    /// Returns the room name of the active device.
    pub fn device_name(&self) -> Option<String> {
        self.active_device().map(|d| d.name.clone())
    }

    /// Returns the registry built by the last successful initialization.
    pub fn devices(&self) -> Vec<Arc<DeviceHandle>> {
        self.binding
            .read()
            .as_ref()
            .map(|b| b.registry.clone())
            .unwrap_or_default()
    }

    /// Binds the session to a device.
    ///
    /// - Already bound with no `device_id`, or bound to `device_id`: no-op.
    /// - Already bound to another device: reselects from the registry
    ///   without discovery (see [`Self::select_device`]).
    /// - Unbound: binds to `address`, or to the discovered device matching
    ///   `device_id` (else the first one discovered), then makes the
    ///   control-plane connection and picks `device_id` (else the first
    ///   speaker listed).
    ///
    /// On failure the session stays unbound; nothing is partially applied.
    pub async fn initialize(
        &self,
        address: Option<&str>,
        device_id: Option<&str>,
    ) -> SessionResult<()> {
        if let Some(result) = self.reuse_binding(device_id) {
            return result;
        }

        let _guard = self.init_lock.lock().await;

        // Another caller may have bound while we waited
        if let Some(result) = self.reuse_binding(device_id) {
            return result;
        }

        match self.bind(address, device_id).await {
            Ok(active) => {
                log::info!(
                    "[Session] Bound to {} ({}) at {}",
                    active.name,
                    active.uuid,
                    active.ip
                );
                Ok(())
            }
            Err(e) => {
                log::error!("[Session] Initialization failed: {}", e);
                Err(e)
            }
        }
    }

    /// Resolves `initialize` against an existing binding, if there is one.
    fn reuse_binding(&self, device_id: Option<&str>) -> Option<SessionResult<()>> {
        let active = self.active_device()?;
        match device_id {
            Some(id) if id != active.uuid => Some(self.select_device(id)),
            _ => Some(Ok(())),
        }
    }

    async fn bind(
        &self,
        address: Option<&str>,
        device_id: Option<&str>,
    ) -> SessionResult<Arc<DeviceHandle>> {
        let target = match address {
            Some(ip) => ip.to_string(),
            None => {
                let discovered = self.run_discovery().await?;
                choose_discovered(&discovered, device_id)
                    .map(|d| d.ip.clone())
                    .ok_or(SessionError::NoDevicesFound)?
            }
        };

        log::debug!("[Session] Connecting to {}", target);
        let members = self.client.get_zone_members(&target).await?;

        let registry: Vec<Arc<DeviceHandle>> = members
            .into_iter()
            .map(|m| Arc::new(DeviceHandle::new(m, Arc::clone(&self.client))))
            .collect();

        let active = device_id
            .and_then(|id| registry.iter().find(|d| d.uuid == id))
            .or_else(|| registry.first())
            .cloned()
            .ok_or(SessionError::NoDevicesFound)?;

        *self.binding.write() = Some(Binding {
            active: Arc::clone(&active),
            registry,
        });
        self.remember(&active);
        Ok(active)
    }

    /// Makes another registry device the active one.
    ///
    /// Fails with `DeviceNotFound` (keeping the current binding) when the id
    /// isn't in the registry.
    pub fn select_device(&self, uuid: &str) -> SessionResult<()> {
        let selected = {
            let mut guard = self.binding.write();
            let binding = guard.as_mut().ok_or(SessionError::NotBound)?;
            let device = binding
                .registry
                .iter()
                .find(|d| d.uuid == uuid)
                .cloned()
                .ok_or_else(|| SessionError::DeviceNotFound(uuid.to_string()))?;
            binding.active = Arc::clone(&device);
            device
        };

        log::info!("[Session] Selected {} ({})", selected.name, selected.uuid);
        self.remember(&selected);
        Ok(())
    }

    fn remember(&self, device: &DeviceHandle) {
        *self.known_address.write() = Some(device.ip.clone());
        *self.preferred_device.write() = Some(device.uuid.clone());
    }

    /// Drops the binding; the next operation re-initializes.
    pub fn release(&self) {
        if self.binding.write().take().is_some() {
            log::info!("[Session] Released device binding");
        }
    }

    /// Returns the active device, initializing first if needed.
    ///
    /// Reconnects to the last known address when there is one and falls
    /// back to discovery if that fails.
    async fn ensure_initialized(&self) -> SessionResult<Arc<DeviceHandle>> {
        if let Some(active) = self.active_device() {
            return Ok(active);
        }

        let address = self.known_address.read().clone();
        let device_id = self.preferred_device.read().clone();

        let mut result = self.initialize(address.as_deref(), device_id.as_deref()).await;
        if result.is_err() && address.is_some() {
            log::warn!("[Session] Reconnect to known address failed, discovering");
            result = self.initialize(None, device_id.as_deref()).await;
        }
        result?;

        self.active_device().ok_or(SessionError::NotBound)
    }

    /// Runs discovery for a device picker. Does not change the binding.
    pub async fn discover(&self) -> SessionResult<Vec<DiscoveredDevice>> {
        self.run_discovery().await
    }

    async fn run_discovery(&self) -> SessionResult<Vec<DiscoveredDevice>> {
        let _guard = self.discovery_lock.lock().await;
        Ok(self.client.discover_devices().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────────

    /// Toggles play/pause, returning the state the speaker was commanded into.
    pub async fn toggle_play_pause(&self) -> SessionResult<TransportState> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.toggle_playback(&device.ip).await?)
    }

    pub async fn next_track(&self) -> SessionResult<()> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.next(&device.ip).await?)
    }

    pub async fn previous_track(&self) -> SessionResult<()> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.previous(&device.ip).await?)
    }

    pub async fn play_state(&self) -> SessionResult<TransportState> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.get_transport_state(&device.ip).await?)
    }

    /// Returns metadata for the loaded track (`None` when there is none).
    pub async fn current_track(&self) -> SessionResult<Option<TrackMetadata>> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.get_track_metadata(&device.ip).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Volume
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn volume(&self) -> SessionResult<u8> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.get_volume(&device.ip).await?)
    }

    /// Sets the volume; the request is clamped to 0-100 before sending.
    pub async fn set_volume(&self, volume: i32) -> SessionResult<()> {
        let device = self.ensure_initialized().await?;
        Ok(device
            .control
            .set_volume(&device.ip, clamp_volume(volume))
            .await?)
    }

    /// Changes the volume by `delta`, clamped to 0-100.
    ///
    /// Returns the resulting volume. A failed write returns the volume read
    /// before it; nothing is written when the clamped value is unchanged.
    pub async fn adjust_volume(&self, delta: i32) -> SessionResult<u8> {
        let device = self.ensure_initialized().await?;
        let current = device.control.get_volume(&device.ip).await?;
        let target = clamp_volume(i32::from(current).saturating_add(delta));

        if target == current {
            return Ok(current);
        }

        match device.control.set_volume(&device.ip, target).await {
            Ok(()) => Ok(target),
            Err(e) => {
                log::warn!("[Session] Volume write failed, keeping {}: {}", current, e);
                Ok(current)
            }
        }
    }

    pub async fn is_muted(&self) -> SessionResult<bool> {
        let device = self.ensure_initialized().await?;
        Ok(device.control.get_mute(&device.ip).await?)
    }

    /// Flips the mute state, returning the new one.
    pub async fn toggle_mute(&self) -> SessionResult<bool> {
        let device = self.ensure_initialized().await?;
        let muted = device.control.get_mute(&device.ip).await?;
        device.control.set_mute(&device.ip, !muted).await?;
        Ok(!muted)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Play Mode
    // ─────────────────────────────────────────────────────────────────────────

    async fn play_mode(&self, device: &DeviceHandle) -> SessionResult<PlayMode> {
        let raw = device.control.get_play_mode(&device.ip).await?;
        raw.parse()
            .map_err(|_| SessionError::UnknownPlayMode(raw))
    }

    pub async fn shuffle_enabled(&self) -> SessionResult<bool> {
        let device = self.ensure_initialized().await?;
        Ok(self.play_mode(&device).await?.is_shuffle())
    }

    /// Flips shuffle while keeping the repeat setting, returning the new mode.
    pub async fn toggle_shuffle(&self) -> SessionResult<PlayMode> {
        let device = self.ensure_initialized().await?;
        let mode = self.play_mode(&device).await?;
        let next = mode.toggle_shuffle();
        device.control.set_play_mode(&device.ip, next).await?;
        log::debug!("[Session] Play mode {} -> {}", mode, next);
        Ok(next)
    }
}

fn choose_discovered<'a>(
    devices: &'a [DiscoveredDevice],
    device_id: Option<&str>,
) -> Option<&'a DiscoveredDevice> {
    device_id
        .and_then(|id| devices.iter().find(|d| d.uuid == id))
        .or_else(|| devices.first())
}
