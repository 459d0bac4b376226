//! Control surfaces: the keys and dial that drive the session.
//!
//! A [`Surface`] receives activation, commands and teardown from the host
//! and renders through a [`SurfaceDisplay`] sink. Surfaces with live state
//! refresh themselves on a recurring timer.
//!
//! # Lifecycle
//!
//! 1. [`Surface::activate`]: apply settings, render once, start the timer
//! 2. [`Surface::command`]: run the command, then re-render
//! 3. [`Surface::deactivate`]: stop the timer; results still in flight are
//!    dropped instead of rendered

use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::artwork::ArtworkFetcher;
use crate::config::{DeckConfig, MAX_VOLUME_STEP};
use crate::error::SessionResultExt;
use crate::protocol_constants::{MUTE_ICON, SPEAKER_ICON, UNKNOWN_DEVICE_NAME};
use crate::reconciler::{StateReconciler, VolumeView};
use crate::runtime::TaskSpawner;
use crate::session::SessionManager;
use crate::sonos::discovery::DiscoveredDevice;
use crate::sonos::types::UnknownValue;

// ─────────────────────────────────────────────────────────────────────────────
// Surface Types
// ─────────────────────────────────────────────────────────────────────────────

/// The kinds of control a surface can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    PlayPause,
    NextTrack,
    PreviousTrack,
    Shuffle,
    VolumeDial,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 5] = [
        SurfaceKind::PlayPause,
        SurfaceKind::NextTrack,
        SurfaceKind::PreviousTrack,
        SurfaceKind::Shuffle,
        SurfaceKind::VolumeDial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayPause => "play-pause",
            Self::NextTrack => "next-track",
            Self::PreviousTrack => "previous-track",
            Self::Shuffle => "shuffle",
            Self::VolumeDial => "volume-dial",
        }
    }

    /// Whether the surface shows live state and needs a recurring refresh.
    pub fn has_timer(&self) -> bool {
        matches!(self, Self::PlayPause | Self::Shuffle | Self::VolumeDial)
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Per-surface settings delivered by the host on activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceSettings {
    pub ip_address: Option<String>,
    pub device_uuid: Option<String>,
    pub volume_step: Option<i32>,
}

/// Input events a surface reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Key press.
    Press,
    /// Dial rotation by a signed number of ticks.
    Rotate(i32),
    /// Dial press.
    DialPress,
    /// Tap on the dial's touch strip.
    TouchTap,
    /// Request for the device picker list.
    Discover,
}

/// Dial layout values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeFeedback {
    pub title: String,
    pub value: String,
    /// Bar fill, 0 while muted.
    pub indicator: u8,
    pub icon: &'static str,
}

impl VolumeFeedback {
    pub fn new(device_name: Option<String>, view: VolumeView) -> Self {
        Self {
            title: device_name.unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string()),
            value: format!("{}%", view.volume),
            indicator: if view.muted { 0 } else { view.volume },
            icon: if view.muted { MUTE_ICON } else { SPEAKER_ICON },
        }
    }
}

/// Device picker message sent in response to [`SurfaceCommand::Discover`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListPayload {
    pub action: &'static str,
    pub devices: Vec<DiscoveredDevice>,
    pub selected_uuid: Option<String>,
}

impl DeviceListPayload {
    pub const ACTION: &'static str = "deviceList";

    pub fn new(devices: Vec<DiscoveredDevice>, selected_uuid: Option<String>) -> Self {
        Self {
            action: Self::ACTION,
            devices,
            selected_uuid,
        }
    }
}

/// Rendering sink implemented by the host.
pub trait SurfaceDisplay: Send + Sync {
    /// Sets the key's state index.
    fn set_state(&self, state: u8);

    /// Sets (or clears) the key image.
    fn set_image(&self, image: Option<&str>);

    /// Updates the dial layout.
    fn set_feedback(&self, feedback: &VolumeFeedback);

    /// Brief success acknowledgement.
    fn show_ok(&self);

    /// Brief failure indication.
    fn show_alert(&self);

    /// Delivers the device picker list.
    fn send_device_list(&self, payload: &DeviceListPayload);
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface
// ─────────────────────────────────────────────────────────────────────────────

/// One activated control on the host.
pub struct Surface {
    inner: Arc<SurfaceInner>,
}

struct SurfaceInner {
    kind: SurfaceKind,
    session: Arc<SessionManager>,
    reconciler: StateReconciler,
    display: Arc<dyn SurfaceDisplay>,
    interval: Duration,
    volume_step: AtomicI32,
    default_step: i32,
    /// Token for the current activation; cancelled while inactive.
    lifecycle: Mutex<CancellationToken>,
    /// Held by the tick in flight.
    ticking: tokio::sync::Mutex<()>,
}

impl Surface {
    pub fn new(
        kind: SurfaceKind,
        session: Arc<SessionManager>,
        artwork: Arc<dyn ArtworkFetcher>,
        display: Arc<dyn SurfaceDisplay>,
        config: &DeckConfig,
    ) -> Self {
        let inactive = CancellationToken::new();
        inactive.cancel();

        Self {
            inner: Arc::new(SurfaceInner {
                kind,
                reconciler: StateReconciler::new(Arc::clone(&session), artwork),
                session,
                display,
                interval: config.reconcile_interval(),
                volume_step: AtomicI32::new(config.volume_step),
                default_step: config.volume_step,
                lifecycle: Mutex::new(inactive),
                ticking: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.inner.kind
    }

    pub fn is_active(&self) -> bool {
        !self.inner.lifecycle.lock().is_cancelled()
    }

    /// Current volume change per dial tick.
    pub fn volume_step(&self) -> i32 {
        self.inner.volume_step.load(Ordering::SeqCst)
    }

    /// Activates the surface.
    ///
    /// Binds the session when the settings name an address or device,
    /// renders once and starts the recurring refresh. Reactivating restarts
    /// the timer.
    pub async fn activate<S: TaskSpawner>(&self, spawner: &S, settings: SurfaceSettings) {
        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.inner.lifecycle.lock(), token.clone());
        previous.cancel();

        log::info!("[Surface] Activating {}", self.inner.kind);
        self.inner.reconciler.reset().await;
        self.inner.apply_settings(&settings).await;
        self.inner.refresh(&token, None).await;

        if self.inner.kind.has_timer() {
            let inner = Arc::clone(&self.inner);
            spawner.spawn(async move { inner.run_timer(token).await });
        }
    }

    /// Runs a command from the host, then re-renders.
    pub async fn command(&self, command: SurfaceCommand) {
        let token = self.inner.current_token();
        self.inner.handle(&token, command).await;
    }

    /// Runs one recurring refresh. Skipped if the previous one is still running.
    pub async fn tick(&self) {
        let token = self.inner.current_token();
        self.inner.tick(&token).await;
    }

    /// Stops the timer and discards results still in flight.
    pub fn deactivate(&self) {
        self.inner.lifecycle.lock().cancel();
        log::info!("[Surface] Deactivated {}", self.inner.kind);
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.inner.lifecycle.lock().cancel();
    }
}

impl SurfaceInner {
    fn current_token(&self) -> CancellationToken {
        self.lifecycle.lock().clone()
    }

    async fn apply_settings(&self, settings: &SurfaceSettings) {
        let step = settings
            .volume_step
            .map_or(self.default_step, |s| s.clamp(1, MAX_VOLUME_STEP));
        self.volume_step.store(step, Ordering::SeqCst);

        if settings.ip_address.is_some() || settings.device_uuid.is_some() {
            self.session
                .initialize(
                    settings.ip_address.as_deref(),
                    settings.device_uuid.as_deref(),
                )
                .await
                .succeeded("initialize");
        }
    }

    async fn run_timer(&self, token: CancellationToken) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => self.tick(&token).await,
            }
        }
        log::debug!("[Surface] Timer stopped for {}", self.kind);
    }

    async fn tick(&self, token: &CancellationToken) {
        let Ok(_guard) = self.ticking.try_lock() else {
            log::debug!("[Surface] Previous {} refresh still running, skipping", self.kind);
            return;
        };
        self.refresh(token, None).await;
    }

    /// Renders only while `token` is live.
    fn render(&self, token: &CancellationToken, draw: impl FnOnce(&dyn SurfaceDisplay)) {
        if token.is_cancelled() {
            log::trace!("[Surface] Dropping render for inactive {}", self.kind);
            return;
        }
        draw(self.display.as_ref());
    }

    fn acknowledge(&self, token: &CancellationToken, ok: bool) {
        self.render(token, |d| if ok { d.show_ok() } else { d.show_alert() });
    }

    async fn refresh(&self, token: &CancellationToken, known_volume: Option<u8>) {
        match self.kind {
            SurfaceKind::PlayPause => {
                let view = self.reconciler.reconcile_playback().await;
                self.render(token, |d| {
                    d.set_state(view.display_state());
                    d.set_image(view.image.as_deref());
                });
            }
            SurfaceKind::Shuffle => {
                let enabled = self.session.shuffle_enabled().await.or_neutral("shuffle state");
                self.render(token, |d| d.set_state(u8::from(enabled)));
            }
            SurfaceKind::VolumeDial => {
                let view = self.reconciler.volume_view(known_volume).await;
                let feedback = VolumeFeedback::new(self.session.device_name(), view);
                self.render(token, |d| d.set_feedback(&feedback));
            }
            SurfaceKind::NextTrack | SurfaceKind::PreviousTrack => {}
        }
    }

    async fn handle(&self, token: &CancellationToken, command: SurfaceCommand) {
        log::debug!("[Surface] {} <- {:?}", self.kind, command);

        match (self.kind, command) {
            (_, SurfaceCommand::Discover) => self.send_device_list(token).await,
            (SurfaceKind::PlayPause, SurfaceCommand::Press) => {
                let ok = self.session.toggle_play_pause().await.succeeded("toggle play/pause");
                self.acknowledge(token, ok);
                self.refresh(token, None).await;
            }
            (SurfaceKind::NextTrack, SurfaceCommand::Press) => {
                let ok = self.session.next_track().await.succeeded("next track");
                self.acknowledge(token, ok);
            }
            (SurfaceKind::PreviousTrack, SurfaceCommand::Press) => {
                let ok = self.session.previous_track().await.succeeded("previous track");
                self.acknowledge(token, ok);
            }
            (SurfaceKind::Shuffle, SurfaceCommand::Press) => {
                let ok = self.session.toggle_shuffle().await.succeeded("toggle shuffle");
                self.acknowledge(token, ok);
                self.refresh(token, None).await;
            }
            (SurfaceKind::VolumeDial, SurfaceCommand::Rotate(ticks)) => {
                let delta = ticks.saturating_mul(self.volume_step.load(Ordering::SeqCst));
                match self.session.adjust_volume(delta).await.ok_logged("adjust volume") {
                    Some(volume) => self.refresh(token, Some(volume)).await,
                    None => self.acknowledge(token, false),
                }
            }
            (SurfaceKind::VolumeDial, SurfaceCommand::DialPress) => {
                if !self.session.toggle_mute().await.succeeded("toggle mute") {
                    self.acknowledge(token, false);
                }
                self.refresh(token, None).await;
            }
            (SurfaceKind::VolumeDial, SurfaceCommand::TouchTap) => {
                if !self.session.toggle_play_pause().await.succeeded("toggle play/pause") {
                    self.acknowledge(token, false);
                }
            }
            (kind, command) => {
                log::debug!("[Surface] {} ignores {:?}", kind, command);
            }
        }
    }

    async fn send_device_list(&self, token: &CancellationToken) {
        let devices = self.session.discover().await.or_neutral("discover");
        let selected = self.session.active_device().map(|d| d.uuid().to_string());
        log::info!("[Surface] Device list: {} device(s)", devices.len());

        let payload = DeviceListPayload::new(devices, selected);
        self.render(token, |d| d.send_device_list(&payload));
    }
}
