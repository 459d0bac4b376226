//! Per-surface state reconciliation.
//!
//! Each surface owns a [`StateReconciler`] and runs it on its recurring tick
//! and after every command. The reconciler reads state through the shared
//! [`SessionManager`] and keeps a [`PlaybackSnapshot`] so unchanged tracks
//! never trigger another artwork download.

use std::sync::Arc;

use serde::Serialize;

use crate::artwork::{ArtworkFetcher, CachedArtwork};
use crate::error::SessionResultExt;
use crate::session::SessionManager;
use crate::sonos::types::{TrackMetadata, TransportState};

/// Last-observed playback fingerprint for one surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    track_identity: Option<String>,
    active: bool,
    artwork: Option<CachedArtwork>,
}

impl PlaybackSnapshot {
    pub fn track_identity(&self) -> Option<&str> {
        self.track_identity.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn artwork(&self) -> Option<&CachedArtwork> {
        self.artwork.as_ref()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Playback state as rendered by a play/pause surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackView {
    pub state: TransportState,
    /// Encoded cover art, if the current track has any.
    pub image: Option<String>,
}

impl PlaybackView {
    /// Key state index: 1 while playing, 0 otherwise.
    pub fn display_state(&self) -> u8 {
        u8::from(self.state == TransportState::Playing)
    }
}

/// Volume state as rendered by a dial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VolumeView {
    pub volume: u8,
    pub muted: bool,
}

/// Converges a surface's displayed state with the speaker.
pub struct StateReconciler {
    session: Arc<SessionManager>,
    artwork: Arc<dyn ArtworkFetcher>,
    snapshot: tokio::sync::Mutex<PlaybackSnapshot>,
}

impl StateReconciler {
    pub fn new(session: Arc<SessionManager>, artwork: Arc<dyn ArtworkFetcher>) -> Self {
        Self {
            session,
            artwork,
            snapshot: tokio::sync::Mutex::new(PlaybackSnapshot::default()),
        }
    }

    /// Returns a copy of the current snapshot.
    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.lock().await.clone()
    }

    /// Forgets everything observed so far.
    pub async fn reset(&self) {
        self.snapshot.lock().await.clear();
    }

    /// Reads playback state and updates the snapshot.
    ///
    /// Inactive playback clears the track identity and artwork. Active
    /// playback reads the track; a new identity drops the cached artwork and
    /// a new art URL is downloaded once. A failed read leaves the snapshot
    /// untouched.
    pub async fn reconcile_playback(&self) -> PlaybackView {
        let mut snapshot = self.snapshot.lock().await;

        let Some(state) = self.session.play_state().await.ok_logged("play state") else {
            return PlaybackView {
                state: TransportState::Stopped,
                image: None,
            };
        };

        if !state.is_active() {
            if snapshot.track_identity.is_some() || snapshot.artwork.is_some() {
                log::debug!("[Reconcile] Playback {}, clearing track and artwork", state);
            }
            snapshot.clear();
            return PlaybackView { state, image: None };
        }

        snapshot.active = true;
        match self.session.current_track().await.ok_logged("current track") {
            Some(track) => {
                self.observe_track(&mut snapshot, track.as_ref());
                if let Some(url) = track.as_ref().and_then(|t| t.album_art_url.as_deref()) {
                    self.ensure_artwork(&mut snapshot, url).await;
                }
            }
            None => log::debug!("[Reconcile] Track unreadable, keeping cached artwork"),
        }

        PlaybackView {
            state,
            image: snapshot.artwork.as_ref().map(|a| a.data_url.clone()),
        }
    }

    fn observe_track(&self, snapshot: &mut PlaybackSnapshot, track: Option<&TrackMetadata>) {
        let identity = track.and_then(TrackMetadata::identity);
        if identity != snapshot.track_identity {
            log::debug!(
                "[Reconcile] Track changed: {:?} -> {:?}",
                snapshot.track_identity,
                identity
            );
            snapshot.track_identity = identity;
            snapshot.artwork = None;
        }
    }

    async fn ensure_artwork(&self, snapshot: &mut PlaybackSnapshot, url: &str) {
        if snapshot.artwork.as_ref().is_some_and(|a| a.is_for(url)) {
            return;
        }

        match self.artwork.fetch(url).await {
            Ok(data_url) => {
                snapshot.artwork = Some(CachedArtwork {
                    source_url: url.to_string(),
                    data_url,
                });
            }
            Err(e) => {
                log::warn!("[Reconcile] Artwork unavailable for {}: {}", url, e);
                snapshot.artwork = None;
            }
        }
    }

    /// Reads volume and mute.
    ///
    /// `known_volume` is the value a volume command just returned; passing it
    /// saves the volume read.
    pub async fn volume_view(&self, known_volume: Option<u8>) -> VolumeView {
        let volume = match known_volume {
            Some(volume) => volume,
            None => self.session.volume().await.or_neutral("volume"),
        };
        let muted = self.session.is_muted().await.or_neutral("mute state");
        VolumeView { volume, muted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{track, MockArtworkFetcher, MockSonosClient};
    use std::sync::atomic::Ordering;

    const ART_A: &str = "http://192.168.1.10:1400/getaa?s=1&u=a";
    const ART_B: &str = "http://192.168.1.10:1400/getaa?s=1&u=b";

    struct Fixture {
        mock: Arc<MockSonosClient>,
        fetcher: Arc<MockArtworkFetcher>,
        reconciler: StateReconciler,
    }

    fn fixture_with(fetcher: MockArtworkFetcher) -> Fixture {
        let mock = Arc::new(MockSonosClient::household());
        {
            let mut state = mock.state.lock();
            state.transport = TransportState::Playing;
            state.track = Some(track("x-sonos:a", Some(ART_A)));
        }
        let fetcher = Arc::new(fetcher);
        let session = Arc::new(SessionManager::new(mock.clone()));
        let reconciler = StateReconciler::new(session, fetcher.clone());
        Fixture {
            mock,
            fetcher,
            reconciler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockArtworkFetcher::default())
    }

    fn fetches(f: &Fixture) -> usize {
        f.fetcher.fetches.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn unchanged_track_fetches_artwork_once() {
        let f = fixture();

        for _ in 0..5 {
            let view = f.reconciler.reconcile_playback().await;
            assert_eq!(view.display_state(), 1);
            assert_eq!(
                view.image.as_deref(),
                Some(format!("data:image/jpeg;base64,{}", ART_A).as_str())
            );
        }

        assert_eq!(fetches(&f), 1);
    }

    #[tokio::test]
    async fn pause_clears_identity_and_artwork() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;
        assert_eq!(f.reconciler.snapshot().await.track_identity(), Some("x-sonos:a"));

        f.mock.state.lock().transport = TransportState::Paused;
        let view = f.reconciler.reconcile_playback().await;

        assert_eq!(view.state, TransportState::Paused);
        assert_eq!(view.display_state(), 0);
        assert!(view.image.is_none());
        let snapshot = f.reconciler.snapshot().await;
        assert!(snapshot.track_identity().is_none());
        assert!(snapshot.artwork().is_none());
        assert!(!snapshot.is_active());
    }

    #[tokio::test]
    async fn resuming_after_pause_refetches() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;
        f.mock.state.lock().transport = TransportState::Stopped;
        f.reconciler.reconcile_playback().await;
        f.mock.state.lock().transport = TransportState::Playing;

        f.reconciler.reconcile_playback().await;

        assert_eq!(fetches(&f), 2);
    }

    #[tokio::test]
    async fn track_change_refetches_new_art() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;

        f.mock.state.lock().track = Some(track("x-sonos:b", Some(ART_B)));
        let view = f.reconciler.reconcile_playback().await;
        f.reconciler.reconcile_playback().await;

        assert_eq!(fetches(&f), 2);
        assert!(view.image.is_some_and(|img| img.ends_with(ART_B)));
        let snapshot = f.reconciler.snapshot().await;
        assert_eq!(snapshot.artwork().map(|a| a.source_url.as_str()), Some(ART_B));
    }

    #[tokio::test]
    async fn track_change_without_art_drops_cached_image() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;

        f.mock.state.lock().track = Some(track("x-sonos:radio", None));
        let view = f.reconciler.reconcile_playback().await;

        assert!(view.image.is_none());
        assert_eq!(
            f.reconciler.snapshot().await.track_identity(),
            Some("x-sonos:radio")
        );
    }

    #[tokio::test]
    async fn transitioning_counts_as_active() {
        let f = fixture();
        f.mock.state.lock().transport = TransportState::Transitioning;

        let view = f.reconciler.reconcile_playback().await;

        assert_eq!(view.display_state(), 0);
        assert!(view.image.is_some());
        assert!(f.reconciler.snapshot().await.is_active());
    }

    #[tokio::test]
    async fn fetch_failure_means_no_image() {
        let f = fixture_with(MockArtworkFetcher {
            fail: true,
            ..Default::default()
        });

        let view = f.reconciler.reconcile_playback().await;

        assert_eq!(view.state, TransportState::Playing);
        assert!(view.image.is_none());
        assert_eq!(f.reconciler.snapshot().await.track_identity(), Some("x-sonos:a"));
    }

    #[tokio::test]
    async fn unreachable_speaker_renders_stopped() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;
        f.mock.state.lock().fail_control = true;

        let view = f.reconciler.reconcile_playback().await;

        assert_eq!(view.state, TransportState::Stopped);
        assert!(view.image.is_none());
    }

    #[tokio::test]
    async fn failed_track_read_keeps_cached_artwork() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;

        f.mock.state.lock().fail_metadata = true;
        let view = f.reconciler.reconcile_playback().await;
        assert_eq!(view.state, TransportState::Playing);
        assert!(view.image.as_deref().is_some_and(|img| img.ends_with(ART_A)));
        assert_eq!(f.reconciler.snapshot().await.track_identity(), Some("x-sonos:a"));

        f.mock.state.lock().fail_metadata = false;
        let view = f.reconciler.reconcile_playback().await;
        assert!(view.image.is_some());
        assert_eq!(fetches(&f), 1);
    }

    #[tokio::test]
    async fn speaker_outage_does_not_refetch_on_recovery() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;

        f.mock.state.lock().fail_control = true;
        f.reconciler.reconcile_playback().await;
        f.mock.state.lock().fail_control = false;
        let view = f.reconciler.reconcile_playback().await;

        assert!(view.image.is_some());
        assert_eq!(fetches(&f), 1);
    }

    #[tokio::test]
    async fn volume_view_reads_volume_and_mute() {
        let f = fixture();
        {
            let mut state = f.mock.state.lock();
            state.volume = 42;
            state.muted = true;
        }

        let view = f.reconciler.volume_view(None).await;

        assert_eq!(view, VolumeView { volume: 42, muted: true });
        assert_eq!(MockSonosClient::count(&f.mock.volume_reads), 1);
    }

    #[tokio::test]
    async fn known_volume_skips_read() {
        let f = fixture();

        let view = f.reconciler.volume_view(Some(64)).await;

        assert_eq!(view.volume, 64);
        assert_eq!(MockSonosClient::count(&f.mock.volume_reads), 0);
    }

    #[tokio::test]
    async fn reset_forgets_snapshot() {
        let f = fixture();
        f.reconciler.reconcile_playback().await;

        f.reconciler.reset().await;

        assert_eq!(f.reconciler.snapshot().await, PlaybackSnapshot::default());
    }
}
