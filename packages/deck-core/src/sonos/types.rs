//! Domain types for Sonos transport, play mode, track and topology data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Transport State
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state reported by AVTransport `GetTransportInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportState {
    Playing,
    Paused,
    Stopped,
    Transitioning,
}

impl TransportState {
    /// Returns the categorical name used at the surface boundary.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
            Self::Transitioning => "TRANSITIONING",
        }
    }

    /// Returns true while the speaker is producing (or about to produce) audio.
    ///
    /// Display state treats `Transitioning` like `Playing`, so a track skip
    /// doesn't flash the inactive artwork.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Transitioning)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a categorical value from the speaker isn't recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value: {0}")]
pub struct UnknownValue(pub String);

impl FromStr for TransportState {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PLAYING" => Ok(Self::Playing),
            // Sonos reports PAUSED_PLAYBACK; plain PAUSED is accepted too
            "PAUSED_PLAYBACK" | "PAUSED" => Ok(Self::Paused),
            "STOPPED" | "NO_MEDIA_PRESENT" => Ok(Self::Stopped),
            "TRANSITIONING" => Ok(Self::Transitioning),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Play Mode
// ─────────────────────────────────────────────────────────────────────────────

/// AVTransport play mode: a repeat component combined with a shuffle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayMode {
    Normal,
    RepeatAll,
    RepeatOne,
    ShuffleNorepeat,
    Shuffle,
    ShuffleRepeatOne,
}

/// Shuffle toggling pairs, `(unshuffled, shuffled)` for each repeat class.
///
/// Toggling looks a mode up on either side and returns its partner, so
/// toggling twice always returns to the starting mode.
const SHUFFLE_PAIRS: [(PlayMode, PlayMode); 3] = [
    (PlayMode::Normal, PlayMode::ShuffleNorepeat),
    (PlayMode::RepeatAll, PlayMode::Shuffle),
    (PlayMode::RepeatOne, PlayMode::ShuffleRepeatOne),
];

impl PlayMode {
    /// All play modes in protocol order.
    pub const ALL: [PlayMode; 6] = [
        PlayMode::Normal,
        PlayMode::RepeatAll,
        PlayMode::RepeatOne,
        PlayMode::ShuffleNorepeat,
        PlayMode::Shuffle,
        PlayMode::ShuffleRepeatOne,
    ];

    /// Returns the protocol string sent in `SetPlayMode`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::RepeatAll => "REPEAT_ALL",
            Self::RepeatOne => "REPEAT_ONE",
            Self::ShuffleNorepeat => "SHUFFLE_NOREPEAT",
            Self::Shuffle => "SHUFFLE",
            Self::ShuffleRepeatOne => "SHUFFLE_REPEAT_ONE",
        }
    }

    /// Returns true if the shuffle component is on.
    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        SHUFFLE_PAIRS.iter().any(|(_, shuffled)| shuffled == self)
    }

    /// Flips the shuffle component while keeping the repeat component.
    #[must_use]
    pub fn toggle_shuffle(self) -> Self {
        SHUFFLE_PAIRS
            .iter()
            .find_map(|&(plain, shuffled)| {
                if plain == self {
                    Some(shuffled)
                } else if shuffled == self {
                    Some(plain)
                } else {
                    None
                }
            })
            .unwrap_or(self)
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayMode {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Track Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata for the track currently loaded on the speaker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub track_uri: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Absolute URL of the cover art, if the source provides one.
    pub album_art_url: Option<String>,
}

impl TrackMetadata {
    /// Returns the value used to detect track changes.
    ///
    /// The track URI is authoritative; sources that omit it (some radio
    /// streams) fall back to the title/artist pair.
    #[must_use]
    pub fn identity(&self) -> Option<String> {
        if let Some(uri) = &self.track_uri {
            return Some(uri.clone());
        }
        match (&self.title, &self.artist) {
            (None, None) => None,
            (title, artist) => Some(format!(
                "{}\u{1f}{}",
                title.as_deref().unwrap_or_default(),
                artist.as_deref().unwrap_or_default()
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Topology
// ─────────────────────────────────────────────────────────────────────────────

/// A playable speaker reported by `GetZoneGroupState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMember {
    /// Unique identifier (RINCON_xxx format).
    pub uuid: String,
    /// Local IP address.
    pub ip: String,
    /// User-configured room name.
    pub zone_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_state_parses_sonos_values() {
        assert_eq!("PLAYING".parse(), Ok(TransportState::Playing));
        assert_eq!("PAUSED_PLAYBACK".parse(), Ok(TransportState::Paused));
        assert_eq!("STOPPED".parse(), Ok(TransportState::Stopped));
        assert_eq!("NO_MEDIA_PRESENT".parse(), Ok(TransportState::Stopped));
        assert_eq!("TRANSITIONING".parse(), Ok(TransportState::Transitioning));
        assert!("RECORDING".parse::<TransportState>().is_err());
    }

    #[test]
    fn transport_state_activity_classes() {
        assert!(TransportState::Playing.is_active());
        assert!(TransportState::Transitioning.is_active());
        assert!(!TransportState::Paused.is_active());
        assert!(!TransportState::Stopped.is_active());
    }

    #[test]
    fn play_mode_round_trips_protocol_strings() {
        for mode in PlayMode::ALL {
            assert_eq!(mode.as_str().parse::<PlayMode>(), Ok(mode));
        }
        assert_eq!(
            "SHUFFLE_SOMETIMES".parse::<PlayMode>(),
            Err(UnknownValue("SHUFFLE_SOMETIMES".to_string()))
        );
    }

    #[test]
    fn toggle_shuffle_keeps_repeat_component() {
        assert_eq!(PlayMode::Normal.toggle_shuffle(), PlayMode::ShuffleNorepeat);
        assert_eq!(PlayMode::RepeatAll.toggle_shuffle(), PlayMode::Shuffle);
        assert_eq!(PlayMode::RepeatOne.toggle_shuffle(), PlayMode::ShuffleRepeatOne);
        assert_eq!(PlayMode::Shuffle.toggle_shuffle(), PlayMode::RepeatAll);
    }

    #[test]
    fn toggle_shuffle_is_an_involution() {
        for mode in PlayMode::ALL {
            assert_eq!(mode.toggle_shuffle().toggle_shuffle(), mode);
            assert_ne!(mode.toggle_shuffle().is_shuffle(), mode.is_shuffle());
        }
    }

    #[test]
    fn shuffle_detection_matches_mode_names() {
        for mode in PlayMode::ALL {
            assert_eq!(mode.is_shuffle(), mode.as_str().contains("SHUFFLE"));
        }
    }

    #[test]
    fn track_identity_prefers_uri() {
        let track = TrackMetadata {
            track_uri: Some("x-sonos-spotify:track1".to_string()),
            title: Some("Song".to_string()),
            ..Default::default()
        };
        assert_eq!(track.identity().as_deref(), Some("x-sonos-spotify:track1"));

        let radio = TrackMetadata {
            title: Some("Song".to_string()),
            artist: Some("Band".to_string()),
            ..Default::default()
        };
        assert!(radio.identity().is_some());
        assert_eq!(TrackMetadata::default().identity(), None);
    }
}
