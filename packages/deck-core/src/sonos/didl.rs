//! DIDL-Lite metadata parsing for the currently loaded track.
//!
//! Sonos reports track details as an escaped DIDL-Lite document inside the
//! `TrackMetaData` field of `GetPositionInfo`. Only the display fields are
//! read: title, creator, album, album art and the resource URI.

use crate::sonos::types::TrackMetadata;
use crate::sonos::utils::{absolute_art_url, extract_non_empty_xml_text};

/// Placeholder Sonos uses for fields a source doesn't implement.
const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";

/// Parses a decoded DIDL-Lite document into track metadata.
///
/// # Arguments
/// * `didl` - The DIDL-Lite XML (already unescaped from the SOAP response)
/// * `ip` - Speaker address, used to resolve speaker-relative album art paths
///
/// # Returns
/// `None` when the document is empty or a `NOT_IMPLEMENTED` placeholder.
pub(crate) fn parse_didl_track(didl: &str, ip: &str) -> Option<TrackMetadata> {
    let didl = didl.trim();
    if didl.is_empty() || didl == NOT_IMPLEMENTED {
        return None;
    }

    let field = |name: &str| {
        extract_non_empty_xml_text(didl, name).filter(|value| value != NOT_IMPLEMENTED)
    };

    let track = TrackMetadata {
        track_uri: field("res"),
        title: field("title"),
        artist: field("creator"),
        album: field("album"),
        album_art_url: field("albumArtURI").map(|art| absolute_art_url(ip, &art)),
    };

    log::trace!("[DIDL] Parsed track: {:?}", track);
    Some(track)
}
