//! Transport control commands for Sonos speakers.
//!
//! Provides play/pause toggling, track skipping, play mode control and
//! transport/position queries via AVTransport SOAP actions.

use std::time::Duration;

use reqwest::Client;

use crate::sonos::didl::parse_didl_track;
use crate::sonos::services::SonosService;
use crate::sonos::soap::{SoapError, SoapRequestBuilder, SoapResult};
use crate::sonos::types::{PlayMode, TrackMetadata, TransportState};
use crate::sonos::utils::{extract_non_empty_xml_text, extract_xml_text};

fn transport_request<'a>(
    client: &'a Client,
    ip: &'a str,
    action: &'a str,
    timeout: Duration,
) -> SoapRequestBuilder<'a> {
    SoapRequestBuilder::new(client, ip)
        .service(SonosService::AVTransport)
        .action(action)
        .instance_id()
        .timeout(timeout)
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Sends a Play command to resume playback.
pub async fn play(client: &Client, ip: &str, timeout: Duration) -> SoapResult<()> {
    transport_request(client, ip, "Play", timeout)
        .arg("Speed", "1")
        .send()
        .await?;
    log::info!("[Sonos] Play command succeeded for {}", ip);
    Ok(())
}

/// Pauses playback.
pub async fn pause(client: &Client, ip: &str, timeout: Duration) -> SoapResult<()> {
    transport_request(client, ip, "Pause", timeout).send().await?;
    log::info!("[Sonos] Pause command succeeded for {}", ip);
    Ok(())
}

/// Toggles between playing and paused.
///
/// Reads the current transport state first: a playing or transitioning
/// speaker is paused, anything else is told to play.
///
/// # Returns
/// The state the speaker was commanded into.
pub async fn toggle_playback(
    client: &Client,
    ip: &str,
    timeout: Duration,
) -> SoapResult<TransportState> {
    let current = get_transport_info(client, ip, timeout).await?;
    if current.is_active() {
        pause(client, ip, timeout).await?;
        Ok(TransportState::Paused)
    } else {
        play(client, ip, timeout).await?;
        Ok(TransportState::Playing)
    }
}

/// Skips to the next track in the queue.
pub async fn next(client: &Client, ip: &str, timeout: Duration) -> SoapResult<()> {
    transport_request(client, ip, "Next", timeout).send().await?;
    log::debug!("[Sonos] Next track on {}", ip);
    Ok(())
}

/// Returns to the previous track in the queue.
pub async fn previous(client: &Client, ip: &str, timeout: Duration) -> SoapResult<()> {
    transport_request(client, ip, "Previous", timeout).send().await?;
    log::debug!("[Sonos] Previous track on {}", ip);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Gets the current transport state.
///
/// # Errors
/// Returns `SoapError::Parse` if the state is missing or not one Sonos defines.
pub async fn get_transport_info(
    client: &Client,
    ip: &str,
    timeout: Duration,
) -> SoapResult<TransportState> {
    let response = transport_request(client, ip, "GetTransportInfo", timeout)
        .send()
        .await?;
    parse_transport_state(&response)
}

fn parse_transport_state(response: &str) -> SoapResult<TransportState> {
    let raw = extract_xml_text(response, "CurrentTransportState").ok_or(SoapError::Parse)?;
    raw.parse().map_err(|e| {
        log::warn!("[Sonos] Unexpected transport state: {}", e);
        SoapError::Parse
    })
}

/// Gets the raw play mode string from `GetTransportSettings`.
///
/// The string is returned unparsed so callers can report modes they don't
/// recognise instead of guessing.
pub async fn get_play_mode(client: &Client, ip: &str, timeout: Duration) -> SoapResult<String> {
    let response = transport_request(client, ip, "GetTransportSettings", timeout)
        .send()
        .await?;
    extract_xml_text(&response, "PlayMode")
        .map(|mode| mode.trim().to_string())
        .ok_or(SoapError::Parse)
}

/// Sets the play mode (shuffle/repeat combination).
pub async fn set_play_mode(
    client: &Client,
    ip: &str,
    mode: PlayMode,
    timeout: Duration,
) -> SoapResult<()> {
    transport_request(client, ip, "SetPlayMode", timeout)
        .arg("NewPlayMode", mode.as_str())
        .send()
        .await?;
    log::info!("[Sonos] {} play mode set to {}", ip, mode);
    Ok(())
}

/// Gets metadata for the currently loaded track.
///
/// # Returns
/// `None` when the speaker reports no track metadata (empty queue, line-in
/// without a source).
pub async fn get_position_info(
    client: &Client,
    ip: &str,
    timeout: Duration,
) -> SoapResult<Option<TrackMetadata>> {
    let response = transport_request(client, ip, "GetPositionInfo", timeout)
        .send()
        .await?;
    Ok(parse_position_info(&response, ip))
}

fn parse_position_info(response: &str, ip: &str) -> Option<TrackMetadata> {
    let didl = extract_non_empty_xml_text(response, "TrackMetaData")?;
    let mut track = parse_didl_track(&didl, ip)?;

    // TrackURI identifies the queue entry; the DIDL resource is only a fallback
    if let Some(uri) = extract_non_empty_xml_text(response, "TrackURI") {
        track.track_uri = Some(uri);
    }
    Some(track)
}
