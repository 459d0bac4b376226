//! Volume and mute control for a single Sonos speaker.
//!
//! All operations use the RenderingControl service on the `Master` channel,
//! so they act on the bound speaker regardless of its group membership.

use std::time::Duration;

use reqwest::Client;

use crate::protocol_constants::{MASTER_CHANNEL, MAX_VOLUME};
use crate::sonos::services::SonosService;
use crate::sonos::soap::{SoapError, SoapRequestBuilder, SoapResult};
use crate::sonos::utils::extract_xml_text;

// ─────────────────────────────────────────────────────────────────────────────
// Request Builders
// ─────────────────────────────────────────────────────────────────────────────

fn rendering_request<'a>(
    client: &'a Client,
    ip: &'a str,
    action: &'a str,
    timeout: Duration,
) -> SoapRequestBuilder<'a> {
    SoapRequestBuilder::new(client, ip)
        .service(SonosService::RenderingControl)
        .action(action)
        .instance_id()
        .arg("Channel", MASTER_CHANNEL)
        .timeout(timeout)
}

fn set_volume_request<'a>(
    client: &'a Client,
    ip: &'a str,
    volume: u8,
    timeout: Duration,
) -> SoapRequestBuilder<'a> {
    rendering_request(client, ip, "SetVolume", timeout)
        .arg("DesiredVolume", volume.min(MAX_VOLUME).to_string())
}

fn set_mute_request<'a>(
    client: &'a Client,
    ip: &'a str,
    mute: bool,
    timeout: Duration,
) -> SoapRequestBuilder<'a> {
    rendering_request(client, ip, "SetMute", timeout).arg("DesiredMute", if mute { "1" } else { "0" })
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Parsing
// ─────────────────────────────────────────────────────────────────────────────

fn parse_volume(response: &str) -> SoapResult<u8> {
    extract_xml_text(response, "CurrentVolume")
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v.min(MAX_VOLUME))
        .ok_or(SoapError::Parse)
}

fn parse_mute(response: &str) -> SoapResult<bool> {
    extract_xml_text(response, "CurrentMute")
        .map(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true")
        })
        .ok_or(SoapError::Parse)
}

// ─────────────────────────────────────────────────────────────────────────────
// Volume
// ─────────────────────────────────────────────────────────────────────────────

/// Gets the speaker volume (0-100).
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `ip` - IP address of the speaker
/// * `timeout` - Upper bound for the request
pub async fn get_volume(client: &Client, ip: &str, timeout: Duration) -> SoapResult<u8> {
    let response = rendering_request(client, ip, "GetVolume", timeout)
        .send()
        .await?;
    parse_volume(&response)
}

/// Sets the speaker volume (0-100, values above 100 are clamped).
pub async fn set_volume(client: &Client, ip: &str, volume: u8, timeout: Duration) -> SoapResult<()> {
    set_volume_request(client, ip, volume, timeout).send().await?;
    log::debug!("[Sonos] {} volume set to {}", ip, volume.min(MAX_VOLUME));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Mute
// ─────────────────────────────────────────────────────────────────────────────

/// Gets the speaker mute state.
///
/// # Returns
/// `true` if the speaker is muted, `false` otherwise
pub async fn get_mute(client: &Client, ip: &str, timeout: Duration) -> SoapResult<bool> {
    let response = rendering_request(client, ip, "GetMute", timeout)
        .send()
        .await?;
    parse_mute(&response)
}

/// Sets the speaker mute state.
pub async fn set_mute(client: &Client, ip: &str, mute: bool, timeout: Duration) -> SoapResult<()> {
    set_mute_request(client, ip, mute, timeout).send().await?;
    log::debug!("[Sonos] {} mute set to {}", ip, mute);
    Ok(())
}
