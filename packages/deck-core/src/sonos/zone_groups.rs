//! Zone group topology parsing and retrieval.
//!
//! Binding to a speaker starts with `GetZoneGroupState` against its address:
//! the answer lists every playable speaker in the household, which becomes
//! the session's device registry.

use std::collections::HashSet;
use std::time::Duration;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::Client;

use crate::sonos::services::SonosService;
use crate::sonos::soap::{SoapRequestBuilder, SoapResult};
use crate::sonos::types::ZoneMember;
use crate::sonos::utils::{extract_ip_from_location, extract_xml_text, get_xml_attr};

/// Parses ZoneGroupState XML into the list of playable speakers.
///
/// Expects the raw ZoneGroupState XML (already unescaped).
///
/// # Filtering
/// - Zone Bridges (BOOST devices with `IsZoneBridge="1"`) are skipped as
///   they cannot play audio.
/// - Members without a UUID, a parseable `Location` or a `ZoneName` are skipped.
/// - A UUID listed twice (e.g. as member and satellite) is kept once.
///
/// Members are returned in document order.
pub fn parse_zone_group_xml(xml: &str) -> Vec<ZoneMember> {
    let mut members = Vec::new();
    let mut seen = HashSet::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if matches!(e.name().as_ref(), b"ZoneGroupMember" | b"Satellite") =>
            {
                // Zone Bridges can't play audio
                let is_bridge = get_xml_attr(e, b"IsZoneBridge").as_deref() == Some("1");
                if let Some(member) = parse_member(e).filter(|_| !is_bridge) {
                    if seen.insert(member.uuid.clone()) {
                        members.push(member);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("[Sonos] XML parse error in zone groups: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    members
}

fn parse_member(e: &BytesStart) -> Option<ZoneMember> {
    let uuid = get_xml_attr(e, b"UUID")?;
    let location = get_xml_attr(e, b"Location")?;
    let ip = extract_ip_from_location(&location)?;
    let zone_name = get_xml_attr(e, b"ZoneName")?;
    Some(ZoneMember {
        uuid,
        ip,
        zone_name,
    })
}

/// Moves the speaker answering at `ip` to the front, keeping the rest in order.
fn prefer_connected(mut members: Vec<ZoneMember>, ip: &str) -> Vec<ZoneMember> {
    if let Some(pos) = members.iter().position(|m| m.ip == ip) {
        let connected = members.remove(pos);
        members.insert(0, connected);
    }
    members
}

/// Fetches the household topology from a speaker.
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `ip` - IP address of any Sonos speaker on the network
/// * `timeout` - Upper bound for the request
///
/// # Returns
/// Every playable speaker, with the one at `ip` first. An answer without a
/// `ZoneGroupState` yields an empty list.
pub async fn get_zone_members(
    client: &Client,
    ip: &str,
    timeout: Duration,
) -> SoapResult<Vec<ZoneMember>> {
    let response = SoapRequestBuilder::new(client, ip)
        .service(SonosService::ZoneGroupTopology)
        .action("GetZoneGroupState")
        .timeout(timeout)
        .send()
        .await?;

    let Some(decoded_xml) = extract_xml_text(&response, "ZoneGroupState") else {
        return Ok(vec![]);
    };

    let members = prefer_connected(parse_zone_group_xml(&decoded_xml), ip);
    log::debug!("[Sonos] Topology from {}: {} speaker(s)", ip, members.len());
    Ok(members)
}
