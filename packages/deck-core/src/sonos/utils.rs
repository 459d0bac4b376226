//! XML and URL helpers shared by the SOAP, topology and discovery modules.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::protocol_constants::SONOS_PORT;

// ─────────────────────────────────────────────────────────────────────────────
// XML Parsing Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the entity-decoded text of the first element named `element_name`.
///
/// Matches on local name, so `u:CurrentVolume` is found as `CurrentVolume`.
pub fn extract_xml_text(xml: &str, element_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == element_name.as_bytes() => {
                let text = reader.read_text(e.name()).ok()?;
                return Some(html_escape::decode_html_entities(&text).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Like [`extract_xml_text`], but treats empty and whitespace-only content as absent.
pub fn extract_non_empty_xml_text(xml: &str, element_name: &str) -> Option<String> {
    extract_xml_text(xml, element_name)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Returns attribute `attr_name` of `elem`, lossily decoded.
pub fn get_xml_attr(elem: &BytesStart, attr_name: &[u8]) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == attr_name)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// XML Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes the five XML special characters for use in element content.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ─────────────────────────────────────────────────────────────────────────────
// URL Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a URL on the speaker's control port.
pub fn build_sonos_url(ip: &str, endpoint: &str) -> String {
    format!("http://{}:{}{}", ip, SONOS_PORT, endpoint)
}

/// Extracts the host portion from a UPnP Location URL.
///
/// # Example
/// ```ignore
/// let ip = extract_ip_from_location("http://192.168.1.100:1400/xml/device_desc.xml");
/// assert_eq!(ip, Some("192.168.1.100".to_string()));
/// ```
pub fn extract_ip_from_location(location: &str) -> Option<String> {
    let stripped = location.strip_prefix("http://")?;
    let host_end = stripped.find(':')?;
    Some(stripped[..host_end].to_string())
}

/// Resolves album art references returned by the speaker.
///
/// Sonos reports art for local and streamed content as a path on the speaker
/// itself (`/getaa?s=1&u=...`); absolute URLs are passed through.
pub fn absolute_art_url(ip: &str, art: &str) -> String {
    if art.starts_with('/') {
        build_sonos_url(ip, art)
    } else {
        art.to_string()
    }
}
