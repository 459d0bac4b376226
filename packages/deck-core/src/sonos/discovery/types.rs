//! Shared types for Sonos device discovery.
//!
//! Raw mDNS answers are captured as [`MdnsRecord`] so the filtering and
//! naming rules can be tested without a live daemon.

use std::collections::HashSet;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Room name used when neither TXT data nor the instance name carry one.
pub const UNKNOWN_ROOM: &str = "Unknown";

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// mDNS daemon error.
    #[error("mDNS daemon error: {0}")]
    MdnsDaemon(String),
}

/// Convenient Result alias for device discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// A Sonos speaker found on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDevice {
    /// Canonical UUID (RINCON_xxx).
    pub uuid: String,
    /// Room name, suffixed with the model when enrichment succeeded.
    pub name: String,
    /// IPv4 address of the speaker.
    pub ip: String,
    /// Model name from the device description (e.g. "Sonos One").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DiscoveredDevice {
    /// Applies a model name: sets `model` and renders the name as `"room (model)"`.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.name = format!("{} ({})", self.name, model);
        self.model = Some(model);
        self
    }
}

/// A resolved `_sonos._tcp` service, reduced to the fields discovery uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdnsRecord {
    /// Full service instance name, e.g. `RINCON_xxx@Kitchen._sonos._tcp.local.`
    pub fullname: String,
    /// Target host name from the SRV answer.
    pub host: String,
    /// Addresses from A/AAAA answers in arrival order.
    pub addresses: Vec<IpAddr>,
    /// `roomname` TXT property.
    pub room_name: Option<String>,
    /// `uuid` TXT property.
    pub uuid: Option<String>,
}

impl MdnsRecord {
    /// Turns the record into a descriptor.
    ///
    /// Returns `None` when no UUID can be derived or no IPv4 address was
    /// announced; such candidates are dropped silently.
    pub fn to_device(&self) -> Option<DiscoveredDevice> {
        let uuid = self
            .uuid
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| extract_uuid_from_name(&self.fullname))
            .or_else(|| extract_uuid_from_name(&self.host))?;

        let ip = self.addresses.iter().find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4.to_string()),
            IpAddr::V6(_) => None,
        })?;

        let name = self
            .room_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| room_from_instance_name(&self.fullname))
            .unwrap_or_else(|| UNKNOWN_ROOM.to_string());

        Some(DiscoveredDevice {
            uuid,
            name,
            ip,
            model: None,
        })
    }
}

/// Extracts a RINCON UUID from an mDNS service name or hostname.
///
/// Handles various formats:
/// - `RINCON_xxx@Kitchen._sonos._tcp.local.`
/// - `RINCON_xxx.local.`
/// - `Sonos-RINCON_xxx._sonos._tcp.local.`
pub fn extract_uuid_from_name(name: &str) -> Option<String> {
    let start = name.find("RINCON_")?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(rest.len());
    let uuid = &rest[..end];

    // "RINCON_" alone is 7 chars
    (uuid.len() > 7).then(|| uuid.to_string())
}

/// Returns the room part of an instance name (`uuid@Room._sonos._tcp.local.`).
fn room_from_instance_name(fullname: &str) -> Option<String> {
    let instance = fullname
        .find("._sonos.")
        .map_or(fullname, |end| &fullname[..end]);
    let (_, room) = instance.split_once('@')?;
    let room = room.trim();
    (!room.is_empty()).then(|| room.to_string())
}

/// Converts raw records to descriptors, keeping the first record per UUID.
///
/// Records without a UUID or IPv4 address are dropped before deduplication,
/// so they never shadow a later usable record for the same speaker.
pub fn dedup_first_seen(records: &[MdnsRecord]) -> Vec<DiscoveredDevice> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(MdnsRecord::to_device)
        .filter(|device| seen.insert(device.uuid.clone()))
        .collect()
}
