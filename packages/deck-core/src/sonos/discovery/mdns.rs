//! mDNS/Bonjour-based Sonos device discovery.
//!
//! Uses DNS-SD to browse for `_sonos._tcp.local.` services.
//!
//! # Key Design Points
//!
//! - Uses resolved record data (IP from A answers) as primary, not string parsing
//! - The browse window is a hard deadline regardless of how many speakers answer
//! - Calls `stop_browse()` after the window to avoid accumulating daemon work
//! - Isolated in this module for forward compatibility (mdns-sd may deprecate `ServiceResolved`)

use std::sync::Arc;
use std::time::{Duration, Instant};

use mdns_sd::{ResolvedService, ServiceDaemon, ServiceEvent};
use tokio::time::timeout;

use super::types::{DiscoveryError, MdnsRecord};

/// Browses for a service type and collects resolved records in arrival order.
///
/// # Arguments
///
/// * `daemon` - Shared mDNS service daemon (reused across discovery calls)
/// * `service_type` - Fully qualified service type, e.g. `_sonos._tcp.local.`
/// * `window` - How long to collect answers
pub async fn browse(
    daemon: &Arc<ServiceDaemon>,
    service_type: &str,
    window: Duration,
) -> Result<Vec<MdnsRecord>, DiscoveryError> {
    log::debug!(
        "[mDNS] Browsing {} for {}ms",
        service_type,
        window.as_millis()
    );

    let receiver = daemon
        .browse(service_type)
        .map_err(|e| DiscoveryError::MdnsDaemon(e.to_string()))?;

    let mut records = Vec::new();
    let start = Instant::now();

    while start.elapsed() < window {
        let remaining = window.saturating_sub(start.elapsed());

        match timeout(remaining, receiver.recv_async()).await {
            Ok(Ok(ServiceEvent::ServiceResolved(info))) => {
                log::trace!("[mDNS] Service resolved: {:?}", info.fullname);
                records.push(record_from_service(&info));
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                log::debug!("[mDNS] Receiver channel closed: {:?}", e);
                break;
            }
            // Window elapsed - normal termination
            Err(_) => break,
        }
    }

    if let Err(e) = daemon.stop_browse(service_type) {
        log::warn!("[mDNS] Failed to stop browse: {:?}", e);
    }

    log::debug!("[mDNS] Browse complete: {} record(s)", records.len());
    Ok(records)
}

fn record_from_service(info: &ResolvedService) -> MdnsRecord {
    let txt = |key: &str| {
        info.txt_properties
            .get_property_val_str(key)
            .map(str::to_string)
    };

    MdnsRecord {
        fullname: info.fullname.clone(),
        host: info.host.clone(),
        addresses: info.addresses.iter().map(|addr| addr.to_ip_addr()).collect(),
        room_name: txt("roomname"),
        uuid: txt("uuid"),
    }
}

/// Creates a new mDNS service daemon.
///
/// This should be called once and the daemon reused across discovery calls.
/// The daemon spawns a background thread for mDNS operations.
pub fn create_daemon() -> Result<ServiceDaemon, DiscoveryError> {
    ServiceDaemon::new().map_err(|e| DiscoveryError::MdnsDaemon(e.to_string()))
}
