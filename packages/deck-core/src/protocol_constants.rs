//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external specifications (UPnP, mDNS, Sonos)
//! or by the contract with the control surface, and changing them would break
//! compatibility with real speakers.

// ─────────────────────────────────────────────────────────────────────────────
// HTTP/SOAP
// ─────────────────────────────────────────────────────────────────────────────

/// Default Sonos speaker control port.
pub const SONOS_PORT: u16 = 1400;

/// Timeout for SOAP HTTP requests (seconds).
///
/// 10 seconds is reasonable for LAN operations.
pub const SOAP_TIMEOUT_SECS: u64 = 10;

/// Largest album art body accepted (bytes).
pub const MAX_ARTWORK_BODY_SIZE: usize = 2 * 1024 * 1024;

/// UPnP instance id used by every AVTransport/RenderingControl action.
pub const INSTANCE_ID: &str = "0";

/// RenderingControl channel used for volume and mute.
pub const MASTER_CHANNEL: &str = "Master";

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// Sonos mDNS service type (note: trailing dot is required by mdns-sd).
pub const SONOS_SERVICE_TYPE: &str = "_sonos._tcp.local.";

/// How long an mDNS browse collects answers before it is stopped (milliseconds).
pub const DISCOVERY_TIMEOUT_MS: u64 = 5000;

/// Timeout for the best-effort device description fetch (milliseconds).
pub const DEVICE_INFO_TIMEOUT_MS: u64 = 3000;

/// Path of the UPnP device description document on a Sonos speaker.
pub const DEVICE_DESCRIPTION_PATH: &str = "/xml/device_description.xml";

// ─────────────────────────────────────────────────────────────────────────────
// Control Surface
// ─────────────────────────────────────────────────────────────────────────────

/// Period of the recurring reconcile timer on each surface (milliseconds).
pub const RECONCILE_INTERVAL_MS: u64 = 5000;

/// Volume change per dial tick when the surface settings don't specify one.
pub const DEFAULT_VOLUME_STEP: i32 = 2;

/// Upper bound of the renderer volume scale.
pub const MAX_VOLUME: u8 = 100;

/// Title shown on the volume dial when no device is bound.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Dial icon shown while the speaker is muted.
pub const MUTE_ICON: &str = "imgs/actions/volume/mute_icon.svg";

/// Dial icon shown while the speaker is audible.
pub const SPEAKER_ICON: &str = "imgs/actions/volume/speaker_icon.svg";
