//! Sonos speaker control and discovery.
//!
//! This module provides functionality for discovering and controlling Sonos speakers
//! on the local network using UPnP/SOAP protocols.
//!
//! # Module Structure
//!
//! - `types` - Transport state, play mode, track and topology types
//! - `services` - UPnP service definitions (URNs, paths)
//! - `traits` - Trait abstractions for testability
//! - `client` - `SonosClientImpl` concrete trait implementation
//! - `zone_groups` - Topology retrieval used when binding to an address
//! - `didl` - DIDL-Lite track metadata parsing
//! - `playback` - Transport commands and queries
//! - `volume` - Per-speaker volume/mute control
//! - `discovery` - mDNS discovery with model enrichment
//! - `soap` - Low-level SOAP protocol implementation
//! - `utils` - Shared utility functions

pub mod client;
pub(crate) mod didl;
pub mod discovery;
pub(crate) mod playback;
pub mod services;
pub mod soap;
pub mod traits;
pub mod types;
pub mod utils;
pub(crate) mod volume;
pub(crate) mod zone_groups;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use services::SonosService;
pub use types::{PlayMode, TrackMetadata, TransportState, ZoneMember};

// Re-export trait abstractions
pub use traits::{
    SonosClient, SonosControl, SonosDiscovery, SonosPlayback, SonosTopology, SonosVolumeControl,
};

// Re-export concrete implementation
pub use client::SonosClientImpl;
