//! Sonos Deck Core - session core for driving one Sonos speaker from a
//! control surface.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`sonos`]: Speaker control, topology and discovery (UPnP/SOAP, mDNS)
//! - [`session`]: The shared device binding and every speaker command
//! - [`reconciler`]: Per-surface state reconciliation with artwork caching
//! - [`surface`]: Keys and dials, their timers and rendering sink
//! - [`artwork`]: Album art download and encoding
//! - [`runtime`]: Task spawning abstraction for surface timers
//! - [`config`]: Runtime configuration
//! - [`error`]: Centralized error types and the neutral-value adapter
//!
//! # Abstraction Traits
//!
//! - [`SonosClient`](sonos::SonosClient): Speaker control, topology and discovery
//! - [`ArtworkFetcher`](artwork::ArtworkFetcher): Album art retrieval
//! - [`SurfaceDisplay`](surface::SurfaceDisplay): Rendering on the host
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning background tasks
//!
//! The network-backed implementations ([`SonosClientImpl`],
//! [`HttpArtworkFetcher`]) are what the binary uses; tests substitute mocks.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod artwork;
pub mod config;
pub mod error;
pub mod protocol_constants;
pub mod reconciler;
pub mod runtime;
pub mod session;
pub mod sonos;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use artwork::{ArtworkFetcher, HttpArtworkFetcher};
pub use config::DeckConfig;
pub use error::{ErrorCode, Neutral, SessionError, SessionResult, SessionResultExt};
pub use reconciler::{PlaybackSnapshot, PlaybackView, StateReconciler, VolumeView};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use session::{DeviceHandle, SessionManager, SessionStatus};
pub use surface::{
    DeviceListPayload, Surface, SurfaceCommand, SurfaceDisplay, SurfaceKind, SurfaceSettings,
    VolumeFeedback,
};

// Re-export Sonos types
pub use sonos::discovery::DiscoveredDevice;
pub use sonos::types::{PlayMode, TrackMetadata, TransportState};
pub use sonos::{SonosClient, SonosClientImpl};
