//! Centralized error types for the deck core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Gives every error a stable machine-readable code for logs
//! - Converts failures into neutral display values at the surface boundary

use thiserror::Error;

use crate::artwork::ArtworkError;
use crate::sonos::discovery::DiscoveryError;
use crate::sonos::soap::SoapError;
use crate::sonos::types::TransportState;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::MdnsDaemon(_) => "mdns_daemon_failed",
        }
    }
}

impl ErrorCode for SoapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Fault(_) => "soap_fault",
            Self::Parse => "soap_parse_error",
        }
    }
}

impl ErrorCode for ArtworkError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "artwork_request_failed",
            Self::HttpStatus(_) => "artwork_error_status",
            Self::TooLarge { .. } => "artwork_too_large",
            Self::Empty => "artwork_empty",
        }
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No device is bound and auto-initialization did not bind one.
    #[error("No device bound")]
    NotBound,

    /// Discovery completed without a usable device, or the control-plane
    /// connection listed no playable speakers.
    #[error("No Sonos devices found")]
    NoDevicesFound,

    /// A requested device id is not in the registry.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The speaker reported a play mode outside the known set.
    #[error("Unknown play mode: {0}")]
    UnknownPlayMode(String),

    /// SOAP request to the speaker failed.
    #[error("SOAP request failed: {0}")]
    Soap(#[from] SoapError),

    /// Device discovery failed.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

impl ErrorCode for SessionError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotBound => "not_bound",
            Self::NoDevicesFound => "no_devices_found",
            Self::DeviceNotFound(_) => "device_not_found",
            Self::UnknownPlayMode(_) => "unknown_play_mode",
            Self::Soap(e) => e.code(),
            Self::Discovery(e) => e.code(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::artwork::ArtworkResult;
pub use crate::sonos::discovery::DiscoveryResult;
pub use crate::sonos::soap::SoapResult;

/// Convenient Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// ─────────────────────────────────────────────────────────────────────────────
// Neutral Values
// ─────────────────────────────────────────────────────────────────────────────

/// Value shown by a surface when an operation fails.
pub trait Neutral {
    /// Returns the neutral value.
    fn neutral() -> Self;
}

impl Neutral for bool {
    fn neutral() -> Self {
        false
    }
}

impl Neutral for u8 {
    fn neutral() -> Self {
        0
    }
}

impl Neutral for TransportState {
    fn neutral() -> Self {
        TransportState::Stopped
    }
}

impl<T> Neutral for Option<T> {
    fn neutral() -> Self {
        None
    }
}

impl<T> Neutral for Vec<T> {
    fn neutral() -> Self {
        Vec::new()
    }
}

/// Surface-boundary adapter for session results.
pub trait SessionResultExt<T> {
    /// Returns the value, or the neutral value after logging `op` and the error.
    fn or_neutral(self, op: &str) -> T
    where
        T: Neutral;

    /// Returns whether the operation succeeded, logging `op` and the error if not.
    fn succeeded(self, op: &str) -> bool;

    /// Converts to an `Option`, logging `op` and the error on failure.
    fn ok_logged(self, op: &str) -> Option<T>;
}

impl<T> SessionResultExt<T> for SessionResult<T> {
    fn or_neutral(self, op: &str) -> T
    where
        T: Neutral,
    {
        self.unwrap_or_else(|e| {
            log_failure(op, &e);
            T::neutral()
        })
    }

    fn succeeded(self, op: &str) -> bool {
        match self {
            Ok(_) => true,
            Err(e) => {
                log_failure(op, &e);
                false
            }
        }
    }

    fn ok_logged(self, op: &str) -> Option<T> {
        self.map_err(|e| log_failure(op, &e)).ok()
    }
}

fn log_failure(op: &str, e: &SessionError) {
    log::warn!("[Session] {} failed ({}): {}", op, e.code(), e);
}
