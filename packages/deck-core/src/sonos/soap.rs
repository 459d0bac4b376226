//! SOAP transport for the UPnP control actions the session issues.
//!
//! A [`SoapRequestBuilder`] collects the service, action and arguments into a
//! [`SoapRequest`]; [`send_soap_request`] posts it and maps faults and error
//! statuses onto [`SoapError`]. Typed commands live in `playback.rs`,
//! `volume.rs` and `zone_groups.rs`.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::services::SonosService;
use super::utils::{build_sonos_url, escape_xml, extract_xml_text};
use crate::protocol_constants::{INSTANCE_ID, SOAP_TIMEOUT_SECS};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during SOAP operations with Sonos speakers.
#[derive(Debug, Error)]
pub enum SoapError {
    /// HTTP request to the speaker failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a SOAP fault in the body.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// The speaker rejected the action.
    #[error("SOAP fault: {0}")]
    Fault(String),

    /// The response was missing an expected value.
    #[error("Failed to parse SOAP response")]
    Parse,
}

/// Convenient Result alias for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// A fully specified SOAP action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest<'a> {
    pub service: SonosService,
    pub action: &'a str,
    /// Arguments in body order.
    pub args: Vec<(&'a str, String)>,
    pub timeout: Duration,
}

impl SoapRequest<'_> {
    /// Renders the envelope on a single line.
    ///
    /// Sonos rejects bodies with whitespace before the root element.
    pub fn envelope(&self) -> String {
        let args: String = self
            .args
            .iter()
            .map(|(name, value)| format!("<{name}>{}</{name}>", escape_xml(value)))
            .collect();

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
                r#"<s:Body><u:{action} xmlns:u="{urn}">{args}</u:{action}></s:Body></s:Envelope>"#
            ),
            action = self.action,
            urn = self.service.urn(),
            args = args
        )
    }

    /// Value of the `SOAPAction` header.
    pub fn soap_action(&self) -> String {
        format!("\"{}#{}\"", self.service.urn(), self.action)
    }
}

/// Posts `request` to the speaker at `ip` and returns the response body.
pub async fn send_soap_request(
    client: &Client,
    ip: &str,
    request: &SoapRequest<'_>,
) -> SoapResult<String> {
    let url = build_sonos_url(ip, request.service.control_path());
    let body = request.envelope();

    log::debug!("[SOAP] {}.{} -> {}", request.service.name(), request.action, ip);
    log::trace!("[SOAP] Request body: {}", body);

    let started = Instant::now();
    let response = client
        .post(&url)
        .header("Content-Type", "text/xml; charset=\"utf-8\"")
        .header("SOAPAction", request.soap_action())
        .body(body)
        .timeout(request.timeout)
        .send()
        .await
        .inspect_err(|e| log::debug!("[SOAP] {} failed: {}", request.action, e))?;

    let status = response.status();
    let text = response.text().await?;
    log::debug!(
        "[SOAP] {} answered {} in {:?}",
        request.action,
        status,
        started.elapsed()
    );

    check_response(status, text)
}

/// Maps a response onto the body or a [`SoapError`].
///
/// Faults arrive with status 500, so the body is inspected before the status.
fn check_response(status: StatusCode, body: String) -> SoapResult<String> {
    if body.contains("<s:Fault>") || body.contains("<soap:Fault>") {
        let reason = fault_reason(&body).unwrap_or_else(|| "Unknown SOAP fault".to_string());
        return Err(SoapError::Fault(reason));
    }

    if !status.is_success() {
        return Err(SoapError::HttpStatus(status.as_u16(), body));
    }

    Ok(body)
}

/// `faultstring` plus the UPnP `errorCode`, e.g. `UPnPError (701)`.
fn fault_reason(xml: &str) -> Option<String> {
    match (
        extract_xml_text(xml, "faultstring"),
        extract_xml_text(xml, "errorCode"),
    ) {
        (Some(fault), Some(code)) => Some(format!("{} ({})", fault, code)),
        (fault, code) => fault.or(code),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for SOAP requests to one speaker.
///
/// # Example
/// ```ignore
/// let response = SoapRequestBuilder::new(&client, "192.168.1.100")
///     .service(SonosService::AVTransport)
///     .action("Play")
///     .instance_id()
///     .arg("Speed", "1")
///     .send()
///     .await?;
/// ```
pub struct SoapRequestBuilder<'a> {
    client: &'a Client,
    ip: &'a str,
    service: Option<SonosService>,
    action: Option<&'a str>,
    args: Vec<(&'a str, String)>,
    timeout: Duration,
}

impl<'a> SoapRequestBuilder<'a> {
    #[must_use]
    pub fn new(client: &'a Client, ip: &'a str) -> Self {
        Self {
            client,
            ip,
            service: None,
            action: None,
            args: Vec::new(),
            timeout: Duration::from_secs(SOAP_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn service(mut self, service: SonosService) -> Self {
        self.service = Some(service);
        self
    }

    #[must_use]
    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action);
        self
    }

    /// Appends an argument; body order follows call order.
    #[must_use]
    pub fn arg(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.args.push((key, value.into()));
        self
    }

    /// Appends `InstanceID=0`, required by AVTransport and RenderingControl.
    #[must_use]
    pub fn instance_id(self) -> Self {
        self.arg("InstanceID", INSTANCE_ID)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build(self) -> Option<(&'a Client, &'a str, SoapRequest<'a>)> {
        let request = SoapRequest {
            service: self.service?,
            action: self.action?,
            args: self.args,
            timeout: self.timeout,
        };
        Some((self.client, self.ip, request))
    }

    /// Sends the request and returns the response body.
    ///
    /// # Errors
    /// `Fault` if the service or action was never set, otherwise whatever
    /// [`send_soap_request`] returns.
    pub async fn send(self) -> SoapResult<String> {
        let (client, ip, request) = self
            .build()
            .ok_or_else(|| SoapError::Fault("SoapRequestBuilder: service or action not set".into()))?;
        send_soap_request(client, ip, &request).await
    }

    /// Returns (service, action, args) without sending.
    #[cfg(test)]
    pub fn into_parts(self) -> Option<(SonosService, &'a str, Vec<(&'a str, String)>)> {
        self.build()
            .map(|(_, _, request)| (request.service, request.action, request.args))
    }
}
