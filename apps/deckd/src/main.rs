//! Sonos Deck - headless control-surface driver.
//!
//! Builds one shared session, activates the configured surfaces and feeds
//! them commands read line-by-line from stdin. Surface output is written to
//! stdout as JSON lines; logs go to stderr.

mod config;
mod input;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use serde_json::json;
use sonos_deck_core::{
    ArtworkFetcher, DeviceListPayload, HttpArtworkFetcher, SessionManager, SonosClientImpl,
    Surface, SurfaceDisplay, SurfaceKind, SurfaceSettings, TokioSpawner, VolumeFeedback,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use crate::config::AppConfig;
use crate::input::{parse_line, InputLine};

/// Sonos Deck - drive a Sonos speaker from keys and a dial.
#[derive(Parser, Debug)]
#[command(name = "sonos-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "SONOS_DECK_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Speaker address (overrides config file).
    #[arg(short, long, env = "SONOS_DECK_IP")]
    ip: Option<String>,

    /// Preferred device id (overrides config file).
    #[arg(short, long, env = "SONOS_DECK_DEVICE_UUID")]
    device: Option<String>,
}

/// Writes surface output to stdout as JSON lines.
struct StdoutDisplay {
    kind: SurfaceKind,
    /// Serializes lines from concurrent surfaces.
    out: Arc<Mutex<()>>,
}

impl StdoutDisplay {
    fn emit(&self, event: &str, payload: serde_json::Value) {
        let line = json!({ "surface": self.kind, "event": event, "payload": payload });
        let _guard = self.out.lock();
        println!("{}", line);
    }
}

impl SurfaceDisplay for StdoutDisplay {
    fn set_state(&self, state: u8) {
        self.emit("setState", json!(state));
    }

    fn set_image(&self, image: Option<&str>) {
        // Data URLs are large; report only whether one is shown
        self.emit("setImage", json!({ "present": image.is_some() }));
    }

    fn set_feedback(&self, feedback: &VolumeFeedback) {
        self.emit("setFeedback", json!(feedback));
    }

    fn show_ok(&self) {
        self.emit("showOk", serde_json::Value::Null);
    }

    fn show_alert(&self) {
        self.emit("showAlert", serde_json::Value::Null);
    }

    fn send_device_list(&self, payload: &DeviceListPayload) {
        self.emit("sendToPropertyInspector", json!(payload));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Sonos Deck v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(ip) = args.ip {
        config.ip_address = Some(ip);
    }
    if let Some(device) = args.device {
        config.device_uuid = Some(device);
    }

    let deck_config = config.to_deck_config()?;
    log::info!(
        "Configuration: ip={}, device={}, interval={}ms, step={}",
        deck_config.ip_address.as_deref().unwrap_or("discover"),
        deck_config.device_uuid.as_deref().unwrap_or("first"),
        deck_config.reconcile_interval_ms,
        deck_config.volume_step
    );

    let http = reqwest_client()?;
    let sonos = Arc::new(SonosClientImpl::from_config(http.clone(), &deck_config));
    let session = Arc::new(SessionManager::with_config(sonos, &deck_config));
    let artwork: Arc<dyn ArtworkFetcher> =
        Arc::new(HttpArtworkFetcher::new(http).with_timeout(deck_config.soap_timeout()));

    let spawner = TokioSpawner::current();
    let out = Arc::new(Mutex::new(()));
    let settings = SurfaceSettings {
        ip_address: deck_config.ip_address.clone(),
        device_uuid: deck_config.device_uuid.clone(),
        volume_step: Some(deck_config.volume_step),
    };

    let mut surfaces = HashMap::new();
    for kind in deck_config.surfaces.iter().copied() {
        let display = Arc::new(StdoutDisplay {
            kind,
            out: Arc::clone(&out),
        });
        let surface = Surface::new(
            kind,
            Arc::clone(&session),
            Arc::clone(&artwork),
            display,
            &deck_config,
        );
        surface.activate(&spawner, settings.clone()).await;
        surfaces.insert(kind, surface);
    }
    log::info!(
        "Activated {} surface(s), session {:?}",
        surfaces.len(),
        session.status()
    );

    tokio::select! {
        result = run_input(&session, &surfaces) => result?,
        _ = shutdown_signal() => log::info!("Shutdown signal received, cleaning up..."),
    }

    for surface in surfaces.values() {
        surface.deactivate();
    }
    session.release();

    log::info!("Shutdown complete");
    Ok(())
}

fn reqwest_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")
}

/// Reads commands from stdin until EOF or `quit`.
async fn run_input(
    session: &SessionManager,
    surfaces: &HashMap<SurfaceKind, Surface>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let parsed = match parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{:#}", e);
                continue;
            }
        };

        match parsed {
            InputLine::Surface(kind, command) => match surfaces.get(&kind) {
                Some(surface) => surface.command(command).await,
                None => log::warn!("Surface {} is not active", kind),
            },
            InputLine::Select(uuid) => {
                if let Err(e) = session.select_device(&uuid) {
                    log::warn!("Select failed: {}", e);
                }
                for surface in surfaces.values() {
                    surface.tick().await;
                }
            }
            InputLine::Status => {
                let active = session.active_device();
                println!(
                    "{}",
                    json!({
                        "status": session.status(),
                        "device": active.as_ref().map(|d| json!({
                            "uuid": d.uuid(),
                            "name": d.name(),
                            "ip": d.ip(),
                        })),
                        "registry": session.devices().len(),
                    })
                );
            }
            InputLine::Quit => break,
        }
    }

    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
