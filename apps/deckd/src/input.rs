//! Line-oriented command input.
//!
//! Each stdin line drives one surface or the session:
//!
//! ```text
//! play-pause press
//! volume-dial rotate -3
//! volume-dial dial-press
//! volume-dial tap
//! shuffle discover
//! select RINCON_000E58A0123401400
//! status
//! quit
//! ```

use anyhow::{anyhow, bail, Context, Result};
use sonos_deck_core::{SurfaceCommand, SurfaceKind};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Surface(SurfaceKind, SurfaceCommand),
    Select(String),
    Status,
    Quit,
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<InputLine>> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next().filter(|w| !w.starts_with('#')) else {
        return Ok(None);
    };

    let parsed = match first {
        "status" => InputLine::Status,
        "quit" | "exit" => InputLine::Quit,
        "select" => {
            let uuid = words.next().ok_or_else(|| anyhow!("select needs a device id"))?;
            InputLine::Select(uuid.to_string())
        }
        surface => {
            let kind: SurfaceKind = surface
                .parse()
                .with_context(|| format!("Unknown surface or command: {}", surface))?;
            let command = match words.next() {
                Some("press") => SurfaceCommand::Press,
                Some("dial-press") => SurfaceCommand::DialPress,
                Some("tap") => SurfaceCommand::TouchTap,
                Some("discover") => SurfaceCommand::Discover,
                Some("rotate") => {
                    let ticks = words
                        .next()
                        .ok_or_else(|| anyhow!("rotate needs a tick count"))?;
                    SurfaceCommand::Rotate(
                        ticks
                            .parse()
                            .with_context(|| format!("Invalid tick count: {}", ticks))?,
                    )
                }
                Some(other) => bail!("Unknown surface command: {}", other),
                None => bail!("Missing command for {}", kind),
            };
            InputLine::Surface(kind, command)
        }
    };

    Ok(Some(parsed))
}
