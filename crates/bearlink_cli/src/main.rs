//! `bearlink` stdio entry point.
//!
//! # Responsibility
//! - Read one JSON request per stdin line and write one JSON response per
//!   stdout line.
//! - Release the store connection on end of input or on a termination signal
//!   (SIGINT, SIGTERM, SIGHUP).
//!
//! # Invariants
//! - stdout carries responses only; logs go to stderr.
//! - Requests are handled one at a time on the main thread.
//! - Every non-blank input line gets exactly one response line, including
//!   lines that are not valid UTF-8.

use bearlink_api::{BearApi, SystemApi, ToolResponse};
use bearlink_core::{core_version, init_logging, ActionChannel, BridgeConfig, LogLevel, NoteReader};
use clap::Parser;
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::thread;

const INVALID_UTF8_MESSAGE: &str = "malformed request: invalid UTF-8";

#[derive(Debug, Parser)]
#[command(name = "bearlink", version, about = "Line-delimited JSON bridge to the Bear notes app")]
struct Args {
    /// Path to the note store, tried before the default locations.
    #[arg(long, value_name = "PATH", env = "BEARLINK_DB_PATH")]
    database: Option<PathBuf>,

    /// Log level: debug, info, warn or error.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn into_config(self, mut config: BridgeConfig) -> BridgeConfig {
        if let Some(level) = self.log_level.as_deref() {
            config.log_level = LogLevel::parse_or_default(Some(level));
        }
        if let Some(path) = self.database.filter(|p| !p.as_os_str().is_empty()) {
            config.store_path = Some(path);
        }
        config
    }
}

enum Event {
    Line(String),
    Undecodable,
    Eof,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Eof,
    Signal,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "eof",
            Self::Signal => "signal",
        }
    }
}

fn main() -> ExitCode {
    let config = Args::parse().into_config(BridgeConfig::from_env());
    if let Err(err) = init_logging(config.log_level) {
        eprintln!("bearlink: logging disabled: {err}");
    }

    let (tx, rx) = mpsc::channel();
    install_shutdown_handler(tx.clone());
    thread::spawn(move || read_requests(io::stdin().lock(), &tx));

    let mut api = SystemApi::from_config(&config);
    info!(
        "event=bridge_start module=cli status=ok version={} log_level={}",
        core_version(),
        config.log_level.as_str()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match serve(&mut api, rx, &mut out) {
        Ok(reason) => {
            info!(
                "event=bridge_stop module=cli status=ok reason={}",
                reason.as_str()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=bridge_stop module=cli status=error reason=stdout error={err}");
            ExitCode::FAILURE
        }
    }
}

fn install_shutdown_handler(tx: Sender<Event>) {
    let result = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Shutdown);
    });
    if let Err(err) = result {
        warn!("event=signal_handler module=cli status=error error={err}");
    }
}

/// Forwards raw input lines as events until end of input or a read error.
///
/// Lines are split on `\n` before decoding, so a line that is not UTF-8
/// becomes [`Event::Undecodable`] without ending the stream.
fn read_requests(mut input: impl BufRead, tx: &Sender<Event>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let event = match String::from_utf8(std::mem::take(&mut buf)) {
                    Ok(line) => Event::Line(line),
                    Err(_) => Event::Undecodable,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!("event=bridge_read module=cli status=error error={err}");
                break;
            }
        }
    }
    let _ = tx.send(Event::Eof);
}

/// Answers events until end of input or shutdown, then closes the store.
///
/// # Errors
/// Returns the write error when a response cannot be written to `out`.
fn serve<R: NoteReader, W: ActionChannel>(
    api: &mut BearApi<R, W>,
    events: impl IntoIterator<Item = Event>,
    out: &mut impl Write,
) -> io::Result<StopReason> {
    let mut events = events.into_iter();
    let outcome = loop {
        let response = match events.next() {
            None | Some(Event::Eof) => break Ok(StopReason::Eof),
            Some(Event::Shutdown) => break Ok(StopReason::Signal),
            Some(Event::Line(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                api.handle_json(&line)
            }
            Some(Event::Undecodable) => {
                warn!("event=tool_call module=cli status=error error_code=invalid_utf8");
                ToolResponse::failure(INVALID_UTF8_MESSAGE)
            }
        };
        if let Err(err) = write_response(out, &response) {
            break Err(err);
        }
    };

    api.shutdown();
    outcome
}

fn write_response(out: &mut impl Write, response: &ToolResponse) -> io::Result<()> {
    serde_json::to_writer(&mut *out, response)?;
    out.write_all(b"\n")?;
    out.flush()
}
