//! shortcut-replay - run a recorded key trace against a keymap file.
//!
//! # Trace format
//!
//! One JSON object per line (JSONL), read from `--events` or stdin:
//!
//! ```json
//! {"type": "down", "code": "ControlLeft", "atMs": 0}
//! {"type": "down", "code": "KeyS", "atMs": 40}
//! {"type": "up", "code": "KeyS", "atMs": 90}
//! {"type": "down", "code": "KeyS", "repeat": true, "atMs": 120}
//! {"type": "scope", "name": "editor"}
//! ```
//!
//! Every fired shortcut is printed as one JSON line; the cheat sheet of every
//! scope is printed when the trace ends.
//!
//! # Example Usage
//!
//! ```bash
//! shortcut-replay --config keymap.json --events trace.jsonl
//! cat trace.jsonl | shortcut-replay --config keymap.json --log-json /tmp/replay.jsonl
//! shortcut-replay --config keymap.json --events trace.jsonl --log-json
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use shortcut_scope::config::{try_load_config, ShortcutConfig};
use shortcut_scope::error::ResultExt;
use shortcut_scope::event_source::{ChannelEventSource, KeyEvent, KeyEventSender};
use shortcut_scope::logging::{self, LogOptions};
use shortcut_scope::manager::{ManagerOptions, ShortcutManager};
use shortcut_scope::shortcut_set::ShortcutSet;
use shortcut_scope::shortcuts::{CheatSheetEntry, HoldState, ShortcutHandler};

#[derive(Parser, Debug)]
#[command(name = "shortcut-replay")]
#[command(about = "Replay a JSONL key trace against a keymap and report fired shortcuts")]
struct Args {
    /// Keymap file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Trace file (JSONL); stdin when omitted
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Also write structured logs to a JSONL file
    /// (~/.shortcut-scope/logs/shortcut-scope.jsonl when no path is given)
    #[arg(long, value_name = "PATH")]
    log_json: Option<Option<PathBuf>>,

    /// Suppress diagnostic output
    #[arg(long)]
    silent: bool,
}

/// One line of a key trace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum TraceRecord {
    Down {
        code: String,
        /// Logical key; defaults to the code
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        repeat: bool,
        /// Milliseconds since the start of the trace
        #[serde(default, rename = "atMs")]
        at_ms: Option<u64>,
    },
    Up {
        code: String,
        #[serde(default)]
        key: Option<String>,
        #[serde(default, rename = "atMs")]
        at_ms: Option<u64>,
    },
    /// Switch the active scope
    Scope { name: String },
}

impl TraceRecord {
    fn to_key_event(&self, start: Instant) -> Option<KeyEvent> {
        let timestamp = |at_ms: &Option<u64>| match at_ms {
            Some(ms) => start + Duration::from_millis(*ms),
            None => Instant::now(),
        };
        let event = match self {
            TraceRecord::Down {
                code,
                key,
                repeat,
                at_ms,
            } => KeyEvent::down(code.as_str())
                .repeat(*repeat)
                .at(timestamp(at_ms))
                .with_key(key.clone().unwrap_or_else(|| code.clone())),
            TraceRecord::Up { code, key, at_ms } => KeyEvent::up(code.as_str())
                .at(timestamp(at_ms))
                .with_key(key.clone().unwrap_or_else(|| code.clone())),
            TraceRecord::Scope { .. } => return None,
        };
        Some(event)
    }
}

/// Parse JSONL trace lines and forward them until the input ends or the
/// channel closes. Malformed lines are logged and skipped.
fn forward_records(reader: impl BufRead, tx: &async_channel::Sender<TraceRecord>) {
    for (line_no, line) in reader.lines().enumerate() {
        match line {
            Ok(line) if !line.trim().is_empty() => {
                match serde_json::from_str::<TraceRecord>(&line) {
                    Ok(record) => {
                        // send_blocking is used since we're in a sync thread
                        if tx.send_blocking(record).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(category = "REPLAY", line = line_no + 1, error = %e, "Skipping malformed trace line");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(category = "REPLAY", error = %e, "Error reading trace input");
                break;
            }
        }
    }
}

/// Start a thread reading trace records from `file`, or stdin when `None`.
fn start_trace_reader(file: Option<File>) -> async_channel::Receiver<TraceRecord> {
    let (tx, rx) = async_channel::bounded(100);

    std::thread::spawn(move || {
        match file {
            Some(file) => forward_records(BufReader::new(file), &tx),
            None => forward_records(std::io::stdin().lock(), &tx),
        }
        info!(category = "REPLAY", "Trace reader exiting");
    });

    rx
}

fn report_handler(scope: String, shortcut: &ShortcutConfig) -> ShortcutHandler {
    let action = shortcut.action.clone();
    let keys = shortcut.keys.clone();
    ShortcutHandler::hold(move |event, state| {
        let phase = match state {
            HoldState::Down => "down",
            HoldState::Up => "up",
        };
        let record = serde_json::json!({
            "fired": action,
            "keys": keys,
            "scope": scope,
            "phase": phase,
            "code": event.code,
        });
        println!("{}", record);
        Ok(())
    })
}

impl Args {
    fn json_log_file(&self) -> Option<PathBuf> {
        self.log_json
            .clone()
            .map(|path| path.unwrap_or_else(logging::default_log_path))
    }
}

fn dispatch(manager: &mut ShortcutManager, sender: &KeyEventSender, event: KeyEvent) {
    if sender.send(event).log_err().is_some() {
        manager.pump();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = logging::init(LogOptions {
        json_file: args.json_log_file(),
        default_filter: Some(if args.silent { "warn" } else { "info" }.to_string()),
    });

    let config = try_load_config(&args.config)
        .with_context(|| format!("loading keymap {}", args.config.display()))?;

    let trace_file = match &args.events {
        Some(path) => Some(
            File::open(path).with_context(|| format!("opening trace {}", path.display()))?,
        ),
        None => None,
    };

    // Each record is pumped right after it is sent, so the channel never fills
    let (sender, source) = ChannelEventSource::bounded(64);
    let options = ManagerOptions::from_config(&config).silent(config.silent || args.silent);
    let mut manager = ShortcutManager::new(options, Some(Box::new(source)))?;

    let mut sets: Vec<ShortcutSet> = config
        .scopes
        .iter()
        .map(|scope| {
            let name = scope.name.clone();
            ShortcutSet::from_config(scope, |s| report_handler(name.clone(), s))
        })
        .collect();
    for set in &mut sets {
        set.mount(&mut manager)?;
    }

    info!(
        category = "REPLAY",
        scopes = sets.len(),
        shortcuts = manager.shortcut_count(),
        active_scope = manager.active_scope(),
        "Keymap mounted"
    );

    let start = Instant::now();
    let records = start_trace_reader(trace_file);
    let mut replayed = 0usize;
    while let Ok(record) = records.recv_blocking() {
        replayed += 1;
        match record.to_key_event(start) {
            Some(event) => dispatch(&mut manager, &sender, event),
            None => {
                if let TraceRecord::Scope { name } = &record {
                    manager.push_scope(name);
                    manager.set_active_scope(name);
                }
            }
        }
    }

    info!(category = "REPLAY", records = replayed, "Trace finished");

    let sheet: BTreeMap<String, Vec<CheatSheetEntry>> = manager
        .scopes()
        .into_iter()
        .map(|scope| {
            let entries = manager.cheat_sheet(Some(&scope));
            (scope, entries)
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&sheet)?);

    manager.destroy();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_record_defaults() {
        let record: TraceRecord = serde_json::from_str(r#"{"type": "down", "code": "KeyA"}"#).unwrap();
        assert_eq!(
            record,
            TraceRecord::Down {
                code: "KeyA".to_string(),
                key: None,
                repeat: false,
                at_ms: None,
            }
        );
    }

    #[test]
    fn test_record_to_key_event_uses_offset() {
        let start = Instant::now();
        let record: TraceRecord =
            serde_json::from_str(r#"{"type": "down", "code": "KeyS", "repeat": true, "atMs": 250}"#)
                .unwrap();
        let event = record.to_key_event(start).unwrap();
        assert_eq!(event.code, "KeyS");
        assert_eq!(event.key, "KeyS");
        assert!(event.repeat);
        assert_eq!(event.timestamp, start + Duration::from_millis(250));
    }

    #[test]
    fn test_scope_record_is_not_a_key_event() {
        let record: TraceRecord =
            serde_json::from_str(r#"{"type": "scope", "name": "editor"}"#).unwrap();
        assert!(record.to_key_event(Instant::now()).is_none());
    }

    #[test]
    fn test_log_json_flag_without_value_uses_default_path() {
        let args = Args::try_parse_from(["shortcut-replay", "--config", "keymap.json", "--log-json"])
            .unwrap();
        assert_eq!(args.json_log_file(), Some(logging::default_log_path()));

        let args = Args::try_parse_from([
            "shortcut-replay",
            "--config",
            "keymap.json",
            "--log-json",
            "/tmp/replay.jsonl",
        ])
        .unwrap();
        assert_eq!(args.json_log_file(), Some(PathBuf::from("/tmp/replay.jsonl")));

        let args = Args::try_parse_from(["shortcut-replay", "--config", "keymap.json"]).unwrap();
        assert_eq!(args.json_log_file(), None);
    }

    #[test]
    fn test_forward_records_skips_malformed_lines() {
        let input = "{\"type\": \"up\", \"code\": \"KeyA\"}\nnot json\n\n{\"type\": \"scope\", \"name\": \"x\"}\n";
        let (tx, rx) = async_channel::unbounded();
        forward_records(input.as_bytes(), &tx);
        drop(tx);

        let mut records = Vec::new();
        while let Ok(record) = rx.try_recv() {
            records.push(record);
        }
        assert_eq!(records.len(), 2);
        assert!(matches!(records[1], TraceRecord::Scope { .. }));
    }
}
