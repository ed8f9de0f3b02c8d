//! Structured logging for the race engine.
//!
//! JSON lines, one per event, mirrored to stdout and appended to a per-run
//! directory so a finished race can be replayed from its log. Levels and
//! domains are filtered through `LOG_LEVEL` / `LOG_DOMAINS`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Dataset,  // Loading, validation, manifests
    Frame,    // Aggregation, ranking, frame commits
    Callout,  // Movers, dark horses, achievements
    Playback, // Play/pause/seek/speed transitions
    System,   // Startup, shutdown
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Dataset => "dataset",
            Domain::Frame => "frame",
            Domain::Callout => "callout",
            Domain::Playback => "playback",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // Check LOG_DOMAINS env var (comma-separated list or "all")
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Mutex<Option<BufWriter<File>>>,
    trace: Mutex<Option<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", Utc::now().timestamp_millis(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);

        let (events, trace) = match create_dir_all(&run_dir) {
            Ok(()) => (
                File::create(run_dir.join("events.jsonl")).ok().map(BufWriter::new),
                File::create(run_dir.join("trace.jsonl")).ok().map(BufWriter::new),
            ),
            Err(err) => {
                eprintln!("[log] cannot create run dir {}: {}", run_dir.display(), err);
                (None, None)
            }
        };

        RunContext {
            run_id,
            events: Mutex::new(events),
            trace: Mutex::new(trace),
        }
    })
}

fn write_line(sink: &Mutex<Option<BufWriter<File>>>, line: &str) {
    if let Ok(mut guard) = sink.lock() {
        if let Some(w) = guard.as_mut() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

/// RFC3339 timestamp with millisecond precision.
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit one structured entry. Trace/debug go to trace.jsonl, everything
/// else to events.jsonl; all enabled entries mirror to stdout.
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }

    let ctx = ensure_run_context();
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("data".to_string(), Value::Object(fields));

    let line = Value::Object(entry).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    println!("{}", line);
}

// =============================================================================
// Domain helpers
// =============================================================================

pub fn log_dataset_loaded(path: &str, records: usize, frames: usize) {
    log(
        Level::Info,
        Domain::Dataset,
        "dataset_loaded",
        obj(&[
            ("path", v_str(path)),
            ("records", json!(records)),
            ("frames", json!(frames)),
        ]),
    );
}

pub fn log_frame(frame: usize, date: &str, leader: Option<&str>) {
    log(
        Level::Debug,
        Domain::Frame,
        "frame_committed",
        obj(&[
            ("frame", json!(frame)),
            ("date", v_str(date)),
            ("leader", leader.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
}

pub fn log_callouts(frame: usize, callouts: &crate::callout::Callouts) {
    log(
        Level::Info,
        Domain::Callout,
        "callouts",
        obj(&[
            ("frame", json!(frame)),
            ("top_mover", json!(callouts.top_mover)),
            ("slowest_mover", json!(callouts.slowest_mover)),
            ("dark_horse", json!(callouts.dark_horse)),
        ]),
    );
}

pub fn log_playback(event: &str, frame: usize, speed: f64) {
    log(
        Level::Info,
        Domain::Playback,
        event,
        obj(&[("frame", json!(frame)), ("speed", json!(speed))]),
    );
}

// =============================================================================
// Field construction helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}
