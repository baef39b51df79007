//! Terminal output for CLI handlers.
//!
//! Human-readable lines use colored markers; `--json` switches every helper
//! to one JSON object per line so output can be piped into other tools.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

/// Emit a JSON line with type and payload structure.
pub fn emit_json(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Print a section header.
pub fn section(title: &str) {
    let config = read_config();
    if config.json {
        emit_json("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();
    if config.json {
        emit_json("field", json!({ "label": label, "value": value }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "  {:<14} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

pub fn success(message: &str) {
    let config = read_config();
    if config.json {
        emit_json("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    let config = read_config();
    if config.json {
        emit_json("warning", json!({ "message": message }));
        return;
    }
    println!(
        "  {} {}",
        "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()),
        message
    );
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if read_config().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

pub fn note(message: &str) {
    let config = read_config();
    if config.json {
        emit_json("note", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print a pre-rendered block, such as a table, verbatim.
pub fn block(text: &str) {
    if suppressed(read_config()) {
        return;
    }
    println!("{text}");
}
