//! Diagnostic frame logging for debugging progress display.
//!
//! When enabled via the `STACKBAR_TRACE_LOG` environment variable, every
//! terminal redraw is appended as one JSON line holding the rendered text and
//! the bar's state. Escape codes are stripped unless `STACKBAR_TRACE_RAW` is
//! set.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::sync::{Mutex, OnceLock};

use super::bar::BarSnapshot;

static LOG_WRITER: OnceLock<Option<Mutex<LineWriter<File>>>> = OnceLock::new();
static KEEP_ANSI: OnceLock<bool> = OnceLock::new();

fn get_log_writer() -> Option<&'static Mutex<LineWriter<File>>> {
    LOG_WRITER
        .get_or_init(|| {
            std::env::var("STACKBAR_TRACE_LOG").ok().and_then(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
                    .map(|file| Mutex::new(LineWriter::new(file)))
            })
        })
        .as_ref()
}

fn keep_ansi() -> bool {
    *KEEP_ANSI.get_or_init(|| std::env::var("STACKBAR_TRACE_RAW").is_ok())
}

/// Frame event emitted for each redraw.
#[derive(Debug, Clone, Serialize)]
pub struct FrameEvent<'a> {
    pub rendered: String,
    pub bar: &'a BarSnapshot,
}

/// Log a frame event to the trace log file, if one is configured.
pub fn log_frame(rendered: &str, bar: &BarSnapshot) {
    let Some(log_writer) = get_log_writer() else {
        return;
    };
    if let Ok(mut writer) = log_writer.lock() {
        let _ = write_frame(&mut *writer, rendered, bar, keep_ansi());
    }
}

fn write_frame<W: Write>(
    writer: &mut W,
    rendered: &str,
    bar: &BarSnapshot,
    keep_ansi: bool,
) -> std::io::Result<()> {
    let rendered = if keep_ansi {
        rendered.to_string()
    } else {
        console::strip_ansi_codes(rendered).to_string()
    };
    let json = serde_json::to_string(&FrameEvent { rendered, bar })?;
    writeln!(writer, "{json}")
}
