//! Shared helpers: an in-memory terminal and a parser for what bars write.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use stackbar::Registry;

/// Terminal stand-in that keeps everything written to it.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    /// Drains and returns everything written so far.
    pub fn take(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
    }
}

/// An isolated registry for an 80-column terminal.
pub fn registry() -> (Arc<Registry>, Capture) {
    let capture = Capture::default();
    (Arc::new(Registry::new(capture.clone(), 80)), capture)
}

/// One step of terminal output.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Blank lines printed by the reservation.
    Reserve(usize),
    /// save, up `up`, `\r`, `line`, clear-to-end, restore.
    Redraw { up: usize, line: String },
    /// Cursor moved down after completion.
    Down(usize),
}

/// Splits raw output into [`Op`]s, panicking on anything unexpected.
pub fn parse(mut out: &str) -> Vec<Op> {
    let mut ops = vec![];
    while !out.is_empty() {
        if out.starts_with('\n') {
            let n = out.len() - out.trim_start_matches('\n').len();
            ops.push(Op::Reserve(n));
            out = &out[n..];
        } else if let Some(rest) = out.strip_prefix("\x1b7\x1b[") {
            let end = rest.find("\x1b8").expect("unterminated redraw");
            let (up, line) = rest[..end].split_once("A\r").expect("missing move up");
            let line = line.strip_suffix("\x1b[K").expect("missing clear to end");
            ops.push(Op::Redraw {
                up: up.parse().unwrap(),
                line: line.to_string(),
            });
            out = &rest[end + 2..];
        } else if let Some(rest) = out.strip_prefix("\x1b[") {
            let (n, tail) = rest.split_once('B').expect("unknown escape sequence");
            ops.push(Op::Down(n.parse().unwrap()));
            out = tail;
        } else {
            panic!("unexpected output: {out:?}");
        }
    }
    ops
}

/// Redraws only, as (distance, line) pairs.
pub fn redraws(ops: &[Op]) -> Vec<(usize, &str)> {
    ops.iter()
        .filter_map(|op| match op {
            Op::Redraw { up, line } => Some((*up, line.as_str())),
            _ => None,
        })
        .collect()
}
