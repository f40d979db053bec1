//! Line bookkeeping shared by every bar drawing to the same terminal.
//!
//! Each bar registers once and receives a fixed line offset. On the first
//! update of any bar, the registry prints one blank line per registered bar,
//! leaving the cursor directly below that block. A bar with offset `k` then
//! lives `count - k` lines above the cursor, where `count` is read at the
//! moment of each redraw.
//!
//! The counters and the output stream sit behind a single mutex. Every cursor
//! sequence (save, move, write, restore) is written while holding it, so
//! redraws from different threads never interleave.
//!
//! Other output can be printed above the block with [`Registry::write_above`],
//! which shifts the block down one row per printed line and redraws it from
//! the last content written for each offset.

use std::io::Write;
use std::sync::{Arc, LazyLock, Mutex};

use console::Term;

use crate::Result;

use super::cursor::{CLEAR_TO_END, LINE_START, move_down, move_up, rewrite_line_above};

struct Inner {
    /// Bars ever registered; also the number of reserved lines.
    count: usize,
    lines_reserved: bool,
    /// Last content written for each line offset.
    drawn: Vec<String>,
    out: Box<dyn Write + Send>,
}

/// Registry of bar slots sharing one terminal stream.
///
/// Most programs use [`Registry::global`]. Tests and embedders can build an
/// isolated registry around any writer with [`Registry::new`].
pub struct Registry {
    inner: Mutex<Inner>,
    columns: usize,
}

impl Registry {
    /// Creates a registry writing to `out`, for a terminal `columns` wide.
    pub fn new<W: Write + Send + 'static>(out: W, columns: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                count: 0,
                lines_reserved: false,
                drawn: Vec::new(),
                out: Box::new(out),
            }),
            columns,
        }
    }

    /// Creates a registry writing to stdout, sized to the current terminal.
    pub fn stdout() -> Self {
        let term = Term::stdout();
        let columns = term.size().1 as usize;
        Self::new(term, columns)
    }

    /// Returns the process-wide registry, which writes to stdout.
    pub fn global() -> Arc<Registry> {
        static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::stdout()));
        GLOBAL.clone()
    }

    /// Terminal width the registry was created with.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Assigns the next line offset.
    pub fn register(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let offset = inner.count;
        inner.count += 1;
        offset
    }

    /// Number of bars ever registered.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().count
    }

    /// Whether the blank-line block has been printed.
    #[must_use]
    pub fn lines_reserved(&self) -> bool {
        self.inner.lock().unwrap().lines_reserved
    }

    /// Prints one blank line per registered bar, once.
    ///
    /// Bars registered after this point get no lines of their own. With no
    /// bars registered nothing is printed and the reservation stays open.
    pub fn reserve_lines(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.count;
        reserve(&mut inner, count)
    }

    /// Like [`reserve_lines`](Self::reserve_lines) with an explicit line count.
    pub fn reserve_lines_for(&self, lines: usize) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        reserve(&mut inner, lines)
    }

    /// Rewrites the line belonging to `line_offset` and puts the cursor back.
    pub(crate) fn write_line(&self, line_offset: usize, content: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let distance = inner.count.saturating_sub(line_offset);
        let seq = rewrite_line_above(distance, content);
        inner.out.write_all(seq.as_bytes())?;
        inner.out.flush()?;
        if inner.drawn.len() <= line_offset {
            inner.drawn.resize(line_offset + 1, String::new());
        }
        inner.drawn[line_offset] = content.to_string();
        Ok(())
    }

    /// Prints `text` as its own line above the bar block.
    ///
    /// Once lines are reserved, the cursor moves up to the top of the block,
    /// `text` is written there and every bar line is printed again below it.
    /// The cursor ends one row below the shifted block, so later redraws keep
    /// the same distances. Before reservation `text` is printed at the cursor.
    pub fn write_above(&self, text: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let mut seq = String::new();
        if inner.lines_reserved && inner.count > 0 {
            seq.push_str(&move_up(inner.count));
            seq.push_str(LINE_START);
            seq.push_str(text);
            seq.push_str(CLEAR_TO_END);
            seq.push('\n');
            for offset in 0..inner.count {
                match inner.drawn.get(offset) {
                    Some(line) if !line.is_empty() => seq.push_str(line),
                    _ => seq.push_str(CLEAR_TO_END),
                }
                seq.push('\n');
            }
        } else {
            seq.push_str(text);
            seq.push('\n');
        }
        inner.out.write_all(seq.as_bytes())?;
        inner.out.flush()?;
        Ok(())
    }

    /// Moves the cursor down by the distance between `line_offset` and the
    /// line below the reserved block.
    pub(crate) fn move_below(&self, line_offset: usize) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let distance = inner.count.saturating_sub(line_offset);
        inner.out.write_all(move_down(distance).as_bytes())?;
        inner.out.flush()?;
        Ok(())
    }

    /// Executes a function while holding the terminal lock.
    ///
    /// Use this to synchronize your own terminal writes with bar redraws so
    /// that neither splits the other's output. The closure must not update or
    /// draw bars of this registry, or it will deadlock.
    pub fn with_terminal_lock<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.inner.lock().unwrap();
        f()
    }
}

fn reserve(inner: &mut Inner, lines: usize) -> Result<()> {
    if inner.lines_reserved || lines == 0 {
        return Ok(());
    }
    inner.out.write_all("\n".repeat(lines).as_bytes())?;
    inner.out.flush()?;
    inner.lines_reserved = true;
    Ok(())
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("Registry")
            .field("count", &inner.count)
            .field("lines_reserved", &inner.lines_reserved)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
