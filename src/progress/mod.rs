//! Stacked progress bars redrawn in place.
//!
//! Each bar owns one terminal line. Bars are registered in creation order and
//! every redraw jumps to the bar's line with cursor-addressing escape codes,
//! rewrites it, and jumps back, so several bars can be updated from
//! independent workers without disturbing one another.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stackbar::progress::ProgressBar;
//!
//! # fn main() -> stackbar::Result<()> {
//! let bar = ProgressBar::builder(100).prefix("Download:").build()?;
//! for _ in 0..100 {
//!     bar.update(1)?;
//! }
//! assert!(bar.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! # Multiple Bars
//!
//! Bars are shared across workers through an [`Arc`](std::sync::Arc):
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::thread;
//! use stackbar::progress::ProgressBar;
//!
//! # fn main() -> stackbar::Result<()> {
//! let fetch = Arc::new(ProgressBar::builder(50).prefix("Fetch:").build()?);
//! let parse = Arc::new(ProgressBar::builder(50).prefix("Parse:").build()?);
//!
//! let handles: Vec<_> = (0..5)
//!     .map(|_| {
//!         let (fetch, parse) = (Arc::clone(&fetch), Arc::clone(&parse));
//!         thread::spawn(move || -> stackbar::Result<()> {
//!             for _ in 0..10 {
//!                 fetch.inc()?;
//!                 parse.inc()?;
//!             }
//!             Ok(())
//!         })
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Line Layout
//!
//! ```text
//!  row  ┌──────────────────────────────────────────────┐
//!   0   │ Fetch: |██████----| 30/50 00:02<00:01 (...)  │  line_offset 0, up 2
//!   1   │ Parse: |████------| 20/50 00:02<00:02 (...)  │  line_offset 1, up 1
//!   2   │ ▮  cursor rests here after the reservation   │
//!       └──────────────────────────────────────────────┘
//! ```
//!
//! The first [`ProgressBar::update`] of any bar prints one blank line per bar
//! registered so far. A redraw of the bar at `line_offset` saves the cursor,
//! moves up `count - line_offset` lines, rewrites the line and restores the
//! cursor. Reaching the total moves the cursor down by the same distance.
//!
//! Bars created after the reservation get no blank line of their own and
//! shift the distance of every earlier bar by one; create all bars up front.
//!
//! # Threading Model
//!
//! | Lock | Guards |
//! |------|--------|
//! | [`Registry`] mutex | `count`, `lines_reserved` and the output stream |
//! | per-bar mutex | progress, timing snapshot, rate and state |
//!
//! A bar takes its own lock first and the registry lock second. Every escape
//! sequence is written while the registry lock is held, so redraws of
//! different bars never interleave. [`Registry::with_terminal_lock`] lets
//! other code print without splitting a redraw.
//!
//! # Backends
//!
//! - [`Backend::Terminal`] - in-place redraw (default on a terminal)
//! - [`Backend::RichDisplay`] - forwards snapshots to a [`RichDisplay`]
//! - [`Backend::Headless`] - tracks progress and draws nothing
//!
//! # Environment Variables
//!
//! - `STACKBAR_NO_PROGRESS=1` - force [`Backend::Headless`].
//! - `STACKBAR_BACKEND=terminal|rich_display|headless` - force a backend.
//! - `STACKBAR_TRACE_LOG=path` - append every terminal redraw to `path` as
//!   JSONL. `STACKBAR_TRACE_RAW=1` keeps escape codes in the log.

mod backend;
mod bar;
mod cursor;
mod diagnostics;
mod format;
mod rate;
mod registry;
mod render;

#[cfg(feature = "log")]
mod log;

// Re-export public API
pub use crate::progress_bar::BarGlyphs;
pub use backend::{Backend, selected as selected_backend, set_backend};
pub use bar::{BarSnapshot, BarState, ProgressBar, ProgressBarBuilder, RichDisplay};
pub use cursor::{CLEAR_TO_END, LINE_START, RESTORE_CURSOR, SAVE_CURSOR, move_down, move_up};
pub use format::format_time;
pub use rate::{estimate_rate, eta};
pub use registry::Registry;
pub use render::{LineModel, MIN_BAR_WIDTH, bar_width, render_line};

#[cfg(feature = "log")]
pub use self::log::{
    ProgressLogger, init_log_integration, init_log_integration_with_level, try_init_log_integration,
};
