//! Line rendering for a single bar.
//!
//! Everything here is pure: the caller supplies the clock readings and the
//! computed rate, and gets back the text to place on the bar's line.

use unicode_width::UnicodeWidthStr;

use crate::progress_bar::{BarGlyphs, bar_cells};

use super::cursor::CLEAR_TO_END;
use super::format::{format_rate, format_time};

/// Narrowest bar body ever drawn.
pub const MIN_BAR_WIDTH: usize = 10;

/// Columns kept free for the counters, times and rate around the bar body.
const FIXED_OVERHEAD: usize = 40;

/// Inputs for one rendered line.
#[derive(Debug, Clone)]
pub struct LineModel<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub progress: u64,
    pub total: u64,
    pub width: usize,
    pub glyphs: &'a BarGlyphs,
    pub elapsed: f64,
    pub remaining: f64,
    pub rate: f64,
}

/// Width of the bar body for a terminal `columns` wide.
///
/// Computed once per bar; a later terminal resize does not change it.
pub fn bar_width(columns: usize, prefix: &str, suffix: &str, total: u64) -> usize {
    let reserved = prefix.width() + suffix.width() + total.to_string().len() + FIXED_OVERHEAD;
    columns.saturating_sub(reserved).max(MIN_BAR_WIDTH)
}

/// Renders `{prefix} |{bar}| {progress}/{total} {elapsed}<{remaining} ({rate} it/s) {suffix}`
/// followed by a clear-to-end-of-line, which wipes leftovers of a longer
/// previous render.
pub fn render_line(model: &LineModel<'_>) -> String {
    let bar = bar_cells(model.progress, model.total, model.width, model.glyphs);
    let remaining = if model.progress > 0 {
        format_time(model.remaining)
    } else {
        format_time(0.0)
    };
    format!(
        "{} |{}| {}/{} {}<{} ({} it/s) {}{}",
        model.prefix,
        bar,
        model.progress,
        model.total,
        format_time(model.elapsed),
        remaining,
        format_rate(model.rate),
        model.suffix,
        CLEAR_TO_END,
    )
}
