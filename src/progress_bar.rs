use unicode_width::UnicodeWidthStr;

use crate::{Error, Result};

/// Glyphs used to draw the bar body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarGlyphs {
    /// Glyph for completed cells (default: "█")
    pub fill: String,
    /// Glyph for remaining cells (default: "-")
    pub track: String,
}

impl Default for BarGlyphs {
    fn default() -> Self {
        Self {
            fill: "█".to_string(),
            track: "-".to_string(),
        }
    }
}

impl BarGlyphs {
    /// Plain ASCII glyphs for terminals without block characters.
    pub fn ascii() -> Self {
        Self {
            fill: "#".to_string(),
            track: "-".to_string(),
        }
    }

    /// Thin line glyphs.
    pub fn thin() -> Self {
        Self {
            fill: "━".to_string(),
            track: "─".to_string(),
        }
    }

    /// Both glyphs must occupy exactly one terminal column, otherwise the bar
    /// would not fit the width reserved for it.
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, glyph) in [("fill", &self.fill), ("track", &self.track)] {
            if glyph.width() != 1 {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} glyph {glyph:?} must be one column wide"
                )));
            }
        }
        Ok(())
    }
}

/// An overshooting bar never draws more than this many widths of fill.
pub(crate) const MAX_OVERSHOOT_WIDTHS: usize = 2;

/// Draws `width` cells with `floor(width * progress / total)` of them filled.
///
/// The ratio is not clamped to 1: an overshooting bar keeps growing past
/// `width` and the track shrinks to nothing. Growth stops at
/// [`MAX_OVERSHOOT_WIDTHS`] times `width`.
pub(crate) fn bar_cells(progress: u64, total: u64, width: usize, glyphs: &BarGlyphs) -> String {
    let cap = width.saturating_mul(MAX_OVERSHOOT_WIDTHS);
    let filled = if total == 0 {
        0
    } else {
        let cells = width as u128 * progress as u128 / total as u128;
        usize::try_from(cells).unwrap_or(usize::MAX).min(cap)
    };
    let mut s = glyphs.fill.repeat(filled);
    s.push_str(&glyphs.track.repeat(width.saturating_sub(filled)));
    s
}
