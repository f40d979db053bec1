//! Escape sequences for addressing a bar's line relative to the cursor.
//!
//! These are only ever composed into output; nothing here reads terminal state.

/// Saves the cursor position (`ESC 7`).
pub const SAVE_CURSOR: &str = "\x1b7";

/// Restores the cursor position saved by [`SAVE_CURSOR`] (`ESC 8`).
pub const RESTORE_CURSOR: &str = "\x1b8";

/// Moves the cursor to the start of the current line.
pub const LINE_START: &str = "\r";

/// Clears from the cursor to the end of the line (`ESC [ K`).
pub const CLEAR_TO_END: &str = "\x1b[K";

/// Moves the cursor up `n` lines (`ESC [ n A`).
pub fn move_up(n: usize) -> String {
    format!("\x1b[{n}A")
}

/// Moves the cursor down `n` lines (`ESC [ n B`).
pub fn move_down(n: usize) -> String {
    format!("\x1b[{n}B")
}

/// Composes the full in-place rewrite of a line `distance` rows above the
/// cursor, leaving the cursor where it started.
pub fn rewrite_line_above(distance: usize, content: &str) -> String {
    format!(
        "{SAVE_CURSOR}{}{LINE_START}{content}{RESTORE_CURSOR}",
        move_up(distance)
    )
}
