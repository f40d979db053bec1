//! Stacked, in-place terminal progress bars for concurrent workers.
//!
//! See [`progress`] for the bar types and how redraws are addressed.

pub use error::{Error, Result};
pub use progress::{Backend, BarGlyphs, ProgressBar, ProgressBarBuilder, Registry};

mod error;
pub mod progress;
mod progress_bar;
