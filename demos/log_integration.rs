//! Log records written next to live bars.
//!
//! Run with: cargo run --example log_integration --features log

use std::thread;
use std::time::Duration;

use log::{info, warn};
use stackbar::progress::{ProgressBar, init_log_integration};

fn main() -> stackbar::Result<()> {
    init_log_integration();

    let bar = ProgressBar::builder(50).prefix("Indexing:").build()?;
    info!("Starting indexing");

    for i in 0..50 {
        if i == 25 {
            warn!("Halfway there");
        }
        bar.update(1)?;
        thread::sleep(Duration::from_millis(40));
    }

    info!("Indexing complete");
    Ok(())
}
