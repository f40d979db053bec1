//! Two stacked bars fed by a pool of workers with randomized delays.
//!
//! Each request ticks the first bar when it starts and the second when it
//! finishes, so the second bar trails the first.
//!
//! Run with: cargo run --example concurrent_workers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::*;
use stackbar::progress::ProgressBar;

const REQUESTS: usize = 2_000;
const WORKERS: usize = 64;

fn main() -> stackbar::Result<()> {
    println!("Let's test the stacked progress bars!");

    let started = Arc::new(
        ProgressBar::builder(REQUESTS as u64)
            .prefix("Started: ")
            .build()?,
    );
    let finished = Arc::new(
        ProgressBar::builder(REQUESTS as u64)
            .prefix("Finished:")
            .build()?,
    );

    let next = Arc::new(AtomicUsize::new(0));
    let t1 = Instant::now();
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let (started, finished, next) =
                (Arc::clone(&started), Arc::clone(&finished), Arc::clone(&next));
            thread::spawn(move || -> stackbar::Result<()> {
                let mut rng = rand::rng();
                while next.fetch_add(1, Ordering::Relaxed) < REQUESTS {
                    started.update(1)?;
                    thread::sleep(Duration::from_millis(rng.random_range(0..50)));
                    finished.update(1)?;
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked")?;
    }

    println!("Total time: {:.2} seconds", t1.elapsed().as_secs_f64());
    Ok(())
}
