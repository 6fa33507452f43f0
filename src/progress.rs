//! Carriage-return progress ticker shown while the crawl runs.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::CrawlEngine;

const TICK: Duration = Duration::from_millis(125);

/// Spawn the ticker. It repaints one status line eight times a second and
/// stops when the run's cancellation token fires.
pub fn spawn(engine: CrawlEngine, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut interval = tokio::time::interval(TICK);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    print!(
                        "\rItems left in queue: {}, Items processed so far: {}, Running Time: {:.2}s",
                        engine.queue_len(),
                        engine.processed(),
                        start.elapsed().as_secs_f64()
                    );
                    let _ = std::io::stdout().flush();
                }
            }
        }
    })
}
