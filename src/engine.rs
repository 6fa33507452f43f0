//! The crawl engine: visited map, bounded work queue, worker pool and run
//! lifecycle.
//!
//! A URL moves through exactly one path: enqueue (visited insert) → dequeue
//! by a worker → admission / fetch / extract / persist → children enqueued
//! at depth+1. Once a URL enters the visited map it never re-enters the
//! queue, which is what makes every other guarantee cheap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::admission::AdmissionFilter;
use crate::config::{CrawlConfig, SeedConfig};
use crate::extractor;
use crate::limiter::RateLimiter;
use crate::network::{FetchError, HttpClient};
use crate::record_log::RecordLog;
use crate::url_utils;

/// Final tallies for one run.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// URLs fully processed into a record
    pub processed: u64,
    /// URLs ever admitted to the visited map
    pub discovered: usize,
    pub duration: Duration,
}

/// One crawl run. Clones share all state, so a clone per worker task is the
/// whole distribution story.
#[derive(Clone)]
pub struct CrawlEngine {
    config: Arc<CrawlConfig>,
    admission: Arc<AdmissionFilter>,
    limiter: Arc<RateLimiter>,
    http: Arc<HttpClient>,
    log: Arc<RecordLog>,
    /// URL → first-seen depth. The lock covers membership test and insert
    /// together; enqueue gating needs test-and-set semantics.
    visited: Arc<Mutex<HashMap<String, u32>>>,
    queue_tx: flume::Sender<String>,
    queue_rx: flume::Receiver<String>,
    /// URLs enqueued but not yet fully processed. Zero means done.
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    processed: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl CrawlEngine {
    pub fn new(
        config: CrawlConfig,
        seeds: &SeedConfig,
        log: Arc<RecordLog>,
    ) -> Result<Self, FetchError> {
        let http = Arc::new(HttpClient::new(&config.user_agent, config.timeout_secs)?);
        let admission = Arc::new(AdmissionFilter::new(
            seeds.blacklist.clone(),
            seeds.bypass.iter().cloned(),
            Arc::clone(&http),
            config.user_agent.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let (queue_tx, queue_rx) = flume::bounded(config.queue_size);

        Ok(Self {
            config: Arc::new(config),
            admission,
            limiter,
            http,
            log,
            visited: Arc::new(Mutex::new(HashMap::new())),
            queue_tx,
            queue_rx,
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            processed: Arc::new(AtomicU64::new(0)),
            cancel: CancellationToken::new(),
        })
    }

    /// Token observed by every worker; cancel it to stop the run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// URLs waiting in the queue right now
    pub fn queue_len(&self) -> usize {
        self.queue_rx.len()
    }

    /// URLs fully processed so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// First-seen depth of a URL, if it was ever admitted.
    pub fn visited_depth(&self, url: &str) -> Option<u32> {
        self.visited.lock().get(url).copied()
    }

    /// Run the crawl to completion or cancellation.
    ///
    /// Spawns the worker pool, seeds the queue at depth 0, then waits for
    /// the pending counter to drain or the token to fire. Workers are
    /// released by cancelling the token either way.
    pub async fn start(&self, seeds: &[String]) -> CrawlSummary {
        let started = Instant::now();
        tracing::info!(
            workers = self.config.worker_count,
            rate_limit = self.config.rate_limit,
            max_depth = self.config.max_depth,
            "crawl started"
        );

        let mut workers = Vec::with_capacity(self.config.worker_count);
        for _ in 0..self.config.worker_count {
            let worker = self.clone();
            workers.push(tokio::spawn(async move { worker.run_worker().await }));
        }

        for seed in seeds {
            self.enqueue(seed.clone(), 0).await;
        }

        loop {
            if self.pending.load(Ordering::Acquire) == 0 {
                tracing::info!("all enqueued URLs processed");
                break;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("crawl cancelled");
                    break;
                }
                _ = self.idle.notified() => {}
            }
        }

        // Close the queue so idle workers fall out of their receive.
        self.cancel.cancel();
        for worker in workers {
            let _ = worker.await;
        }

        CrawlSummary {
            processed: self.processed.load(Ordering::Relaxed),
            discovered: self.visited.lock().len(),
            duration: started.elapsed(),
        }
    }

    /// Gate and enqueue one URL.
    ///
    /// The visited lock covers the membership test and the insert; the send
    /// itself happens outside it so a full queue blocks only the producing
    /// worker, not every enqueue in the process.
    async fn enqueue(&self, url: String, depth: u32) {
        let url = match url_utils::normalize(&url) {
            Some(u) => u,
            None => return,
        };
        if depth >= self.config.max_depth {
            return;
        }

        {
            let mut visited = self.visited.lock();
            if visited.contains_key(&url) || self.admission.is_blacklisted(&url) {
                return;
            }
            visited.insert(url.clone(), depth);
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(%url, depth, "queued");
        if self.queue_tx.send_async(url).await.is_err() {
            // Queue closed mid-shutdown; the URL stays in visited but is
            // no longer outstanding work.
            self.finish_one();
        }
    }

    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_one();
        }
    }

    async fn run_worker(&self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = self.queue_rx.recv_async() => {
                    match received {
                        Ok(url) => {
                            self.process_one(&url).await;
                            self.finish_one();
                        }
                        Err(_) => break,
                    }
                }
            }
        }
    }

    /// Fetch, extract and persist one URL, then feed its links back in.
    async fn process_one(&self, url: &str) {
        if !self.limiter.wait(&self.cancel).await {
            return;
        }

        if !self.admission.can_crawl(url).await {
            tracing::info!(%url, "blocked by robots.txt");
            return;
        }
        if self.admission.is_blacklisted(url) {
            tracing::info!(%url, "blacklisted");
            return;
        }

        let page = match self.http.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(%url, error = %e, "fetch failed");
                return;
            }
        };

        let (record, links) = extractor::extract(url, &page);
        if let Err(e) = self.log.save(&record) {
            tracing::warn!(%url, error = %e, "record not persisted");
        }

        let depth = self.visited_depth(url).unwrap_or(0);
        for link in links {
            self.enqueue(link, depth + 1).await;
        }

        self.processed.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%url, depth, "crawled");
    }
}
