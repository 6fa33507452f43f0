mod admission;
mod cli;
mod config;
mod engine;
mod extractor;
mod limiter;
mod logging;
mod models;
mod network;
mod progress;
mod record_log;
mod url_utils;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use cli::RakeArgs;
use config::{CrawlConfig, SeedConfig};
use engine::CrawlEngine;
use record_log::RecordLog;

const BANNER: &str = r#"
 _____       _
|  __ \     | |
| |__) |__ _| | _____
|  _  // _ \| |/ / _ \
| | \ \ (_| |   <  __/
|_|  \_\__,_|_|\_\___|

Welcome to Rake, the web crawler!
"#;

fn load_seeds(args: &RakeArgs) -> Result<SeedConfig, config::ConfigError> {
    if Path::new(&args.config).exists() {
        config::read_rcf(&args.config)
    } else {
        config::read_legacy(&args.urls_file, &args.blacklist_file)
    }
}

fn build_config(args: &RakeArgs) -> CrawlConfig {
    let mut cfg = CrawlConfig::default();
    if let Some(workers) = args.workers {
        cfg.worker_count = workers;
    }
    if let Some(rate) = args.rate_limit {
        cfg.rate_limit = rate;
    }
    if let Some(queue_size) = args.queue_size {
        cfg.queue_size = queue_size;
    }
    if let Some(depth) = args.max_depth {
        cfg.max_depth = depth;
    }
    if let Some(ref agent) = args.user_agent {
        cfg.user_agent = agent.clone();
    }
    if let Some(timeout) = args.timeout {
        cfg.timeout_secs = timeout;
    }
    cfg
}

/// Flush and close the record log on SIGINT/SIGTERM, then exit cleanly.
/// This is the durability point for everything under the buffer threshold.
fn spawn_signal_handler(log: Arc<RecordLog>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(_) => std::future::pending().await,
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }

        println!("\n[signal received] flushing records before exit...");
        log.close();
        println!("[storage closed]");
        std::process::exit(0);
    });
}

#[tokio::main]
async fn main() {
    let args = RakeArgs::parse();
    logging::init();

    println!("{BANNER}");

    let seeds = match load_seeds(&args) {
        Ok(seeds) => seeds,
        Err(e) => {
            tracing::error!(error = %e, "could not load seed configuration");
            std::process::exit(1);
        }
    };

    let cfg = build_config(&args);
    println!(
        "Loaded configuration: {} workers, rate limit: {} requests/sec",
        cfg.worker_count, cfg.rate_limit
    );
    println!("Starting URLs: {:?}", seeds.urls);

    let log = Arc::new(RecordLog::new(&args.output));
    let engine = match CrawlEngine::new(cfg, &seeds, Arc::clone(&log)) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "could not build HTTP client");
            std::process::exit(1);
        }
    };

    spawn_signal_handler(Arc::clone(&log));

    let cancel = engine.cancellation_token();
    if let Some(secs) = args.duration_secs {
        let deadline_token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::info!(limit_secs = secs, "duration limit reached");
            deadline_token.cancel();
        });
    }

    let ticker = progress::spawn(engine.clone(), cancel);

    let summary = engine.start(&seeds.urls).await;
    let _ = ticker.await;
    log.close();

    println!(
        "\nCrawling complete. {} pages saved to {} ({} URLs discovered, {:.2}s)",
        summary.processed,
        args.output,
        summary.discovered,
        summary.duration.as_secs_f64()
    );
}
