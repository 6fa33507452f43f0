pub mod admission;
pub mod cli;
pub mod compactor;
pub mod config;
pub mod engine;
pub mod extractor;
pub mod limiter;
pub mod logging;
pub mod models;
pub mod network;
pub mod progress;
pub mod record_log;
pub mod url_utils;

// Re-export main types for library usage
pub use admission::AdmissionFilter;
pub use compactor::{CompactError, Compactor};
pub use config::{ConfigError, CrawlConfig, SeedConfig};
pub use engine::{CrawlEngine, CrawlSummary};
pub use limiter::RateLimiter;
pub use models::{MetaTag, PageRecord};
pub use network::{FetchError, FetchedPage, HttpClient};
pub use record_log::{FrameReader, LogError, RecordLog, MAX_FRAME_LEN};
