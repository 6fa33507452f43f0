use clap::Parser;

/// rake cli
#[derive(Parser, Debug)]
#[command(name = "rake")]
#[command(about = "Polite concurrent web crawler")]
#[command(version)]
pub struct RakeArgs {
    /// Sectioned seed configuration file
    #[arg(short, long, default_value = "config.rcf")]
    pub config: String,

    /// Legacy seed list, used when the config file is absent
    #[arg(long, default_value = "urls.txt")]
    pub urls_file: String,

    /// Legacy blacklist, used when the config file is absent
    #[arg(long, default_value = "blacklist.txt")]
    pub blacklist_file: String,

    /// Record log output path
    #[arg(short, long, default_value = "crawl_data.awf")]
    pub output: String,

    /// Worker task count
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Page fetches per second, process-wide
    #[arg(short, long)]
    pub rate_limit: Option<u32>,

    /// Bounded work queue capacity
    #[arg(long)]
    pub queue_size: Option<usize>,

    /// Exclusive depth bound; seeds are depth 0
    #[arg(short, long)]
    pub max_depth: Option<u32>,

    /// User agent for page and robots.txt requests
    #[arg(short, long)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Stop the crawl after this many seconds
    #[arg(long)]
    pub duration_secs: Option<u64>,
}
