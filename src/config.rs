//! Crawl configuration presets and seed-file loading.
//!
//! Seeds come from the sectioned `config.rcf` format, with the legacy pair
//! `urls.txt` + `blacklist.txt` still accepted as an equivalent.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Tunables for a single crawl run. Immutable once the engine is built.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub worker_count: usize,
    /// Page fetches per second, globally
    pub rate_limit: u32,
    /// Capacity of the bounded work queue
    pub queue_size: usize,
    /// Exclusive upper bound on enqueued depth; seeds sit at depth 0
    pub max_depth: u32,
    pub user_agent: String,
    /// Total per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            worker_count: 10,
            rate_limit: 5,
            queue_size: 100_000,
            max_depth: 10,
            user_agent: "AmberRake".to_string(),
            timeout_secs: 10,
        }
    }
}

impl CrawlConfig {
    /// Small footprint for constrained hosts
    pub fn low_resource() -> Self {
        Self {
            worker_count: 2,
            rate_limit: 1,
            queue_size: 1_000,
            ..Self::default()
        }
    }

    /// Wider pool and queue for long unattended runs
    pub fn production() -> Self {
        Self {
            worker_count: 20,
            rate_limit: 10,
            queue_size: 1_000_000,
            ..Self::default()
        }
    }
}

/// Seed URLs plus the two admission lists, as loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct SeedConfig {
    pub urls: Vec<String>,
    pub blacklist: Vec<String>,
    pub bypass: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no seed URLs found in {path}")]
    NoSeeds { path: PathBuf },
}

/// Parse the sectioned `config.rcf` format.
///
/// Blank lines and `#` comments are skipped. A line ending in `:` opens a
/// section; `Websites`, `Blacklist` and `Bypass` are recognized and hold
/// whitespace-separated values. Unknown sections are ignored.
pub fn read_rcf(path: impl AsRef<Path>) -> Result<SeedConfig, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seeds = SeedConfig::default();
    let mut section = String::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_suffix(':') {
            section = name.trim().to_string();
            continue;
        }

        let values = line.split_whitespace().map(str::to_string);
        match section.as_str() {
            "Websites" => seeds.urls.extend(values),
            "Blacklist" => seeds.blacklist.extend(values),
            "Bypass" => seeds.bypass.extend(values),
            _ => {}
        }
    }

    if seeds.urls.is_empty() {
        return Err(ConfigError::NoSeeds {
            path: path.to_path_buf(),
        });
    }
    Ok(seeds)
}

/// Load the legacy `urls.txt` + `blacklist.txt` pair.
///
/// One value per line in each file. A missing blacklist file is fine;
/// missing seeds are not.
pub fn read_legacy(
    urls_path: impl AsRef<Path>,
    blacklist_path: impl AsRef<Path>,
) -> Result<SeedConfig, ConfigError> {
    let urls_path = urls_path.as_ref();
    let urls = read_lines(urls_path)?;
    if urls.is_empty() {
        return Err(ConfigError::NoSeeds {
            path: urls_path.to_path_buf(),
        });
    }

    let blacklist = if blacklist_path.as_ref().exists() {
        read_lines(blacklist_path.as_ref())?
    } else {
        Vec::new()
    };

    Ok(SeedConfig {
        urls,
        blacklist,
        bypass: Vec::new(),
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if !line.is_empty() {
            out.push(line.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_rcf_sections() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.rcf",
            "# comment\n\
             Websites:\n\
             http://a.local/ http://b.local/\n\
             http://c.local/\n\
             Blacklist:\n\
             /private /tmp\n\
             Bypass:\n\
             a.local\n",
        );

        let seeds = read_rcf(&path).unwrap();
        assert_eq!(
            seeds.urls,
            vec!["http://a.local/", "http://b.local/", "http://c.local/"]
        );
        assert_eq!(seeds.blacklist, vec!["/private", "/tmp"]);
        assert_eq!(seeds.bypass, vec!["a.local"]);
    }

    #[test]
    fn test_read_rcf_ignores_unknown_sections() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.rcf",
            "Websites:\nhttp://a.local/\nFrobnicate:\nignored values here\n",
        );

        let seeds = read_rcf(&path).unwrap();
        assert_eq!(seeds.urls, vec!["http://a.local/"]);
        assert!(seeds.blacklist.is_empty());
    }

    #[test]
    fn test_read_rcf_without_seeds_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.rcf", "Blacklist:\n/x\n");
        assert!(matches!(
            read_rcf(&path),
            Err(ConfigError::NoSeeds { .. })
        ));
    }

    #[test]
    fn test_read_legacy_pair() {
        let dir = TempDir::new().unwrap();
        let urls = write_file(&dir, "urls.txt", "http://a.local/\nhttp://b.local/\n");
        let blacklist = write_file(&dir, "blacklist.txt", "/secret\n");

        let seeds = read_legacy(&urls, &blacklist).unwrap();
        assert_eq!(seeds.urls.len(), 2);
        assert_eq!(seeds.blacklist, vec!["/secret"]);
        assert!(seeds.bypass.is_empty());
    }

    #[test]
    fn test_read_legacy_missing_blacklist_is_fine() {
        let dir = TempDir::new().unwrap();
        let urls = write_file(&dir, "urls.txt", "http://a.local/\n");

        let seeds = read_legacy(&urls, dir.path().join("blacklist.txt")).unwrap();
        assert!(seeds.blacklist.is_empty());
    }

    #[test]
    fn test_missing_config_is_an_io_error() {
        assert!(matches!(
            read_rcf("/definitely/not/here.rcf"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_config_presets() {
        let default = CrawlConfig::default();
        assert_eq!(default.worker_count, 10);
        assert_eq!(default.rate_limit, 5);
        assert_eq!(default.user_agent, "AmberRake");

        let low = CrawlConfig::low_resource();
        assert_eq!(low.worker_count, 2);
        assert_eq!(low.queue_size, 1_000);

        let prod = CrawlConfig::production();
        assert_eq!(prod.rate_limit, 10);
        assert_eq!(prod.queue_size, 1_000_000);
    }
}
