use tempfile::TempDir;

use amber_rake::compactor::Compactor;
use amber_rake::models::{MetaTag, PageRecord};
use amber_rake::record_log::{FrameReader, RecordLog};

fn record(url: &str, title: &str, modified: &str) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        title: title.to_string(),
        description: format!("description of {title}"),
        meta: vec![MetaTag {
            name: "generator".to_string(),
            content: "rake-test".to_string(),
        }],
        last_modified: modified.parse().unwrap(),
        language: "en".to_string(),
        favicon: String::new(),
    }
}

fn write_log(path: &std::path::Path, records: &[PageRecord]) {
    let log = RecordLog::new(path);
    for r in records {
        log.save(r).unwrap();
    }
    log.close();
}

fn read_log(path: &std::path::Path) -> Vec<PageRecord> {
    let mut reader = FrameReader::open(path).unwrap();
    let mut out = Vec::new();
    while let Some(payload) = reader.read_frame().unwrap() {
        out.push(rmp_serde::from_slice(&payload).unwrap());
    }
    out
}

/// Two runs crawled the same site; the merged output keeps the first
/// occurrence of each URL and the combined log is itself a valid log.
#[test]
fn test_merge_two_runs_end_to_end() {
    let dir = TempDir::new().unwrap();
    let run1 = dir.path().join("run1.awf");
    let run2 = dir.path().join("run2.awf");

    write_log(
        &run1,
        &[
            record("http://site.local", "Home (run 1)", "2024-01-10T00:00:00Z"),
            record("http://site.local/a", "Page A", "2024-01-10T00:05:00Z"),
        ],
    );
    write_log(
        &run2,
        &[
            record("http://site.local", "Home (run 2)", "2024-02-10T00:00:00Z"),
            record("http://site.local/b", "Page B", "2024-02-10T00:05:00Z"),
        ],
    );

    let mut compactor = Compactor::new();
    compactor.ingest_file(&run1).unwrap();
    compactor.ingest_file(&run2).unwrap();

    let combined = dir.path().join("database.awf");
    let json = dir.path().join("database.json");
    compactor.write_combined(&combined).unwrap();
    compactor.write_json_dump(&json).unwrap();

    let merged = read_log(&combined);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].title, "Home (run 1)");

    let urls: Vec<&str> = merged.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["http://site.local", "http://site.local/a", "http://site.local/b"]
    );

    // Dump is most-recent-first with blank-line separators.
    let text = std::fs::read_to_string(&json).unwrap();
    let b_at = text.find("Page B").unwrap();
    let home_at = text.find("Home (run 1)").unwrap();
    assert!(b_at < home_at);
    assert_eq!(text.matches("\n\n").count(), 3);
}

/// Compacting the compactor's own output with the original inputs yields
/// the same URL set again.
#[test]
fn test_dedup_idempotence() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.awf");
    write_log(
        &input,
        &[
            record("http://site.local/1", "one", "2024-01-01T00:00:00Z"),
            record("http://site.local/2", "two", "2024-01-02T00:00:00Z"),
            record("http://site.local/3", "three", "2024-01-03T00:00:00Z"),
        ],
    );

    let mut first = Compactor::new();
    first.ingest_file(&input).unwrap();
    let pass1 = dir.path().join("pass1.awf");
    first.write_combined(&pass1).unwrap();

    let mut second = Compactor::new();
    second.ingest_file(&pass1).unwrap();
    second.ingest_file(&input).unwrap();
    let pass2 = dir.path().join("pass2.awf");
    second.write_combined(&pass2).unwrap();

    let urls1: Vec<String> = read_log(&pass1).into_iter().map(|r| r.url).collect();
    let urls2: Vec<String> = read_log(&pass2).into_iter().map(|r| r.url).collect();
    assert_eq!(urls1, urls2);
}

/// A corrupt input anywhere aborts the merge; nothing ingested from the
/// bad file survives into outputs.
#[test]
fn test_corrupt_input_aborts_merge() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.awf");
    write_log(
        &good,
        &[record("http://site.local", "fine", "2024-01-01T00:00:00Z")],
    );

    let bad = dir.path().join("bad.awf");
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(50u64).to_le_bytes());
    bytes.extend_from_slice(b"short");
    std::fs::write(&bad, &bytes).unwrap();

    let mut compactor = Compactor::new();
    compactor.ingest_file(&good).unwrap();
    assert!(compactor.ingest_file(&bad).is_err());
}
