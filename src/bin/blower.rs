use std::path::PathBuf;

use clap::Parser;

use amber_rake::compactor::Compactor;
use amber_rake::logging;

/// blower cli
#[derive(Parser, Debug)]
#[command(name = "blower")]
#[command(about = "Merge and deduplicate crawler record logs")]
#[command(version)]
struct BlowerArgs {
    /// Explicit .awf inputs; when empty, every .awf under --input-dir
    inputs: Vec<String>,

    /// Directory scanned for .awf files
    #[arg(short, long, default_value = "./data")]
    input_dir: String,

    /// Combined record log output
    #[arg(short, long, default_value = "database.awf")]
    output: String,

    /// Human-readable dump output
    #[arg(short, long, default_value = "database.json")]
    json: String,
}

/// Collect the input set: explicit paths win, otherwise every `.awf`
/// under the input directory, in name order for stable first-wins dedup.
fn collect_inputs(args: &BlowerArgs) -> std::io::Result<Vec<PathBuf>> {
    if !args.inputs.is_empty() {
        return Ok(args.inputs.iter().map(PathBuf::from).collect());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&args.input_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "awf") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn main() {
    let args = BlowerArgs::parse();
    logging::init();

    let inputs = match collect_inputs(&args) {
        Ok(inputs) if !inputs.is_empty() => inputs,
        Ok(_) => {
            eprintln!("No .awf files found in {}", args.input_dir);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Could not scan {}: {e}", args.input_dir);
            std::process::exit(1);
        }
    };

    let mut compactor = Compactor::new();
    for path in &inputs {
        // One corrupt file poisons the merged output, so stop right away.
        if let Err(e) = compactor.ingest_file(path) {
            eprintln!("Error processing {}: {e}", path.display());
            std::process::exit(1);
        }
    }

    if let Err(e) = compactor.write_combined(&args.output) {
        eprintln!("Error saving combined log: {e}");
        std::process::exit(1);
    }
    if let Err(e) = compactor.write_json_dump(&args.json) {
        eprintln!("Error saving json dump: {e}");
        std::process::exit(1);
    }

    println!(
        "Combined {} unique records from {} file(s) into {} and {}",
        compactor.len(),
        inputs.len(),
        args.output,
        args.json
    );
}
