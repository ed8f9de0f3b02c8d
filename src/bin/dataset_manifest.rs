use secrace::dataset::{analyze_file, default_manifest_path};
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/metrics.json".to_string());

    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (manifest, report) = match analyze_file(PathBuf::from(&path).as_path(), now_ts) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("analysis failed: {:#}", err);
            std::process::exit(1);
        }
    };

    if !report.warnings.is_empty() {
        eprintln!("{} data quality warning(s):", report.warnings.len());
        for w in &report.warnings {
            eprintln!("  {}", w);
        }
    }

    let out_path = default_manifest_path(PathBuf::from(&path).as_path());
    let payload = json!({
        "manifest": manifest,
        "report": report
    });
    let pretty = match serde_json::to_string_pretty(&payload) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to serialize manifest: {}", err);
            std::process::exit(2);
        }
    };
    if let Err(err) = fs::write(&out_path, pretty) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(3);
    }
    println!("wrote manifest {}", out_path.display());
}
