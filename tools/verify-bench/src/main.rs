//! Verification benchmark CLI for screenshot-verify.
//!
//! Runs the verifier over recorded OCR dumps (Vision-style JSON) and reports
//! the outcome and how long each verification took.
//!
//! Usage:
//!   cargo run -- <ocr.json> --platform subscription          Single dump → JSON
//!   cargo run -- <ocr.json> --platform follow --at <RFC3339> Pin the clock
//!   cargo run -- --batch <directory> --platform follow       All dumps → CSV
//!   cargo run -- --init-config                               Write default config

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use chrono::{DateTime, Utc};
use screenshot_verify::config::{config_path, save_config};
use screenshot_verify::{load_config, OcrResult, Platform, ValidationOutcome, Verifier, VerifyConfig};

struct Options {
    platform: Platform,
    now: DateTime<Utc>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    for env_file in [".env.local", ".env"] {
        let path = Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break;
        }
    }
    env_logger::init();

    if args.len() < 2 {
        usage();
    }

    if args.contains(&"--init-config".to_string()) {
        init_config();
        return;
    }

    let options = Options {
        platform: flag_value(&args, "--platform")
            .map(|p| {
                p.parse().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                })
            })
            .unwrap_or(Platform::Subscription),
        now: flag_value(&args, "--at")
            .map(|at| {
                DateTime::parse_from_rfc3339(at)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|e| {
                        eprintln!("Invalid --at {}: {}", at, e);
                        process::exit(1);
                    })
            })
            .unwrap_or_else(Utc::now),
    };

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("Config error: {}", e);
        process::exit(1);
    });
    let verifier = Verifier::new(config).unwrap_or_else(|e| {
        eprintln!("Config error: {}", e);
        process::exit(1);
    });

    if let Some(dir) = flag_value(&args, "--batch") {
        run_batch(&verifier, dir, &options);
    } else if let Some(dump) = positional(&args) {
        run_single(&verifier, dump, &options);
    } else {
        usage();
    }
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  verify-bench <ocr.json> [--platform subscription|follow] [--at <RFC3339>]");
    eprintln!("  verify-bench --batch <directory> [--platform subscription|follow] [--at <RFC3339>]");
    eprintln!("  verify-bench --init-config");
    process::exit(1);
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|a| a == flag)?;
    match args.get(idx + 1) {
        Some(value) => Some(value.as_str()),
        None => {
            eprintln!("{} requires a value", flag);
            process::exit(1);
        }
    }
}

/// Flags that take a value.
const VALUE_FLAGS: [&str; 3] = ["--platform", "--at", "--batch"];

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            return Some(arg.as_str());
        }
    }
    None
}

fn init_config() {
    let Some(path) = config_path() else {
        eprintln!("Could not determine config directory");
        process::exit(1);
    };
    if path.exists() {
        eprintln!("Config already exists at {}", path.display());
        process::exit(1);
    }
    if let Err(e) = save_config(&path, &VerifyConfig::default()) {
        eprintln!("Failed to write config: {}", e);
        process::exit(1);
    }
    eprintln!("Wrote default config to {}", path.display());
}

/// Verify one dump and measure wall-clock time.
fn verify_timed(verifier: &Verifier, ocr: &OcrResult, options: &Options) -> (ValidationOutcome, u128) {
    let start = Instant::now();
    let outcome = verifier.validate_at(options.platform, ocr, options.now);
    (outcome, start.elapsed().as_micros())
}

fn run_single(verifier: &Verifier, dump_path: &str, options: &Options) {
    let ocr = OcrResult::load(Path::new(dump_path)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let (outcome, wall_us) = verify_timed(verifier, &ocr, options);
    let candidates: Vec<String> = verifier
        .extract_candidates(&ocr)
        .iter()
        .map(ToString::to_string)
        .collect();

    let report = serde_json::json!({
        "platform": options.platform,
        "at": options.now.to_rfc3339(),
        "valid": outcome.valid,
        "reason": outcome.reason.as_ref().map(ToString::to_string),
        "reasonCode": outcome.reason.as_ref().map(|r| r.code()),
        "matchedTimestamp": outcome.matched_timestamp,
        "candidates": candidates,
        "fingerprint": ocr.fingerprint(),
        "wallTimeMs": wall_us as f64 / 1000.0,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            process::exit(1);
        }
    }
}

fn run_batch(verifier: &Verifier, dir_path: &str, options: &Options) {
    let dir = Path::new(dir_path);
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(read) => read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect(),
        Err(e) => {
            eprintln!("Failed to read directory {}: {}", dir_path, e);
            process::exit(1);
        }
    };
    entries.sort();

    if entries.is_empty() {
        eprintln!("No OCR dumps found in {}", dir_path);
        process::exit(1);
    }

    println!("filename,platform,valid,reason,matched,candidates,fingerprint,wall_ms");

    let mut latencies: Vec<f64> = Vec::new();
    let mut accepted = 0usize;
    let mut failed_loads = 0usize;

    for dump_path in &entries {
        let filename = dump_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let ocr = match OcrResult::load(dump_path) {
            Ok(ocr) => ocr,
            Err(e) => {
                log::warn!("[BENCH] Skipping {}: {}", filename, e);
                failed_loads += 1;
                continue;
            }
        };

        let (outcome, wall_us) = verify_timed(verifier, &ocr, options);
        let candidates = verifier
            .extract_candidates(&ocr)
            .iter()
            .map(|c| c.raw.clone())
            .collect::<Vec<_>>()
            .join(" ");

        println!(
            "{},{},{},{},{},{},{},{:.3}",
            csv_field(&filename),
            options.platform,
            outcome.valid,
            outcome.reason.as_ref().map(|r| r.code()).unwrap_or(""),
            outcome.matched_timestamp.as_deref().unwrap_or(""),
            csv_field(&candidates),
            ocr.fingerprint(),
            wall_us as f64 / 1000.0,
        );

        if outcome.valid {
            accepted += 1;
        }
        latencies.push(wall_us as f64 / 1000.0);
        std::io::stdout().flush().ok();
    }

    eprintln!("\n--- Verification Summary ---");
    eprintln!("  Dumps processed: {}", latencies.len());
    eprintln!("  Accepted: {}", accepted);
    eprintln!("  Rejected: {}", latencies.len() - accepted);
    if failed_loads > 0 {
        eprintln!("  Unreadable: {}", failed_loads);
    }
    if !latencies.is_empty() {
        print_latency_summary(&mut latencies, 5.0);
    }
}

/// Quote a CSV field when it contains a separator or a quote.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn print_latency_summary(latencies: &mut [f64], target_ms: f64) {
    latencies.sort_by(|a, b| a.total_cmp(b));
    let median = latencies[latencies.len() / 2];
    let p99_idx = ((latencies.len() as f64 * 0.99).ceil() as usize).min(latencies.len() - 1);
    let p99 = latencies[p99_idx];
    let avg: f64 = latencies.iter().sum::<f64>() / latencies.len() as f64;

    eprintln!("  Median: {:.3}ms", median);
    eprintln!("  Average: {:.3}ms", avg);
    eprintln!("  P99: {:.3}ms", p99);
    eprintln!(
        "  Target (< {:.0}ms): {}",
        target_ms,
        if median < target_ms { "PASS" } else { "FAIL" }
    );
}
