// CLI entry point for headless delve runs.
//
// Generates one world, digs from the surface to every room occupant, and
// prints a summary. See `scenario.rs` for what a run does.
//
// Usage:
//   delve [OPTIONS]
//     --config <PATH>     World config JSON (default: built-in defaults)
//     --seed <N>          World seed (default: 1)
//     --max-steps <N>     Step cap per digger (default: 10000)
//     --json              Print the report as JSON
//
// Logging goes to stderr and honors `RUST_LOG` (default level: info).

use delve_headless::run_scenario;
use delve_sim::config::WorldConfig;

struct Args {
    config: Option<String>,
    seed: u64,
    max_steps: usize,
    json: bool,
}

fn main() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => WorldConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config {path}: {e}");
            std::process::exit(1);
        }),
        None => WorldConfig::default(),
    };

    let report = match run_scenario(&config, args.seed, args.max_steps) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("World generation failed: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("{report}");
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching, with
/// no clap dependency.
fn parse_args() -> Args {
    let mut parsed = Args {
        config: None,
        seed: 1,
        max_steps: 10_000,
        json: false,
    };
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                parsed.config = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                parsed.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a non-negative integer");
                    std::process::exit(1);
                });
            }
            "--max-steps" => {
                i += 1;
                parsed.max_steps = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--max-steps requires a non-negative integer");
                    std::process::exit(1);
                });
            }
            "--json" => parsed.json = true,
            "--help" | "-h" => {
                println!("Usage: delve [--config <PATH>] [--seed <N>] [--max-steps <N>] [--json]");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}
