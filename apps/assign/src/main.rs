// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: assign every window of a building model to a room.
//!
//! Reads a JSON building model, resolves each window to the room it opens
//! into, writes the room code into the window comments and prints a summary.
//!
//! Usage:
//!   assign-window-rooms <model.json> [options]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ifc_lite_spaces::{
    AssignmentReport, BuildingModel, LengthUnit, SpaceIndex, WindowCountBucket,
};

mod config;

use config::Config;

/// Parsed command line.
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    report_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let argv: Vec<String> = env::args().collect();

    if argv.len() < 2 || argv[1] == "--help" || argv[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let mut config = Config::from_env();
    let args = parse_args(&argv, &mut config)?;

    init_logging(config.json_logs);

    tracing::info!(
        input = %args.input.display(),
        unit = %config.unit,
        fallback = config.fallback_scan,
        worker_threads = config.worker_threads,
        "Starting window assignment"
    );

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to initialize thread pool")?;

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read model '{}'", args.input.display()))?;
    let mut model = BuildingModel::from_json(&json)
        .with_context(|| format!("Cannot parse model '{}'", args.input.display()))?;

    println!(
        "Model: {} levels, {} rooms, {} windows",
        model.levels.len(),
        model.rooms.len(),
        model.windows.len()
    );

    let assign_config = config.assign_config();
    let index = SpaceIndex::build(&model.rooms, assign_config.cell_size)
        .context("Cannot build room index")?;
    if !index.skipped().is_empty() {
        println!(
            "Skipped {} rooms with unusable boundaries",
            index.skipped().len()
        );
    }

    let run = ifc_lite_spaces::assign_with_query(&model, &index, &assign_config);
    let report = AssignmentReport::build(&model, &run);

    let codes = run.room_codes(&model.rooms);
    let written = model
        .apply_room_codes(&codes)
        .context("Cannot write room codes")?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let out_json = model.to_json_pretty().context("Cannot serialize model")?;
    fs::write(&output, out_json)
        .with_context(|| format!("Cannot write model '{}'", output.display()))?;

    print_summary(&model, &report, written);
    println!();
    println!("Updated model written to {}", output.display());

    if let Some(path) = args.report_json {
        let report_json =
            serde_json::to_string_pretty(&report).context("Cannot serialize report")?;
        fs::write(&path, report_json)
            .with_context(|| format!("Cannot write report '{}'", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn parse_args(argv: &[String], config: &mut Config) -> Result<Args> {
    if argv[1].starts_with("--") {
        print_usage();
        bail!("Expected the model path before any option, got {}", argv[1]);
    }

    let mut args = Args {
        input: PathBuf::from(&argv[1]),
        output: None,
        report_json: None,
    };

    let mut i = 2;
    while i < argv.len() {
        match argv[i].as_str() {
            "--output" => {
                args.output = Some(PathBuf::from(value(argv, &mut i)?));
            }
            "--report-json" => {
                args.report_json = Some(PathBuf::from(value(argv, &mut i)?));
            }
            "--unit" => {
                config.unit = value(argv, &mut i)?
                    .parse::<LengthUnit>()
                    .map_err(anyhow::Error::msg)?;
            }
            "--exclude" => {
                config.exclusion_marker = Some(value(argv, &mut i)?.to_string());
            }
            "--cell-size" => {
                let raw = value(argv, &mut i)?;
                config.cell_size = Some(
                    raw.parse()
                        .with_context(|| format!("Invalid cell size '{}'", raw))?,
                );
            }
            "--no-fallback" => {
                config.fallback_scan = false;
            }
            "--json-logs" => {
                config.json_logs = true;
            }
            other => {
                print_usage();
                bail!("Unknown option: {}", other);
            }
        }
        i += 1;
    }

    Ok(args)
}

/// Value following the option at `i`; advances `i` past it.
fn value<'a>(argv: &'a [String], i: &mut usize) -> Result<&'a str> {
    let option = &argv[*i];
    *i += 1;
    argv.get(*i)
        .map(String::as_str)
        .with_context(|| format!("Missing value for {}", option))
}

fn init_logging(json: bool) {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "warn,ifc_lite_spaces=info,assign_window_rooms=info".into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// `plan.json` -> `plan.rooms.json`, next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".into());
    input.with_file_name(format!("{}.rooms.json", stem))
}

fn print_summary(model: &BuildingModel, report: &AssignmentReport, written: usize) {
    println!();
    println!("=== Window Assignment ===");
    println!("  Assigned:   {}", report.assigned_count);
    println!("  Unassigned: {}", report.unassigned.len());
    println!("  Excluded:   {}", report.excluded.len());
    println!("  Codes written: {}", written);

    if !report.unassigned.is_empty() {
        println!();
        println!("Unassigned windows:");
        for window in &report.unassigned {
            if window.detail.is_empty() {
                println!("  {} {} [{}]", window.window, window.type_name, window.reason);
            } else {
                println!(
                    "  {} {} [{}] {}",
                    window.window, window.type_name, window.reason, window.detail
                );
            }
        }
    }

    let buckets = [
        (WindowCountBucket::Zero, "0 windows"),
        (WindowCountBucket::One, "1 window"),
        (WindowCountBucket::Two, "2 windows"),
        (WindowCountBucket::MoreThanTwo, ">2 windows"),
    ];

    for level in &report.levels {
        println!();
        println!("Level: {}", level.level_name);
        for (bucket, label) in buckets {
            let rooms = level.rooms(bucket);
            println!("  {} ({} rooms)", label, rooms.len());
            for id in rooms {
                let name = model.room(*id).map_or("(unknown room)", |r| r.display_name());
                println!("    {} {}", id, name);
            }
        }
    }
}

fn print_usage() {
    eprintln!("Usage: assign-window-rooms <model.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --output <path>       Updated model path (default: <model>.rooms.json)");
    eprintln!("  --report-json <path>  Also write the assignment report as JSON");
    eprintln!("  --unit <unit>         Model length unit: meters or feet (default: meters)");
    eprintln!("  --exclude <marker>    Skip windows whose type/family contains marker (default: buit)");
    eprintln!("  --cell-size <size>    Room index cell size in model units");
    eprintln!("  --no-fallback         Do not scan all rooms when the index misses");
    eprintln!("  --json-logs           Log as JSON lines");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  WINDOW_ROOMS_UNIT, WINDOW_ROOMS_EXCLUDE, WINDOW_ROOMS_FALLBACK,");
    eprintln!("  WINDOW_ROOMS_CELL_SIZE, WINDOW_ROOMS_LOG_FORMAT, WORKER_THREADS, RUST_LOG");
}
