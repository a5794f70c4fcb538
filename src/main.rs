// USAGE cargo run --release -- -i /path/to/profiles -o /path/to/csv [--days 30]

use std::time::Instant;

use anyhow::{Context, Result};
use argo_to_csv::{cli::Args, FileLedger, NetcdfSource, Pipeline};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};

// ─────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────
fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .format_timestamp_secs()
        .init();

    let config = args.to_config()?;
    let mut ledger = FileLedger::open(config.ledger_path())
        .with_context(|| format!("opening ledger {}", config.ledger_path().display()))?;
    info!(
        "input {} → output {} (ledger {}, {} file(s))",
        config.input_dir.display(),
        config.output_dir.display(),
        config.ledger_path().display(),
        ledger.len()
    );

    let t0 = Instant::now();
    let source = NetcdfSource;
    let today = Utc::now().date_naive();
    let summary = Pipeline::new(&config, &source, &mut ledger, today)
        .dry_run(args.dry_run)
        .run_dir(&config.input_dir, &config.file_pattern)?;

    for (file, reason) in &summary.failed {
        warn!("not ingested, will retry next run: {file}: {reason}");
    }
    println!(
        "{}{} file(s) found, {} already done, {} processed, {} failed; {} row(s) over {} date(s) in {:?}",
        if args.dry_run { "[dry run] " } else { "" },
        summary.discovered,
        summary.already_processed,
        summary.processed,
        summary.failed.len(),
        summary.rows_written,
        summary.dates.len(),
        t0.elapsed()
    );
    Ok(())
}
