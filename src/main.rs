use clap::Parser;
use histree::cli::{Cli, Command, HistoryArgs, ImportArgs, ItemsArgs, ScanArgs};
use histree::config::Config;
use histree::error::HistoryError;
use histree::history;
use histree::ingest;
use histree::report;
use histree::store::Store;
use histree::util;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let result = match cli.command {
        Command::Scan(args) => run_scan(&args, &config),
        Command::Import(args) => run_import(&args, &config),
        Command::History(args) => run_history(&args, &config),
        Command::Items(args) => run_items(&args, &config),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(error: &HistoryError) -> ! {
    eprintln!("error: {error}");
    std::process::exit(1);
}

fn run_scan(args: &ScanArgs, config: &Config) -> Result<(), HistoryError> {
    let db_path = config.resolve_db_path(args.db.as_deref())?;
    let mut store = Store::open(&db_path)?;

    let started = Instant::now();
    let outcome = ingest::scan::scan_root(&mut store, &args.root)?;
    let elapsed = started.elapsed().as_secs_f64();

    println!(
        "recorded {} changed items ({} unchanged) in {elapsed:.2}s",
        outcome.appended, outcome.unchanged
    );
    if args.verbose {
        println!("database: {}", db_path.display());
    }
    report::print_diagnostics(&outcome.diagnostics, args.verbose);

    Ok(())
}

fn run_import(args: &ImportArgs, config: &Config) -> Result<(), HistoryError> {
    let db_path = config.resolve_db_path(args.db.as_deref())?;
    let mut store = Store::open(&db_path)?;

    let raw = std::fs::read_to_string(&args.batch)?;
    let batch = ingest::parse_batch(&raw)?;
    let appended = ingest::import_batch(&mut store, &batch)?;

    println!(
        "appended {appended} records at {}",
        util::format_time(batch.update_date)
    );
    if args.verbose {
        println!("database: {}", db_path.display());
    }

    Ok(())
}

fn run_history(args: &HistoryArgs, config: &Config) -> Result<(), HistoryError> {
    let db_path = config.resolve_db_path(args.db.as_deref())?;
    let store = Store::open(&db_path)?;

    let (start, end) = args.window(config.default_window)?;

    let started = Instant::now();
    let response = history::get_history(&store, &args.item_id, start, end)?;
    let elapsed = started.elapsed().as_secs_f64();

    report::print_history(&response, args.json);

    // timing and memory stay off stdout when the output is piped as JSON
    if !args.json {
        println!(
            "\nreconstructed {} history points in {elapsed:.2}s",
            response.items.len()
        );

        if args.verbose {
            if let Some(usage) = memory_stats::memory_stats() {
                println!(
                    "resident memory: {}",
                    util::format_bytes(usage.physical_mem as u64)
                );
            }
        }
    }

    Ok(())
}

fn run_items(args: &ItemsArgs, config: &Config) -> Result<(), HistoryError> {
    let db_path = config.resolve_db_path(args.db.as_deref())?;
    let store = Store::open(&db_path)?;

    let records = store.list_latest()?;
    report::print_items(&records, args.json);

    Ok(())
}
