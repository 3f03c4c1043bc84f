//! spanpow CLI
//!
//! Searches for a nonce that packs a corpus of strings into a compact
//! perfect hash table.
//!
//! # Commands
//!
//! - `search` - Scan a nonce range with one worker per thread
//! - `evaluate` - Show the result of a single nonce
//! - `table` - Build the lookup table for a found nonce and reducer
//! - `benchmark` - Measure single-threaded evaluation rate

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use spanpow::algorithm::{
    NonceEvaluator, DEFAULT_START, DEFAULT_STOP, NONCE_SPACE, STANDARD,
};
use spanpow::report::{SearchReport, TableReport};
use spanpow::{
    corpus, search, Blake2sKeyed, CancelToken, PrecomputedTable, ReducerBank, SearchError,
    SearchRange,
};

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "spanpow")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Keyed BLAKE2s nonce search for compact perfect-hash tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a nonce range for the smallest reduced span
    Search {
        /// Corpus file (JSON array, or one string per line)
        #[arg(short, long)]
        corpus: PathBuf,

        /// First nonce to try (hex with 0x, or decimal)
        #[arg(long, value_parser = parse_number, default_value_t = DEFAULT_START as u64)]
        start: u64,

        /// Exclusive end of the range, at most 0x100000000
        #[arg(long, value_parser = parse_number, default_value_t = DEFAULT_STOP)]
        stop: u64,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Evaluate a single nonce
    Evaluate {
        /// Corpus file
        #[arg(short, long)]
        corpus: PathBuf,

        /// Nonce to evaluate
        #[arg(short, long, value_parser = parse_number)]
        nonce: u64,
    },

    /// Print the lookup table for a nonce and reducer
    Table {
        /// Corpus file
        #[arg(short, long)]
        corpus: PathBuf,

        /// Nonce found by a search
        #[arg(short, long, value_parser = parse_number)]
        nonce: u64,

        /// Reducer index found by a search
        #[arg(short, long)]
        reducer: usize,

        /// JSON array with one value per corpus string (default: corpus index)
        #[arg(long)]
        values: Option<PathBuf>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Corpus file
        #[arg(short, long)]
        corpus: PathBuf,

        /// Number of nonces to evaluate
        #[arg(short = 'n', long, default_value = "10000")]
        count: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            corpus,
            start,
            stop,
            threads,
            format,
        } => cmd_search(&corpus, start, stop, threads, format),
        Commands::Evaluate { corpus, nonce } => cmd_evaluate(&corpus, nonce),
        Commands::Table {
            corpus,
            nonce,
            reducer,
            values,
        } => cmd_table(&corpus, nonce, reducer, values.as_deref()),
        Commands::Benchmark { corpus, count } => cmd_benchmark(&corpus, count),
    };

    if let Err(e) = result {
        if let Some(SearchError::Cancelled) = e.downcast_ref::<SearchError>() {
            warn!("Search interrupted, no result reported");
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Parse `0x`-prefixed hex or decimal
fn parse_number(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn to_nonce(value: u64) -> anyhow::Result<u32> {
    u32::try_from(value).map_err(|_| anyhow::anyhow!("Nonce {:#x} does not fit in 32 bits", value))
}

/// Start a background runtime that cancels `cancel` on Ctrl-C
///
/// The runtime must stay alive for the duration of the search.
fn spawn_interrupt_listener(cancel: &CancelToken) -> anyhow::Result<tokio::runtime::Runtime> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("spanpow-signal")
        .enable_all()
        .build()?;

    let cancel = cancel.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping workers");
            cancel.cancel();
        }
    });

    Ok(rt)
}

fn cmd_search(
    corpus_path: &Path,
    start: u64,
    stop: u64,
    threads: Option<usize>,
    format: Format,
) -> anyhow::Result<()> {
    let corpus = corpus::load(corpus_path)?;
    let bank = ReducerBank::standard();
    let range = SearchRange::new(to_nonce(start)?, stop)?;
    let num_threads = threads.unwrap_or_else(num_cpus::get);

    let cancel = CancelToken::new();
    let _signals = spawn_interrupt_listener(&cancel)?;

    let started = Instant::now();
    let best = search(&Blake2sKeyed, &corpus, &bank, range, num_threads, &cancel)?;
    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "Scanned {} nonces in {:.2}s ({:.0} nonces/s)",
        range.len(),
        elapsed,
        range.len() as f64 / elapsed.max(f64::EPSILON)
    );

    if let Some(report) = best.and_then(SearchReport::from_result) {
        match format {
            Format::Json => println!("{}", report.to_json()?),
            Format::Text => println!("{}", report.to_text()),
        }
    }

    Ok(())
}

fn cmd_evaluate(corpus_path: &Path, nonce: u64) -> anyhow::Result<()> {
    let corpus = corpus::load(corpus_path)?;
    let bank = ReducerBank::standard();
    let evaluator = NonceEvaluator::new(&Blake2sKeyed, &corpus, &bank);

    let result = evaluator.evaluate(to_nonce(nonce)?);
    if !result.is_valid() {
        info!("No reducer separates the corpus under nonce {:#010x}", result.nonce);
    }

    println!("{}", SearchReport::from(result).to_json()?);
    Ok(())
}

fn cmd_table(
    corpus_path: &Path,
    nonce: u64,
    reducer: usize,
    values_path: Option<&Path>,
) -> anyhow::Result<()> {
    let corpus = corpus::load(corpus_path)?;
    let bank = ReducerBank::standard();
    let nonce = to_nonce(nonce)?;

    let json = match values_path {
        Some(path) => {
            let values: Vec<serde_json::Value> = serde_json::from_slice(&std::fs::read(path)?)?;
            let table = PrecomputedTable::build_with_values(
                &Blake2sKeyed,
                &corpus,
                &bank,
                nonce,
                reducer,
                values,
            )?;
            TableReport::new(&table, &corpus).to_json()?
        }
        None => {
            let table = PrecomputedTable::build(&Blake2sKeyed, &corpus, &bank, nonce, reducer)?;
            TableReport::new(&table, &corpus).to_json()?
        }
    };

    println!("{}", json);
    Ok(())
}

fn cmd_benchmark(corpus_path: &Path, count: u32) -> anyhow::Result<()> {
    let corpus = corpus::load(corpus_path)?;
    let bank = ReducerBank::standard();
    let evaluator = NonceEvaluator::new(&Blake2sKeyed, &corpus, &bank);
    let mut scratch = evaluator.scratch();

    println!("Running benchmark with {} nonces...", count);

    let start = Instant::now();
    let mut valid = 0u32;
    for i in 0..count {
        let nonce = DEFAULT_START.wrapping_add(i);
        if evaluator.evaluate_with(nonce, &mut scratch).is_valid() {
            valid += 1;
        }
    }

    let elapsed = start.elapsed();
    let rate = count as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("\nResults:");
    println!("  Nonces evaluated: {}", count);
    println!("  Valid nonces: {}", valid);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Rate: {:.2} nonces/s", rate);
    println!("  Hashes/s: {:.2}", rate * corpus.len() as f64);

    println!("\nSearch parameters:");
    println!("  Corpus strings: {}", corpus.len());
    println!("  Reducers: {}", STANDARD.len());
    println!("  Nonce space: {:#x}", NONCE_SPACE);
    println!("  Threads available: {}", num_cpus::get());

    Ok(())
}
