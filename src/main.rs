use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use topk_tracker::{FrequencyTracker, Strategy, TrackerConfig};

/// Print the K most frequent whitespace-separated words of a file or stdin.
#[derive(Parser, Debug)]
#[command(name = "topk-words", version)]
struct Args {
    /// Number of words to report
    #[arg(short = 'k', long = "capacity", default_value_t = 10)]
    capacity: usize,

    /// Tracking strategy: heap, threshold or sorted
    #[arg(short, long, default_value_t = Strategy::InsertionSorted)]
    strategy: Strategy,

    /// Input file; stdin when omitted
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("topk-words: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = TrackerConfig::new(args.capacity).with_strategy(args.strategy);
    let mut topk = config.build::<String>()?;

    let mut reader = open_input(args.file.as_deref())?;
    let mut line = Vec::new();
    let mut bytes = 0;
    while reader.read_until(b'\n', &mut line)? > 0 {
        bytes += line.len();
        // Invalid UTF-8 is replaced, not fatal.
        for word in String::from_utf8_lossy(&line).split_whitespace() {
            topk.add(word.to_owned());
        }
        line.clear();
    }
    debug!(bytes, strategy = %args.strategy, "ingested input");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &topk.top_k_descending() {
        writeln!(out, "{} {}", record.key, record.count)?;
    }
    out.flush()?;

    eprintln!(
        "{} words, {} distinct, top {} by {}",
        topk.total_weight(),
        topk.unique_key_count(),
        topk.capacity(),
        topk.strategy()
    );
    Ok(())
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    Ok(reader)
}
