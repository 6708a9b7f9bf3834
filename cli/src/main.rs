//! pdd - Parallel dd
//!
//! A dd-style block copy command powered by pardd.

use clap::builder::RangedU64ValueParser;
use clap::{CommandFactory, Parser, ValueEnum};
use pardd::{
    BarReporter, CopyMode, CopyOptions, CopyStats, DEFAULT_BLOCK_SIZE, DEFAULT_WORKERS,
    Error as ParddError, ErrorCode, InputFormat, MAX_WORKERS, ProgressKind, ProgressReporter,
    Strategy, copy_file_with_progress, format_bytes, parse_block_size,
};
use serde_json::{Value, json};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// pdd - Parallel block copy
///
/// Copy a file block by block with a pool of workers. Gzip input is detected
/// and decompressed.
///
/// Usage:
///   pdd -if=input.img -of=output.img -bs=1024 -workers=4
#[derive(Parser, Debug)]
#[command(name = "pdd", version, about, long_about = None)]
struct Args {
    /// Input file (required)
    #[arg(long = "if", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output file (required); created if absent, truncated if present
    #[arg(long = "of", value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Block size in bytes (default: 512)
    #[arg(long = "bs", value_name = "BYTES", allow_hyphen_values = true)]
    block_size: Option<String>,

    /// Number of concurrent block workers (1 to 1024)
    #[arg(
        long,
        default_value_t = DEFAULT_WORKERS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_WORKERS as u64)
    )]
    workers: usize,

    /// Copier to use
    #[arg(long, value_enum, default_value = "auto")]
    mode: ModeArg,

    /// Sync the output to disk when done
    #[arg(long)]
    fsync: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable progress bar
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Flags accepted with a single leading dash, dd style.
const DASH_FLAGS: &[&str] = &[
    "if", "of", "bs", "workers", "mode", "fsync", "output", "quiet", "verbose", "help", "version",
];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Decompress gzip input, copy plain input in parallel blocks
    Auto,
    /// Always copy raw bytes in parallel blocks
    Blocks,
    /// Always copy sequentially
    Stream,
}

impl From<ModeArg> for CopyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => CopyMode::Auto,
            ModeArg::Blocks => CopyMode::Blocks,
            ModeArg::Stream => CopyMode::Stream,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Both input file (-if) and output file (-of) are required.")]
    MissingPaths,

    #[error("{0}")]
    Copy(#[from] ParddError),

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::MissingPaths => ErrorCode::InvalidInput,
            Self::Copy(source) => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }

    fn exit_code(&self) -> i32 {
        match self.code() {
            ErrorCode::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Progress for the terminal: announces what the copier is about to do, then
/// hands the counting to an indicatif bar.
struct ConsoleReporter {
    bar: BarReporter,
    workers: usize,
    announce: bool,
}

impl ProgressReporter for ConsoleReporter {
    fn start(&self, kind: ProgressKind) {
        if self.announce {
            match kind {
                ProgressKind::Blocks { total } => {
                    println!("Copying {} blocks with {} workers...", total, self.workers);
                }
                ProgressKind::Bytes { total } => {
                    println!(
                        "Plain file detected. Streaming {} without compression...",
                        format_bytes(total)
                    );
                }
                ProgressKind::UnknownBytes => {
                    println!("Detected gzip file format. Processing with decompression...");
                }
            }
        }
        self.bar.start(kind);
    }

    fn advance(&self, delta: u64) {
        self.bar.advance(delta);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

fn main() {
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_tracing(args.verbose);

    if let Err(error) = run(&args) {
        report_error(&error, args.output);
        std::process::exit(error.exit_code());
    }
}

fn run(args: &Args) -> CliResult<()> {
    let (Some(input), Some(output)) = (&args.input, &args.output_file) else {
        return Err(CliError::MissingPaths);
    };

    let cancel = install_cancel_handler();
    let options = build_options(args, cancel);
    tracing::debug!(
        block_size = options.block_size,
        workers = options.workers,
        mode = options.mode.as_str(),
        fsync = options.fsync,
        "effective options"
    );

    let human = args.output == OutputMode::Human;
    let reporter = ConsoleReporter {
        bar: if human && !args.quiet {
            BarReporter::new()
        } else {
            BarReporter::hidden()
        },
        workers: options.workers,
        announce: human,
    };

    if human {
        println!("Starting operation...");
    }

    let stats = copy_file_with_progress(input, output, &options, &reporter)?;

    if human {
        print_stats(&stats, args.verbose);
        println!("Operation completed successfully.");
    } else {
        print_json_value(&stats_json(input, output, &stats))?;
    }
    Ok(())
}

/// First Ctrl-C sets the returned token; a second one exits with 130.
fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if cancel_clone.load(Ordering::Relaxed) {
            eprintln!("\nForce quit.");
            std::process::exit(130);
        }
        cancel_clone.store(true, Ordering::Relaxed);
        eprintln!(
            "\nCancelling... finishing in-flight blocks. Press Ctrl+C again to abort immediately."
        );
    });
    if let Err(e) = installed {
        print_warning(&format!("Failed to install Ctrl-C handler: {e}"));
    }
    cancel
}

fn build_options(args: &Args, cancel: Arc<AtomicBool>) -> CopyOptions {
    let block_size = match args.block_size.as_deref() {
        None => DEFAULT_BLOCK_SIZE,
        Some(raw) => parse_block_size(raw).unwrap_or_else(|_| {
            print_warning(&format!(
                "Invalid block size: {raw}. Using default block size of {DEFAULT_BLOCK_SIZE} bytes."
            ));
            DEFAULT_BLOCK_SIZE
        }),
    };


    let mut options = CopyOptions::default()
        .with_block_size(block_size)
        .with_workers(args.workers)
        .with_mode(args.mode.into())
        .with_cancel_token(cancel)
        .with_warn_handler(print_warning);
    if args.fsync {
        options = options.with_fsync();
    }
    options
}

/// Rewrite `-flag` and `-flag=value` to their `--` forms for the known flags.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut normalized = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || passthrough {
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|s| {
            let rest = s.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            DASH_FLAGS
                .contains(&name)
                .then(|| OsString::from(format!("-{s}")))
        });
        normalized.push(rewritten.unwrap_or(arg));
    }

    normalized
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn print_warning(msg: &str) {
    eprintln!("Warning: {msg}");
}

fn report_error(error: &CliError, output_mode: OutputMode) {
    if output_mode == OutputMode::Json && !matches!(error, CliError::MissingPaths) {
        match print_json_value(&error_json(error)) {
            Ok(()) => return,
            Err(json_error) => eprintln!("Error: {json_error}"),
        }
    }

    match error {
        CliError::Copy(ParddError::Cancelled {
            blocks_copied,
            bytes_copied,
        }) => {
            eprintln!(
                "Cancelled after copying {} blocks ({}).",
                blocks_copied,
                format_bytes(*bytes_copied)
            );
        }
        CliError::Copy(ParddError::PartialCopy { errors, .. }) => {
            eprintln!("Error: {error}");
            for block_error in errors {
                eprintln!("  {block_error}");
            }
        }
        CliError::MissingPaths => {
            eprintln!("Error: {error}");
            let _ = Args::command().write_help(&mut io::stderr());
        }
        _ => eprintln!("Error: {error}"),
    }
}

fn print_stats(stats: &CopyStats, verbose: bool) {
    let bytes_str = format_bytes(stats.bytes_copied);

    match stats.strategy {
        Strategy::Blocks => println!(
            "{} file detected. Copied {} blocks, {} bytes ({}) with {} workers.",
            match stats.format {
                InputFormat::Gzip => "Gzip",
                InputFormat::Plain => "Plain",
            },
            stats.blocks_copied,
            stats.bytes_copied,
            bytes_str,
            stats.workers
        ),
        Strategy::Stream => println!(
            "Copied file size: {} ({} bytes).",
            bytes_str, stats.bytes_copied
        ),
        Strategy::Decompress => println!(
            "Decompressed file size: {} ({} bytes).",
            bytes_str, stats.bytes_copied
        ),
    }

    if verbose {
        println!("Copy completed in {:?}", stats.duration);
        println!("  Format:         {}", stats.format.as_str());
        println!("  Strategy:       {}", stats.strategy.as_str());
        println!("  Input size:     {}", format_bytes(stats.input_size));
        println!("  Block size:     {} bytes", stats.block_size);

        if stats.duration.as_secs_f64() > 0.0 {
            let speed = stats.bytes_copied as f64 / stats.duration.as_secs_f64();
            println!("  Speed:          {}/s", format_bytes(speed as u64));
        }
    }
}

fn stats_json(input: &Path, output: &Path, stats: &CopyStats) -> Value {
    json!({
        "schema_version": "1.0",
        "status": "ok",
        "input": display_path(input),
        "output": display_path(output),
        "format": stats.format.as_str(),
        "strategy": stats.strategy.as_str(),
        "input_size": stats.input_size,
        "bytes_copied": stats.bytes_copied,
        "blocks_total": stats.blocks_total,
        "blocks_copied": stats.blocks_copied,
        "block_size": stats.block_size,
        "workers": stats.workers,
        "duration_ms": stats.duration.as_millis() as u64,
    })
}

fn error_json(error: &CliError) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("code".to_owned(), Value::String(error.code().as_str().to_owned()));
    body.insert("message".to_owned(), Value::String(error.to_string()));

    match error {
        CliError::Copy(ParddError::PartialCopy { errors, .. }) => {
            let failed: Vec<Value> = errors
                .iter()
                .map(|e| {
                    json!({
                        "index": e.index,
                        "offset": e.offset,
                        "op": e.op.to_string(),
                        "message": e.source.to_string(),
                    })
                })
                .collect();
            body.insert("failed_blocks".to_owned(), Value::Array(failed));
        }
        CliError::Copy(ParddError::Cancelled {
            blocks_copied,
            bytes_copied,
        }) => {
            body.insert("blocks_copied".to_owned(), Value::Number((*blocks_copied).into()));
            body.insert("bytes_copied".to_owned(), Value::Number((*bytes_copied).into()));
        }
        _ => {}
    }

    json!({
        "schema_version": "1.0",
        "status": "error",
        "error": Value::Object(body),
    })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
