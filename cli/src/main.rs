use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};

use parachunk_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL_DEFLATE};
use parachunk_core::stream::{compress_file, decompress_file, inspect_file, PipelineConfig};
use parachunk_core::telemetry::PipelineStats;

#[derive(Parser)]
#[command(name = "parachunk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chunked, parallel zlib compression", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a CMP1 container
    Compress(CompressArgs),
    /// Restore the original file from a CMP1 container
    Decompress(DecompressArgs),
    /// List the records of a CMP1 container
    Inspect(InspectArgs),
}

#[derive(Args)]
struct CompressArgs {
    /// File to compress
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Container to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Raw bytes per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// zlib level (0-9)
    #[arg(short, long, default_value_t = DEFAULT_LEVEL_DEFLATE)]
    level: u32,
}

#[derive(Args)]
struct DecompressArgs {
    /// Container to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to restore
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct InspectArgs {
    /// Container to inspect
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn config_for(workers: Option<usize>) -> PipelineConfig {
    match workers {
        Some(n) => PipelineConfig::default().with_workers(n),
        None => PipelineConfig::default(),
    }
}

fn print_stats(stats: &PipelineStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats).context("serializing stats")?);
    } else {
        println!(
            "{:?}: {} chunks, {} -> {} bytes (ratio {:.3}) in {:.3}s with {} workers",
            stats.direction,
            stats.chunks,
            stats.bytes_in,
            stats.bytes_out,
            stats.ratio(),
            stats.elapsed.as_secs_f64(),
            stats.workers,
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compress(args) => {
            let config = config_for(args.workers)
                .with_chunk_size(args.chunk_size)
                .with_level(args.level);
            info!("compressing {} -> {}", args.input.display(), args.output.display());
            let stats = compress_file(&args.input, &args.output, &config).with_context(|| {
                format!("compressing {} into {}", args.input.display(), args.output.display())
            })?;
            print_stats(&stats, cli.json)
        }
        Commands::Decompress(args) => {
            let config = config_for(args.workers);
            info!("decompressing {} -> {}", args.input.display(), args.output.display());
            let stats = decompress_file(&args.input, &args.output, &config).with_context(|| {
                format!("decompressing {} into {}", args.input.display(), args.output.display())
            })?;
            print_stats(&stats, cli.json)
        }
        Commands::Inspect(args) => {
            let summary = inspect_file(&args.input)
                .with_context(|| format!("inspecting {}", args.input.display()))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary).context("serializing summary")?);
            } else {
                println!("{:>8}  {:>10}  {:>10}  {:>10}", "record", "original", "compressed", "crc32");
                for r in &summary.records {
                    println!(
                        "{:>8}  {:>10}  {:>10}  {:>#10x}",
                        r.index, r.original_size, r.compressed_len, r.checksum
                    );
                }
                println!(
                    "{} records, {} -> {} bytes, container {} bytes",
                    summary.records.len(),
                    summary.total_original(),
                    summary.total_compressed(),
                    summary.container_bytes
                );
            }
            Ok(())
        }
    }
}

/// Process exit status for a finished run.
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// One-line failure text: every context layer plus the pipeline error, which names the stage.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("error: {:#}", err)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = &result {
        eprintln!("{}", diagnostic(e));
    }
    ExitCode::from(exit_status(&result))
}
