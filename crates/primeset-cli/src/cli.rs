use clap::{Parser, ValueEnum};
use primeset_classifiers::TotientMode;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prime-training-set")]
#[command(
    author,
    version,
    about = "Generate labelled prime/composite training data"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "primeset.yaml")]
    pub config: PathBuf,

    /// First value to classify
    #[arg(long)]
    pub start: Option<u64>,

    /// Exclusive upper bound of the range
    #[arg(long)]
    pub end: Option<u64>,

    /// Write JSON lines to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write CSV rows to this file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Disable the status line
    #[arg(long)]
    pub silent: bool,

    /// Number of classifier workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Digit stream of π used for the pi_index feature
    #[arg(long)]
    pub pi: Option<PathBuf>,

    /// Totient feature: full or partial
    #[arg(long, value_parser = parse_totient)]
    pub totient: Option<TotientMode>,

    /// Write records in increasing value order
    #[arg(long)]
    pub ordered: bool,

    /// Prime-tuple file, as NAME=PATH or PATH (repeatable, replaces the defaults)
    #[arg(long = "tuple", value_name = "PATH")]
    pub tuples: Vec<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "PRIMESET_METRICS_LISTEN")]
    pub metrics_listen: Option<SocketAddr>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Accepted for compatibility, profiling is not supported
    #[arg(long, hide = true)]
    pub cpuprofile: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

fn parse_totient(s: &str) -> Result<TotientMode, String> {
    s.parse()
}
