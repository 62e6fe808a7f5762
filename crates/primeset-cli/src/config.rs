//! Configuration loading with CLI overrides

use crate::cli::Cli;
use primeset_classifiers::TupleSource;
use primeset_core::Result;
use primeset_pipeline::PipelineConfig;
use std::path::Path;

/// Load the YAML configuration (if present) and apply CLI overrides
pub fn load(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(&cli.config)?;

    if let Some(start) = cli.start {
        config.start = start;
    }
    if let Some(end) = cli.end {
        config.end = end;
    }
    if let Some(json) = &cli.json {
        config.json = Some(json.clone());
    }
    if let Some(csv) = &cli.csv {
        config.csv = Some(csv.clone());
    }
    if let Some(workers) = cli.workers {
        config.workers = Some(workers);
    }
    if let Some(pi) = &cli.pi {
        config.pi_file = Some(pi.clone());
    }
    if let Some(totient) = cli.totient {
        config.totient = totient;
    }
    if !cli.tuples.is_empty() {
        config.tuple_files = cli.tuples.iter().map(|arg| parse_tuple_arg(arg)).collect();
    }

    config.silent |= cli.silent;
    config.ordered |= cli.ordered;

    Ok(config)
}

/// Parse `NAME=PATH`, or a bare path labelled by its file stem
fn parse_tuple_arg(arg: &str) -> TupleSource {
    if let Some((name, path)) = arg.split_once('=') {
        if !name.is_empty() && !path.is_empty() {
            return TupleSource::new(name, path);
        }
    }

    let name = Path::new(arg)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.split('-').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("tuples");
    TupleSource::new(name, arg)
}
