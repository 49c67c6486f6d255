use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use mdag_dag::{
    fs::load_path, AggregatePolicy, BuildStats, DagBuilder, DagConfig, DagReader, Digest,
    LinkKind,
};
use mdag_store::FsKvStore;
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let base = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Add(args) => cmd_add(&cli.store, effective_config(base, &args.encoder), &args.path, cli.format),
        Command::Cat(args) => cmd_cat(&cli.store, with_hash(base, args.hash), &args.digest),
        Command::Ls(args) => cmd_ls(&cli.store, with_hash(base, args.hash), &args, cli.format),
        Command::Config(args) => cmd_config(effective_config(base, &args.encoder), cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DagConfig> {
    match path {
        Some(path) => DagConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DagConfig::default()),
    }
}

fn effective_config(mut config: DagConfig, overrides: &EncoderArgs) -> DagConfig {
    if let Some(size) = overrides.chunk_size {
        config = config.with_chunk_size(size);
    }
    config = with_hash(config, overrides.hash);
    if overrides.always_store_aggregates {
        config = config.with_aggregate_policy(AggregatePolicy::Always);
    }
    config
}

fn with_hash(config: DagConfig, hash: Option<mdag_crypto::HashAlgorithm>) -> DagConfig {
    match hash {
        Some(hash) => config.with_hash(hash),
        None => config,
    }
}

fn open_store(dir: &Path) -> anyhow::Result<Arc<FsKvStore>> {
    let store = FsKvStore::open(dir).with_context(|| format!("opening store at {}", dir.display()))?;
    Ok(Arc::new(store))
}

fn parse_digest(s: &str) -> anyhow::Result<Digest> {
    s.parse::<Digest>().with_context(|| format!("invalid digest {s:?}"))
}

// -------------------------------------------------------------------
// add
// -------------------------------------------------------------------

fn add_path(store_dir: &Path, config: &DagConfig, path: &Path) -> anyhow::Result<(Digest, BuildStats)> {
    let node = load_path(path, config.max_depth)
        .with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), size = node.size(), ?config, "loaded input");
    let builder = DagBuilder::new(open_store(store_dir)?, config).context("invalid configuration")?;
    let root = builder
        .add(&node)
        .with_context(|| format!("encoding {}", path.display()))?;
    Ok((root, builder.stats()))
}

fn cmd_add(store_dir: &Path, config: DagConfig, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let (root, stats) = add_path(store_dir, &config, path)?;
    match format {
        OutputFormat::Json => {
            let out = json!({
                "path": path.display().to_string(),
                "root": root.to_hex(),
                "hash": config.hash.to_string(),
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{} added {}", "✓".green().bold(), path.display().to_string().bold());
            println!("  Root: {}", root.to_hex().yellow());
            println!(
                "  Written: {} blobs, {} objects, {} bytes ({} already stored)",
                stats.blobs_written, stats.objects_written, stats.bytes_written, stats.dedup_hits
            );
        }
    }
    Ok(())
}

// -------------------------------------------------------------------
// cat / ls
// -------------------------------------------------------------------

fn reader(store_dir: &Path, config: &DagConfig) -> anyhow::Result<DagReader> {
    let store = FsKvStore::open_read_only(store_dir)
        .with_context(|| format!("opening store at {}", store_dir.display()))?;
    Ok(DagReader::new(Arc::new(store), config.hash))
}

fn cmd_cat(store_dir: &Path, config: DagConfig, digest: &str) -> anyhow::Result<()> {
    let digest = parse_digest(digest)?;
    let bytes = reader(store_dir, &config)?
        .cat(&digest)
        .with_context(|| format!("reading file {}", digest.short_hex()))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}

fn kind_label(kind: LinkKind) -> colored::ColoredString {
    match kind {
        LinkKind::Tree => kind.as_str().blue().bold(),
        LinkKind::Link => kind.as_str().cyan(),
        LinkKind::Data => kind.as_str().normal(),
    }
}

fn cmd_ls(store_dir: &Path, config: DagConfig, args: &LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let digest = parse_digest(&args.digest)?;
    let reader = reader(store_dir, &config)?;

    let rows: Vec<(String, Digest, u64, LinkKind)> = if args.recursive {
        reader
            .walk(&digest)
            .with_context(|| format!("walking {}", digest.short_hex()))?
            .into_iter()
            .map(|e| (e.path, e.hash, e.size, e.kind))
            .collect()
    } else {
        reader
            .list(&digest)
            .with_context(|| format!("listing {}", digest.short_hex()))?
            .into_iter()
            .map(|e| (e.name, e.hash, e.size, e.kind))
            .collect()
    };

    match format {
        OutputFormat::Json => {
            let out: Vec<_> = rows
                .iter()
                .map(|(name, hash, size, kind)| {
                    json!({ "name": name, "hash": hash.to_hex(), "size": size, "kind": kind.as_str() })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for (name, hash, size, kind) in &rows {
                println!("{:<4} {:>12} {} {}", kind_label(*kind), size, hash.to_hex().dimmed(), name);
            }
        }
    }
    Ok(())
}

// -------------------------------------------------------------------
// config
// -------------------------------------------------------------------

fn cmd_config(config: DagConfig, format: OutputFormat) -> anyhow::Result<()> {
    config.validate()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
