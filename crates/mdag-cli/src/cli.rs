use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mdag_crypto::HashAlgorithm;

#[derive(Parser)]
#[command(
    name = "mdag",
    about = "Content-addressed Merkle DAG encoder",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory of the on-disk object store
    #[arg(long, global = true, default_value = ".mdag/objects")]
    pub store: PathBuf,

    /// TOML file with encoder settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode a file or directory into the store and print its root digest
    Add(AddArgs),
    /// Write the contents of a stored file to stdout
    Cat(CatArgs),
    /// List a stored directory
    Ls(LsArgs),
    /// Print the effective encoder configuration
    Config(ConfigArgs),
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct EncoderArgs {
    /// Chunk size in bytes
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Digest algorithm (blake3 or sha256)
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,

    /// Store an aggregate object for every file, including single-chunk ones
    #[arg(long)]
    pub always_store_aggregates: bool,
}

#[derive(Args)]
pub struct AddArgs {
    pub path: PathBuf,
    #[command(flatten)]
    pub encoder: EncoderArgs,
}

#[derive(Args)]
pub struct CatArgs {
    pub digest: String,
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct LsArgs {
    pub digest: String,
    /// List every entry below the directory
    #[arg(short, long)]
    pub recursive: bool,
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub encoder: EncoderArgs,
}
