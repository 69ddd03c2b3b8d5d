use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use envelope_registry::CodecKind;

#[derive(Parser)]
#[command(
    name = "envelope",
    about = "Inspect and build envelope blobs",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Envelope codec (json or bincode); overrides the config file
    #[arg(long, global = true)]
    pub envelope_codec: Option<CodecKind>,

    /// TOML registry config to take codec choices from
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode the envelope layer of a blob and show its key and payload
    Inspect(InspectArgs),
    /// Wrap raw payload bytes in an envelope under the given key
    Wrap(WrapArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// Blob file, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,
}

#[derive(Args)]
pub struct WrapArgs {
    #[arg(short, long)]
    pub key: String,
    /// Payload file, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
