use std::fs;
use std::io::{self, Read, Write};

use anyhow::Context;
use colored::Colorize;
use envelope_registry::{Codec, EnvelopeRecord, RegistryConfig};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let codec = resolve_envelope_codec(&cli)?;
    match cli.command {
        Command::Inspect(args) => cmd_inspect(codec.as_ref(), args, cli.format),
        Command::Wrap(args) => cmd_wrap(codec.as_ref(), args),
    }
}

/// `--envelope-codec` wins over `--config`, which wins over the default.
fn resolve_envelope_codec(cli: &Cli) -> anyhow::Result<Box<dyn Codec>> {
    let kind = match (cli.envelope_codec, &cli.config) {
        (Some(kind), _) => kind,
        (None, Some(path)) => {
            RegistryConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?
                .envelope_codec
        }
        (None, None) => RegistryConfig::default().envelope_codec,
    };
    debug!(codec = %kind, "envelope codec selected");
    Ok(kind.codec())
}

fn cmd_inspect(codec: &dyn Codec, args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = read_input(&args.input)?;
    let inspection = inspect_blob(codec, &bytes)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
        OutputFormat::Text => print_inspection(&inspection),
    }
    Ok(())
}

fn cmd_wrap(codec: &dyn Codec, args: WrapArgs) -> anyhow::Result<()> {
    let payload = read_input(&args.input)?;
    let blob = wrap_payload(codec, &args.key, payload)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &blob).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} Wrote {} bytes to {}", "✓".green().bold(), blob.len(), path.display());
        }
        None => io::stdout().write_all(&blob)?,
    }
    Ok(())
}

/// What the envelope layer of a blob says, without knowing any payload type.
#[derive(Debug, PartialEq, Serialize)]
pub struct Inspection {
    pub key: String,
    pub envelope_len: usize,
    pub payload_len: usize,
    pub payload: PayloadView,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "encoding", content = "value", rename_all = "lowercase")]
pub enum PayloadView {
    Json(serde_json::Value),
    Hex(String),
}

pub fn inspect_blob(codec: &dyn Codec, bytes: &[u8]) -> anyhow::Result<Inspection> {
    let mut record = EnvelopeRecord::default();
    codec.decode(bytes, &mut record).with_context(|| {
        format!("decoding {}-byte blob as a {} envelope", bytes.len(), codec.name())
    })?;

    let payload = match serde_json::from_slice(&record.payload) {
        Ok(value) => PayloadView::Json(value),
        Err(_) => PayloadView::Hex(hex::encode(&record.payload)),
    };
    Ok(Inspection {
        key: record.key,
        envelope_len: bytes.len(),
        payload_len: record.payload.len(),
        payload,
    })
}

pub fn wrap_payload(codec: &dyn Codec, key: &str, payload: Vec<u8>) -> anyhow::Result<Vec<u8>> {
    let record = EnvelopeRecord {
        key: key.to_string(),
        payload,
    };
    let blob = codec
        .encode(&record)
        .with_context(|| format!("encoding envelope for {key:?}"))?;
    debug!(key, payload_len = record.payload.len(), len = blob.len(), "wrapped payload");
    Ok(blob)
}

fn print_inspection(inspection: &Inspection) {
    println!("Key: {}", inspection.key.yellow().bold());
    println!(
        "  Envelope: {} bytes, payload: {} bytes",
        inspection.envelope_len, inspection.payload_len
    );
    match &inspection.payload {
        PayloadView::Json(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            println!("  Payload ({}):", "json".cyan());
            for line in pretty.lines() {
                println!("    {line}");
            }
        }
        PayloadView::Hex(hex) => println!("  Payload ({}): {}", "hex".cyan(), hex.dimmed()),
    }
}

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    fs::read(input).with_context(|| format!("reading {input}"))
}
