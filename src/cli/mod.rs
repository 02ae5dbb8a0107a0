//! Command-line interface

use crate::catalog::{builtin_streams, find_stream, SourceKind, StreamDescriptor};
use crate::config::TapConfig;
use crate::engine::ExtractEngine;
use crate::error::{Error, Result};
use crate::sftp::SftpClient;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dropsync", version, about = "Extract records from dated SFTP drop folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the available streams
    ListStreams,

    /// Check a configuration file without connecting
    ValidateConfig {
        /// Path to the JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Extract records and emit them as JSON lines on stdout
    Extract {
        /// Path to the JSON configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Stream to extract (repeatable); all streams when omitted
        #[arg(short, long = "stream")]
        streams: Vec<String>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::ListStreams => {
            list_streams();
            Ok(())
        }
        Command::ValidateConfig { config } => {
            TapConfig::from_file(&config)?;
            println!("Configuration OK");
            Ok(())
        }
        Command::Extract { config, streams } => extract(&config, &streams).await,
    }
}

fn list_streams() {
    for stream in builtin_streams() {
        let source = match &stream.source {
            SourceKind::Csv { file_name, .. } => format!("csv {file_name}"),
            SourceKind::Sheet { file_name, .. } => format!("sheet {file_name}"),
            SourceKind::Json { file_pattern, .. } => format!("json {file_pattern}"),
            SourceKind::Flattened { file_pattern, flattener } => {
                format!("flattened {file_pattern} (depth {})", flattener.levels.len())
            }
        };
        println!("{:<28} {source}", stream.name);
    }
}

fn select_streams(names: &[String]) -> Result<Vec<&'static StreamDescriptor>> {
    if names.is_empty() {
        return Ok(builtin_streams().iter().collect());
    }
    names
        .iter()
        .map(|name| {
            find_stream(name).ok_or_else(|| Error::config(format!("unknown stream '{name}'")))
        })
        .collect()
}

async fn extract(config_path: &PathBuf, stream_names: &[String]) -> Result<()> {
    let selected = select_streams(stream_names)?;
    let config = TapConfig::from_file(config_path)?;

    let client = Arc::new(SftpClient::from_tap(&config));
    client.connect().await?;

    let mut engine = ExtractEngine::new(client.clone(), config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for stream in selected {
        let records = engine.extract_stream(stream).await?;
        for record in &records {
            let line = serde_json::json!({"stream": stream.name, "record": record});
            serde_json::to_writer(&mut out, &line)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    info!("Run complete: {:?}", engine.stats());
    client.disconnect().await;
    Ok(())
}
