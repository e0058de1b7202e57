use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use blueprint_markup::snapshot::{ImageSource, SnapshotFormat, SnapshotOptions, flatten, load_source};
use blueprint_markup::{MarkupConfig, MarkupError, ObjectList};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "markup-flatten", about = "Flatten blueprint markup onto its image")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint a markup list onto an image and write the encoded result.
    Flatten(FlattenCommand),
    /// Validate a markup list and print a per-kind object count.
    Check(CheckCommand),
}

#[derive(Args, Debug)]
struct FlattenCommand {
    /// Image file path or http(s) URL.
    #[arg(long)]
    image: String,

    /// Markup JSON file; omitted means no objects.
    #[arg(long)]
    markup: Option<PathBuf>,

    /// Output file. Without it the snapshot is printed as a data URL.
    #[arg(long)]
    out: Option<PathBuf>,

    /// `jpeg` or `png`; overrides `MARKUP_SNAPSHOT_FORMAT`.
    #[arg(long)]
    format: Option<String>,

    /// JPEG quality 1-100; overrides `MARKUP_JPEG_QUALITY`.
    #[arg(long)]
    quality: Option<u8>,

    /// Font for text and box labels; overrides `MARKUP_FONT_PATH`. Defaults to
    /// the bundled DejaVu Sans.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckCommand {
    #[arg(long)]
    markup: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Flatten(cmd) => run_flatten(cmd).await,
        Command::Check(cmd) => run_check(&cmd).await,
    }
}

async fn run_flatten(cmd: FlattenCommand) -> Result<(), CliError> {
    let mut config = MarkupConfig::from_env()?;
    if let Some(format) = cmd.format.as_deref() {
        config.snapshot_format = format.parse::<SnapshotFormat>()?;
    }
    if let Some(quality) = cmd.quality {
        config.snapshot_format = config.snapshot_format.with_quality(quality);
    }
    if cmd.font.is_some() {
        config.font_path = cmd.font;
    }

    let objects = match &cmd.markup {
        Some(path) => read_markup(path).await?,
        None => ObjectList::empty(),
    };
    let options = SnapshotOptions::from_config(&config).await?;

    let source = ImageSource::parse(&cmd.image);
    let image = load_source(&source, options.fetch_timeout).await?;
    let snapshot = flatten(&image, &objects, &options)?;

    match cmd.out {
        Some(path) => {
            tokio::fs::write(&path, &snapshot.bytes)
                .await
                .map_err(|source| CliError::Write { path: path.clone(), source })?;
            info!(
                out = %path.display(),
                width = snapshot.width,
                height = snapshot.height,
                objects = objects.len(),
                "snapshot written"
            );
        }
        None => println!("{}", snapshot.to_data_url()),
    }
    Ok(())
}

async fn run_check(cmd: &CheckCommand) -> Result<(), CliError> {
    let objects = read_markup(&cmd.markup).await?;
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for obj in objects.iter() {
        *counts.entry(obj.kind_name()).or_default() += 1;
    }
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

async fn read_markup(path: &Path) -> Result<ObjectList, CliError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    Ok(ObjectList::from_json(&json)?)
}
