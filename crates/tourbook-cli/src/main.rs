//! Tourbook command-line block editor.
//!
//! Usage:
//!   # Against the configured API (token from $TOURBOOK_TOKEN)
//!   tourbook --tour <TOUR_ID> list
//!   tourbook --tour <TOUR_ID> add location
//!   tourbook --tour <TOUR_ID> move <BLOCK_ID> up
//!
//!   # Ephemeral in-memory backend
//!   tourbook --memory add divider

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

use tourbook_blocks::{Block, BlockContent, BlockId, BlockType, LocationPatch, MoveDirection, TitleContent, TourId};
use tourbook_client::{
    ClientConfig, EnvToken, HttpGateway, JpegCompressor, MemoryGateway, PersistenceGateway,
    StaticToken, SyncController, TokenProvider, compress_photo,
};

/// Edit the blocks of a tour.
#[derive(Parser, Debug)]
#[command(name = "tourbook")]
#[command(about = "Command-line editor for Tourbook tour blocks")]
struct Args {
    /// Config file (default: ~/.config/tourbook/client.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long)]
    api_url: Option<String>,

    /// Use an in-memory backend instead of the API
    #[arg(long)]
    memory: bool,

    /// Tour to open (a fresh id if omitted)
    #[arg(long)]
    tour: Option<TourId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List blocks in order
    List,
    /// Append a block with default content
    Add { block_type: BlockType },
    /// Set the text of a title block, or the selected place's title of a location block
    EditTitle {
        id: BlockId,
        text: String,
        /// Location alternative to edit (main location if omitted)
        #[arg(long)]
        alternative: Option<usize>,
    },
    /// Delete a block
    Delete { id: BlockId },
    /// Move a block one step
    Move { id: BlockId, direction: Direction },
    /// Promote a location alternative to main
    Switch { id: BlockId, alternative: usize },
    /// Compress an image and attach it to a block
    AddPhoto {
        id: BlockId,
        path: PathBuf,
        #[arg(long)]
        alternative: Option<usize>,
    },
    /// Renumber order indices to 0, 1, 2, …
    Repair,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        config.api_url = url;
    }

    let tour_id = args.tour.unwrap_or_default();
    let (gateway, tokens): (Arc<dyn PersistenceGateway>, Arc<dyn TokenProvider>) = if args.memory {
        tracing::info!(%tour_id, "using in-memory backend");
        (Arc::new(MemoryGateway::new()), Arc::new(StaticToken::new("local")))
    } else {
        tracing::info!(%tour_id, api = %config.api_url, "using API backend");
        (
            Arc::new(HttpGateway::from_config(&config)?),
            Arc::new(EnvToken::new(config.token_env.clone())),
        )
    };

    let sync = SyncController::new(tour_id, gateway, tokens);
    sync.load().await.context("loading tour")?;

    match args.command {
        Command::List => {}
        Command::Add { block_type } => {
            let block = sync.add_block(block_type).await?;
            println!("added {}", describe(&block));
        }
        Command::EditTitle { id, text, alternative } => {
            edit_title(&sync, id, text, alternative).await?;
        }
        Command::Delete { id } => {
            sync.delete_block(id).await?;
            println!("deleted {id}");
        }
        Command::Move { id, direction } => {
            sync.move_block(id, direction.into()).await?;
        }
        Command::Switch { id, alternative } => {
            sync.switch_location(id, alternative).await?;
        }
        Command::AddPhoto { id, path, alternative } => {
            let raw = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let uri = compress_photo(&JpegCompressor::from_config(&config.image), &raw).await?;
            add_photo(&sync, id, uri, alternative).await?;
        }
        Command::Repair => {
            let moved = sync.repair_ordering().await?;
            println!("renumbered {moved} block(s)");
        }
    }

    for block in sync.blocks() {
        println!("{}", describe(&block));
    }
    Ok(())
}

async fn edit_title(sync: &SyncController, id: BlockId, text: String, alternative: Option<usize>) -> Result<()> {
    let block = sync.block(&id).with_context(|| format!("no block {id}"))?;
    match block.content {
        BlockContent::Title(title) => {
            let content = BlockContent::Title(TitleContent { text, ..title });
            sync.update_block(id, content).await?;
        }
        BlockContent::Location(_) => {
            sync.edit_location(id, |editor| {
                editor.select(alternative)?;
                editor.update_current(LocationPatch::title(text));
                Ok(())
            })
            .await?;
        }
        other => bail!("{} blocks have no title", other.block_type()),
    }
    Ok(())
}

async fn add_photo(sync: &SyncController, id: BlockId, uri: String, alternative: Option<usize>) -> Result<()> {
    let block = sync.block(&id).with_context(|| format!("no block {id}"))?;
    let mut content = block.content;
    match &mut content {
        BlockContent::Location(_) => {
            sync.edit_location(id, |editor| {
                editor.select(alternative)?;
                editor.push_photo(uri)
            })
            .await?;
            return Ok(());
        }
        BlockContent::Photo(c) => c.photos.push(uri),
        BlockContent::PhotoText(c) => c.photos.push(uri),
        BlockContent::Slide(c) => c.photos.push(uri),
        other => bail!("{} blocks have no photo list", other.block_type()),
    }
    sync.update_block(id, content).await?;
    Ok(())
}

fn describe(block: &Block) -> String {
    let label = match &block.content {
        BlockContent::Title(c) => c.text.clone(),
        BlockContent::Text(c) => c.text.clone().unwrap_or_default(),
        BlockContent::PhotoText(c) => c.text.clone(),
        BlockContent::Slide(c) => c.title.clone(),
        BlockContent::ThreeColumns(c) => c.columns.iter().map(|col| col.text.as_str()).collect::<Vec<_>>().join(" | "),
        BlockContent::Photo(c) => format!("{} photo(s)", c.photos.len()),
        BlockContent::Divider(c) => format!("{:?}", c.style),
        BlockContent::Location(c) => format!(
            "{} (+{} alternative(s))",
            c.main_location.title,
            c.alternative_locations.len()
        ),
    };
    let label: String = label.chars().take(48).collect();
    format!("{:>3}  {}  {:<13}  {}", block.order_index, block.id, block.block_type().as_str(), label)
}
