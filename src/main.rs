use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use snake_arcade::game::{Edition, EliminationRule, GameConfig, GameEngine};
use snake_arcade::metrics::StatsStore;
use snake_arcade::metrics::store::DEFAULT_SAVE_FILE;
use snake_arcade::modes::HumanMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_arcade")]
#[command(version, about = "Grid-based arcade snake in the terminal")]
struct Cli {
    /// Rule set to play
    #[arg(long, value_enum, default_value = "ultimate")]
    edition: EditionArg,

    /// JSON config file; overrides the edition preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// When a two-player round ends
    #[arg(long, value_enum)]
    elimination: Option<EliminationArg>,

    /// Seed for reproducible rounds
    #[arg(long)]
    seed: Option<u64>,

    /// Where best score and play time are kept
    #[arg(long, default_value = DEFAULT_SAVE_FILE)]
    save_file: PathBuf,

    /// Log destination; the terminal belongs to the game
    #[arg(long, default_value = "snake_arcade.log")]
    log_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum EditionArg {
    /// Plain food, constant speed
    Basic,
    /// Power-ups and levels
    Enhanced,
    /// Every item, portal and obstacle modes, two players
    Ultimate,
}

impl From<EditionArg> for Edition {
    fn from(arg: EditionArg) -> Self {
        match arg {
            EditionArg::Basic => Edition::Basic,
            EditionArg::Enhanced => Edition::Enhanced,
            EditionArg::Ultimate => Edition::Ultimate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EliminationArg {
    /// First death ends the round
    FirstDeath,
    /// Round continues while any snake lives
    LastStanding,
}

impl From<EliminationArg> for EliminationRule {
    fn from(arg: EliminationArg) -> Self {
        match arg {
            EliminationArg::FirstDeath => EliminationRule::FirstDeath,
            EliminationArg::LastStanding => EliminationRule::LastStanding,
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::for_edition(cli.edition.into()),
    };

    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    if let Some(rule) = cli.elimination {
        config.elimination = rule.into();
    }

    config.validate().context("Invalid game configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = build_config(&cli)?;
    info!(
        edition = ?config.edition,
        width = config.grid_width,
        height = config.grid_height,
        "starting"
    );

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    };

    let mut human_mode = HumanMode::new(engine, StatsStore::new(&cli.save_file));
    human_mode.run().await?;

    Ok(())
}
