use anyhow::Context;
use clap::Parser;
use quadskip::{CommandProcessor, Config, SpatialDb};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Run a command file against an in-memory name and location index.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command file, one command per line.
    file: PathBuf,

    /// Configuration file (JSON, or TOML when built with the `toml` feature).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the skip list level generator. Overrides the config file.
    #[arg(short, long)]
    seed: Option<u64>,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;

    #[cfg(feature = "toml")]
    if path.extension().is_some_and(|ext| ext == "toml") {
        return Ok(Config::from_toml(&text)?);
    }

    Ok(Config::from_json(&text)?)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let db = SpatialDb::builder().config(config).build()?;

    let input = File::open(&args.file)
        .with_context(|| format!("opening command file {}", args.file.display()))?;
    let stdout = io::stdout().lock();
    let mut processor = CommandProcessor::new(db, stdout);
    let executed = processor.run(BufReader::new(input))?;

    log::info!("Executed {} commands from {}", executed, args.file.display());
    Ok(())
}
