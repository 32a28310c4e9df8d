use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use murmur_cli::{build_flock, format_stats, resolve_settings, run, write_frames, ConfigFile, Overrides};
use murmur_shared::PresetLibrary;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless murmuration simulator", long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Override the number of birds
    #[arg(short, long)]
    birds: Option<usize>,

    /// Start from a named preset (see --list-presets)
    #[arg(short, long)]
    preset: Option<String>,

    /// JSON config file with simulation, text and formation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text to form in formation mode
    #[arg(long)]
    text: Option<String>,

    /// Formation source: 'text', 'circle', 'heart' or 'star'
    #[arg(long)]
    shape: Option<String>,

    /// Start in formation mode
    #[arg(long)]
    text_mode: bool,

    /// Record bird trails
    #[arg(long)]
    trails: bool,

    /// Random seed for spawning and target assignment
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log flock statistics every N ticks (0 disables)
    #[arg(short, long, default_value_t = 60)]
    report_every: u64,

    /// Write the final per-bird frames as JSON
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the built-in preset names and exit
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let library = PresetLibrary::new();
    if args.list_presets {
        for name in library.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let overrides = Overrides {
        preset: args.preset,
        birds: args.birds,
        text: args.text,
        formation: args.shape,
        text_mode: args.text_mode,
        trails: args.trails,
    };
    let settings =
        resolve_settings(config, &overrides, &library).context("Failed to resolve settings")?;

    log::info!("Murmuration starting...");
    log::info!("Birds: {}", settings.params.bird_count);
    log::info!("Seed: {}", args.seed);

    let mut flock = build_flock(&settings, args.seed);
    let stats = run(&mut flock, args.ticks, args.report_every);
    log::info!("Finished: {}", format_stats(flock.tick_count(), &stats));

    if let Some(path) = &args.dump {
        write_frames(path, &flock.frames())?;
    }

    Ok(())
}
