/// cyoa: play, analyse, print, or check a Choose-Your-Own-Adventure story.
///
/// Usage: cyoa [--config <file.ron>] <play|paths|print|check> <story_dir>
///
/// The story directory holds `story.txt` (or the configured story file)
/// and every page text file it names.

use clap::{Parser, Subcommand};
use cyoa_engine::core::builder::DirSource;
use cyoa_engine::core::config::PlayConfig;
use cyoa_engine::core::error::StoryError;
use cyoa_engine::core::search::{all_winning_paths, format_report};
use cyoa_engine::core::session::play;
use cyoa_engine::schema::story::Story;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cyoa")]
#[command(about = "Choose-Your-Own-Adventure story player and analyser")]
#[command(version)]
struct Args {
    /// RON play configuration (story file name, messages)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the story interactively from page 0
    Play { dir: PathBuf },
    /// List every path from page 0 to each win page
    Paths { dir: PathBuf },
    /// Print every page in order
    Print { dir: PathBuf },
    /// Load and validate the story, then summarise it
    Check { dir: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), StoryError> {
    let config = match args.config {
        Some(ref path) => PlayConfig::load_from_ron(path)?,
        None => PlayConfig::default(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Play { dir } => {
            let mut story = load(&dir, &config)?;
            let stdin = io::stdin();
            play(&mut story, &config, stdin.lock(), &mut out)?;
        }
        Command::Paths { dir } => {
            let story = load(&dir, &config)?;
            let paths = all_winning_paths(&story);
            write!(out, "{}", format_report(&story, &paths, &config.unwinnable))?;
        }
        Command::Print { dir } => {
            let story = load(&dir, &config)?;
            write!(out, "{}", story.render_all())?;
        }
        Command::Check { dir } => {
            let story = load(&dir, &config)?;
            writeln!(out, "{}", story.summary())?;
        }
    }

    out.flush()?;
    Ok(())
}

fn load(dir: &Path, config: &PlayConfig) -> Result<Story, StoryError> {
    Story::builder(&DirSource::new(dir))
        .story_file(&config.story_file)
        .build()
}
