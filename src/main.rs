//! stratum-mood - command-line front end
//!
//! `stratum-mood file <PATH>` classifies one `.mp3`/`.wav` file;
//! `stratum-mood folder <DIR>` classifies every audio file in a folder on a
//! background worker while the terminal shows progress.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use stratum_mood::driver::{analyze_file, spawn_folder_worker, BatchEvent};
use stratum_mood::{AnalysisConfig, LyricsConfig, MoodPipeline, MoodReport};

/// Command-line arguments for stratum-mood
#[derive(Parser, Debug)]
#[command(name = "stratum-mood")]
#[command(about = "Classify the mood of music tracks from audio features and lyric sentiment")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print one JSON object per file instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Skip lyric lookup (sentiment is neutral for every file)
    #[arg(long, global = true)]
    no_lyrics: bool,

    /// Genius API access token (overrides GENIUS_API_TOKEN)
    #[arg(long, global = true)]
    genius_token: Option<String>,

    /// Analysis sample rate in Hz
    #[arg(long, global = true, default_value_t = 22050)]
    sample_rate: u32,

    /// Timeout for each lyrics request in seconds
    #[arg(long, global = true, default_value_t = 15)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single audio file
    File {
        /// Path to an .mp3 or .wav file
        path: PathBuf,
    },
    /// Classify every .mp3/.wav file directly inside a folder
    Folder {
        /// Folder to scan (not recursive)
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let analysis = AnalysisConfig {
        target_sample_rate: args.sample_rate,
        ..AnalysisConfig::default()
    };
    let mut lyrics = LyricsConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        ..LyricsConfig::from_env()
    };
    if let Some(token) = args.genius_token.clone() {
        lyrics.token = Some(token);
    }
    if args.no_lyrics {
        lyrics.token = None;
    }
    let pipeline = MoodPipeline::from_config(analysis, &lyrics);

    match args.command {
        Command::File { path } => run_file(&pipeline, &path, args.json),
        Command::Folder { dir } => run_folder(pipeline, dir, args.json),
    }
}

fn run_file(pipeline: &MoodPipeline, path: &Path, json: bool) -> Result<()> {
    let name = display_name(path);
    if !json {
        println!("Processing {}...", name);
    }

    let outcome = analyze_file(pipeline, path).map_err(|e| e.to_string());
    print_outcome(&name, &outcome, json)?;

    if outcome.is_err() {
        anyhow::bail!("Failed to classify {}", path.display());
    }
    Ok(())
}

fn run_folder(pipeline: MoodPipeline, dir: PathBuf, json: bool) -> Result<()> {
    let (handle, events) = spawn_folder_worker(pipeline, dir.clone());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );

    for event in events {
        match event {
            BatchEvent::Started { total, .. } => pb.set_length(total as u64),
            BatchEvent::NoAudioFiles => {
                pb.suspend(|| println!("No audio files found in folder."));
            }
            BatchEvent::FileStarted { name, .. } => {
                if !json {
                    pb.suspend(|| println!("Processing {}...", name));
                }
                pb.set_message(name);
            }
            BatchEvent::FileFinished { name, outcome, .. } => {
                pb.suspend(|| print_outcome(&name, &outcome, json))?;
                pb.inc(1);
            }
            BatchEvent::Completed { .. } => {
                pb.finish_and_clear();
                if !json {
                    println!("Folder processing complete.");
                }
            }
        }
    }

    match handle.join() {
        Ok(result) => result.with_context(|| format!("Failed to process folder {}", dir.display())),
        Err(_) => anyhow::bail!("Folder worker panicked"),
    }
}

fn print_outcome(name: &str, outcome: &Result<MoodReport, String>, json: bool) -> Result<()> {
    match (outcome, json) {
        (Ok(report), true) => {
            println!("{}", serde_json::to_string(report).context("Failed to serialize report")?);
        }
        (Err(error), true) => {
            println!("{}", serde_json::json!({ "file": name, "error": error }));
        }
        (Ok(report), false) => println!("→ Mood: {}", report.label),
        (Err(error), false) => println!("→ Error: {}", error),
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
