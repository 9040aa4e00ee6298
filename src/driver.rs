//! Single-file and folder drivers
//!
//! Folder mode runs on one background worker that reports through an mpsc
//! channel. The worker is the only sender; the presentation side (progress
//! bar, result lines) only drains the receiver.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use stratum_mood::driver::{spawn_folder_worker, BatchEvent};
//! use stratum_mood::{AnalysisConfig, LyricsConfig, MoodPipeline};
//!
//! let pipeline = MoodPipeline::from_config(AnalysisConfig::default(), &LyricsConfig::from_env());
//! let (handle, events) = spawn_folder_worker(pipeline, PathBuf::from("music"));
//! for event in events {
//!     if let BatchEvent::FileFinished { name, outcome, .. } = event {
//!         println!("{}: {:?}", name, outcome.map(|r| r.label));
//!     }
//! }
//! # let _ = handle.join();
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::analysis::result::{MoodLabel, MoodReport};
use crate::error::AnalysisError;
use crate::pipeline::MoodPipeline;

/// File name suffixes treated as audio (case-sensitive)
pub const AUDIO_EXTENSIONS: [&str; 2] = [".mp3", ".wav"];

/// Progress events emitted by the folder worker
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Folder listed
    Started {
        /// Folder being processed
        folder: PathBuf,
        /// Number of audio files found
        total: usize,
    },
    /// Folder contains no audio files
    NoAudioFiles,
    /// Starting a file
    FileStarted {
        /// Zero-based position in the batch
        index: usize,
        /// Batch size
        total: usize,
        /// File name
        name: String,
    },
    /// Finished a file
    FileFinished {
        /// Zero-based position in the batch
        index: usize,
        /// File name
        name: String,
        /// Report, or the error message for this file
        outcome: Result<MoodReport, String>,
    },
    /// Every file has been processed
    Completed {
        /// Files that produced a label
        processed: usize,
        /// Files that failed
        failed: usize,
    },
}

/// True for names ending in `.mp3` or `.wav`
pub fn is_audio_file_name(name: &str) -> bool {
    AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// List audio files directly inside `dir`, in filesystem order
///
/// Subdirectories are not descended into. Symlinks are followed, so a link
/// to an audio file is listed like the file itself. Entries that cannot be
/// read are skipped with a warning.
///
/// # Errors
///
/// Returns `AnalysisError::Io` if the directory cannot be read.
pub fn list_audio_files(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !is_audio_file_name(&entry.file_name().to_string_lossy()) || !path.is_file() {
            continue;
        }
        files.push(path);
    }
    log::debug!("Found {} audio files in {}", files.len(), dir.display());
    Ok(files)
}

/// Analyse a single user-selected file
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for names without an audio
/// extension, otherwise whatever the pipeline reports.
pub fn analyze_file(pipeline: &MoodPipeline, path: &Path) -> Result<MoodReport, AnalysisError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_audio_file_name(&name) {
        return Err(AnalysisError::InvalidInput(format!(
            "Not an audio file (expected {}): {}",
            AUDIO_EXTENSIONS.join(" or "),
            path.display()
        )));
    }
    pipeline.analyze(path)
}

/// Process every audio file in `dir`, reporting through `tx`
///
/// A failing file is reported and skipped; the batch always runs to the end.
/// Send errors (receiver dropped) are ignored.
///
/// # Errors
///
/// Returns `AnalysisError::Io` only if the folder itself cannot be listed.
pub fn run_folder(
    pipeline: &MoodPipeline,
    dir: &Path,
    tx: &Sender<BatchEvent>,
) -> Result<(), AnalysisError> {
    let files = list_audio_files(dir)?;
    let total = files.len();

    let _ = tx.send(BatchEvent::Started {
        folder: dir.to_path_buf(),
        total,
    });
    if files.is_empty() {
        let _ = tx.send(BatchEvent::NoAudioFiles);
    }

    let mut processed = 0;
    let mut failed = 0;

    for (index, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = tx.send(BatchEvent::FileStarted {
            index,
            total,
            name: name.clone(),
        });

        let outcome = pipeline.analyze(path).map_err(|e| {
            log::warn!("Failed to analyze {}: {}", name, e);
            e.to_string()
        });
        if outcome.is_ok() {
            processed += 1;
        } else {
            failed += 1;
        }

        let _ = tx.send(BatchEvent::FileFinished {
            index,
            name,
            outcome,
        });
    }

    log::info!(
        "Folder {} complete: {} processed, {} failed",
        dir.display(),
        processed,
        failed
    );
    let _ = tx.send(BatchEvent::Completed { processed, failed });
    Ok(())
}

/// Run [`run_folder`] on a background thread
///
/// # Returns
///
/// The worker handle (carrying a folder listing error, if any) and the event
/// receiver. The receiver closes when the worker finishes.
pub fn spawn_folder_worker(
    pipeline: MoodPipeline,
    dir: PathBuf,
) -> (JoinHandle<Result<(), AnalysisError>>, Receiver<BatchEvent>) {
    let (tx, rx) = mpsc::channel();
    let handle = std::thread::spawn(move || run_folder(&pipeline, &dir, &tx));
    (handle, rx)
}

/// Per-file results of a batch, in processing order
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// `(file name, label or error message)`
    pub entries: Vec<(String, Result<MoodLabel, String>)>,

    /// A completion marker was seen
    pub completed: bool,
}

impl BatchSummary {
    /// Fold a stream of events into a summary
    pub fn collect(events: impl IntoIterator<Item = BatchEvent>) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                BatchEvent::FileFinished { name, outcome, .. } => {
                    summary.entries.push((name, outcome.map(|report| report.label)));
                }
                BatchEvent::Completed { .. } => summary.completed = true,
                _ => {}
            }
        }
        summary
    }

    /// Number of files that failed
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_err()).count()
    }
}
