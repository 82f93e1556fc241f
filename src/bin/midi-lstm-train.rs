//! Train the next-note LSTM on a directory of MIDI files.
//!
//! With no arguments, reads `midi_songs/*.mid`, writes `data/notes`, and
//! trains for 400 epochs, saving `weights-improvement-*.safetensors` into
//! the working directory whenever the loss improves.
//!
//! # Output
//!
//! Prints a one-line JSON summary to stdout on success:
//!
//! ```json
//! {"epochs":400,"examples":57017,"vocab_size":358,"best_epoch":398,"best_loss":0.2113,"checkpoints":[...]}
//! ```
//!
//! Exit code 0 on success, non-zero on error.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use midi_lstm::config::TrainingConfig;
use midi_lstm::pipeline::TrainingPipeline;

#[derive(Parser, Debug)]
#[command(
    name = "midi-lstm-train",
    about = "Train a next-note LSTM on MIDI files",
    long_about = "Extract notes and chords from MIDI files, encode them as \
                  fixed-length windows, and fit a three-layer LSTM.\n\
                  Options override values from --config, which override the defaults."
)]
struct Args {
    /// JSON file with a TrainingConfig. Missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the MIDI corpus.
    #[arg(long)]
    midi_dir: Option<PathBuf>,

    /// Token file written after extraction.
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Skip parsing and reload tokens from the token file.
    #[arg(long)]
    reuse_notes: bool,

    /// Directory for weight snapshots.
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Tokens of history per example.
    #[arg(long, short = 'w')]
    window: Option<usize>,

    #[arg(long, short = 'e')]
    epochs: Option<usize>,

    #[arg(long, short = 'b')]
    batch_size: Option<usize>,

    /// Seed for batch shuffling.
    #[arg(long, short = 's')]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => TrainingConfig::default(),
        };

        if let Some(dir) = self.midi_dir {
            config.midi_dir = dir;
        }
        if let Some(notes) = self.notes {
            config.notes_path = notes;
        }
        if self.reuse_notes {
            config.reuse_notes = true;
        }
        if let Some(dir) = self.checkpoint_dir {
            config.checkpoint_dir = dir;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config()?;
    config.validate()?;

    let device = candle_core::Device::cuda_if_available(0)?;
    tracing::info!("Using device: {:?}", device);

    let mut pipeline = TrainingPipeline::new(config, device);
    let summary = pipeline.run().context("training failed")?;

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
