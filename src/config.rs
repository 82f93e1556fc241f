//! Training configuration.
//!
//! Defaults reproduce the reference training run: 160-token windows,
//! 400 epochs of batch size 64, three 512-wide LSTM layers with 40% dropout
//! and RMSProp at its stock hyperparameters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Network topology hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Hidden width of each of the three LSTM layers.
    pub lstm_units: usize,
    /// Width of the dense layer between the last LSTM and the output.
    pub dense_units: usize,
    /// Dropout probability applied after LSTM 1, LSTM 2 and the dense layer.
    pub dropout: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            lstm_units: 512,
            dense_units: 256,
            dropout: 0.4,
        }
    }
}

/// RMSProp hyperparameters, defaulting to lr 0.001, rho 0.9, eps 1e-7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsPropConfig {
    pub learning_rate: f64,
    /// Decay factor for the running average of squared gradients.
    pub rho: f64,
    pub epsilon: f64,
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            rho: 0.9,
            epsilon: 1e-7,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    // --- Corpus ---
    /// Directory scanned (non-recursively) for MIDI files.
    pub midi_dir: PathBuf,
    /// File extension of MIDI files, without the dot.
    pub midi_extension: String,
    /// Where the extracted token sequence is written.
    pub notes_path: PathBuf,
    /// Load tokens from `notes_path` instead of parsing `midi_dir`.
    pub reuse_notes: bool,

    // --- Encoding ---
    /// Number of tokens of history per training example.
    pub window: usize,

    // --- Fit ---
    pub epochs: usize,
    pub batch_size: usize,
    /// Seed for the per-epoch batch shuffle.
    pub seed: u64,
    /// Directory receiving `weights-improvement-*` snapshots.
    pub checkpoint_dir: PathBuf,

    pub model: ModelConfig,
    pub optimizer: RmsPropConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            midi_dir: PathBuf::from("midi_songs"),
            midi_extension: "mid".to_string(),
            notes_path: PathBuf::from("data/notes"),
            reuse_notes: false,
            window: 160,
            epochs: 400,
            batch_size: 64,
            seed: 0,
            checkpoint_dir: PathBuf::from("."),
            model: ModelConfig::default(),
            optimizer: RmsPropConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a training run.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Config("window must be at least 1".into()));
        }
        if self.epochs == 0 {
            return Err(Error::Config("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.model.lstm_units == 0 || self.model.dense_units == 0 {
            return Err(Error::Config("layer widths must be non-zero".into()));
        }
        if !(0.0..1.0).contains(&self.model.dropout) {
            return Err(Error::Config(format!(
                "dropout must be in [0, 1), got {}",
                self.model.dropout
            )));
        }
        if self.optimizer.learning_rate <= 0.0 {
            return Err(Error::Config(format!(
                "learning_rate must be positive, got {}",
                self.optimizer.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.optimizer.rho) {
            return Err(Error::Config(format!(
                "rho must be in [0, 1), got {}",
                self.optimizer.rho
            )));
        }
        if self.optimizer.epsilon.is_nan() || self.optimizer.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "epsilon must be non-negative, got {}",
                self.optimizer.epsilon
            )));
        }
        Ok(())
    }
}
