//! End-to-end training pipeline.
//!
//! Runs the three stages once, in order:
//! 1. Extract tokens from the MIDI directory (or reload `data/notes`)
//! 2. Build the vocabulary and encode windows into tensors
//! 3. Fit the LSTM, snapshotting on every loss improvement
//!
//! ```no_run
//! use midi_lstm::config::TrainingConfig;
//! use midi_lstm::pipeline::TrainingPipeline;
//!
//! let mut pipeline = TrainingPipeline::new(TrainingConfig::default(), candle_core::Device::Cpu);
//! let summary = pipeline.run().unwrap();
//! println!("best loss {:?}", summary.best_loss);
//! ```

use candle_core::Device;

use crate::config::TrainingConfig;
use crate::corpus::{self, Token};
use crate::sequence::{EncodedSequences, SequenceEncoder, Vocabulary};
use crate::training::{Trainer, TrainingSummary};
use crate::Result;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    Extracting,
    Encoding,
    /// Last completed epoch (1-based); `0` before the first epoch finishes.
    Training { epoch: usize },
    Done,
}

/// One configured training run.
pub struct TrainingPipeline {
    config: TrainingConfig,
    device: Device,
    stage: Stage,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig, device: Device) -> Self {
        Self {
            config,
            device,
            stage: Stage::NotStarted,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run extraction, encoding and training.
    pub fn run(&mut self) -> Result<TrainingSummary> {
        self.config.validate()?;

        let tokens = self.extract()?;
        let (vocab, encoded) = self.encode(&tokens)?;
        let summary = self.train(&encoded)?;

        tracing::info!(
            vocab_size = vocab.len(),
            best_loss = ?summary.best_loss,
            checkpoints = summary.checkpoints.len(),
            "training finished"
        );
        Ok(summary)
    }

    /// Stage 1: produce the token sequence and persist it.
    pub fn extract(&mut self) -> Result<Vec<Token>> {
        self.stage = Stage::Extracting;

        if self.config.reuse_notes {
            tracing::info!(path = %self.config.notes_path.display(), "reusing token file");
            return corpus::load_tokens(&self.config.notes_path);
        }

        let tokens = corpus::extract_corpus(&self.config.midi_dir, &self.config.midi_extension)?;
        corpus::save_tokens(&self.config.notes_path, &tokens)?;
        Ok(tokens)
    }

    /// Stage 2: vocabulary plus model-ready tensors.
    pub fn encode(&mut self, tokens: &[Token]) -> Result<(Vocabulary, EncodedSequences)> {
        self.stage = Stage::Encoding;

        let vocab = Vocabulary::from_tokens(tokens);
        let encoded = SequenceEncoder::new(self.config.window).encode(tokens, &vocab, &self.device)?;
        tracing::info!(
            tokens = tokens.len(),
            vocab_size = vocab.len(),
            examples = encoded.len(),
            window = self.config.window,
            "sequences encoded"
        );
        Ok((vocab, encoded))
    }

    /// Stage 3: fit the model.
    pub fn train(&mut self, encoded: &EncodedSequences) -> Result<TrainingSummary> {
        self.stage = Stage::Training { epoch: 0 };

        let mut trainer = Trainer::new(&self.config, encoded.vocab_size, &self.device)?;
        let stage = &mut self.stage;
        let summary = trainer.fit(encoded, |report| {
            *stage = Stage::Training {
                epoch: report.epoch,
            };
        })?;

        self.stage = Stage::Done;
        Ok(summary)
    }
}
