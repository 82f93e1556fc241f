//! Training loop.
//!
//! Fits a [`NoteLstm`] on every encoded example (no validation split) for a
//! fixed number of epochs. After each epoch the example-weighted mean batch
//! loss is handed to [`BestLossCheckpoint`]; improving epochs write the full
//! [`VarMap`] as safetensors.

mod batches;
mod checkpoint;

pub use batches::BatchSampler;
pub use checkpoint::BestLossCheckpoint;

use std::path::PathBuf;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Optimizer, VarBuilder, VarMap};
use serde::Serialize;

use crate::config::TrainingConfig;
use crate::model::{NoteLstm, categorical_cross_entropy, set_unit_forget_bias};
use crate::optim::RmsProp;
use crate::sequence::EncodedSequences;
use crate::{Error, Result};

/// Outcome of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    pub loss: f32,
    /// Snapshot written after this epoch, if the loss improved.
    pub checkpoint: Option<PathBuf>,
}

/// Outcome of a full fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub examples: usize,
    pub vocab_size: usize,
    pub best_epoch: Option<usize>,
    pub best_loss: Option<f32>,
    pub checkpoints: Vec<PathBuf>,
}

/// Owns the model parameters and optimizer state for one run.
pub struct Trainer {
    varmap: VarMap,
    model: NoteLstm,
    optimizer: RmsProp,
    sampler: BatchSampler,
    checkpoint: BestLossCheckpoint,
    epochs: usize,
}

impl Trainer {
    /// Build a freshly initialized model for a vocabulary of `vocab_size`.
    pub fn new(config: &TrainingConfig, vocab_size: usize, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let model = NoteLstm::new(&config.model, vocab_size, vb)?;
        set_unit_forget_bias(&varmap, config.model.lstm_units)?;
        let optimizer = RmsProp::new(varmap.all_vars(), config.optimizer.clone())?;

        tracing::info!(
            vocab_size,
            lstm_units = config.model.lstm_units,
            dense_units = config.model.dense_units,
            parameters = varmap.all_vars().iter().map(|v| v.elem_count()).sum::<usize>(),
            "model initialized"
        );

        Ok(Self {
            varmap,
            model,
            optimizer,
            sampler: BatchSampler::new(config.batch_size, config.seed),
            checkpoint: BestLossCheckpoint::new(&config.checkpoint_dir),
            epochs: config.epochs,
        })
    }

    pub fn model(&self) -> &NoteLstm {
        &self.model
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// One pass over all examples in shuffled batches. Returns the
    /// example-weighted mean batch loss.
    pub fn train_epoch(&mut self, data: &EncodedSequences) -> Result<f32> {
        if data.is_empty() {
            return Err(Error::InsufficientTokens {
                tokens: 0,
                window: data.inputs.dim(1)?,
            });
        }

        let device = data.inputs.device();
        let mut weighted = 0f64;
        for batch in self.sampler.epoch(data.len()) {
            let idx = Tensor::new(batch.as_slice(), device)?;
            let xs = data.inputs.index_select(&idx, 0)?;
            let ys = data.targets.index_select(&idx, 0)?;

            let logits = self.model.logits(&xs, true)?;
            let loss = categorical_cross_entropy(&logits, &ys)?;
            self.optimizer.backward_step(&loss)?;

            weighted += loss.to_scalar::<f32>()? as f64 * batch.len() as f64;
        }
        Ok((weighted / data.len() as f64) as f32)
    }

    /// Run every epoch, saving a snapshot whenever the loss improves.
    ///
    /// `on_epoch` is called after each epoch (and after any snapshot write).
    pub fn fit(
        &mut self,
        data: &EncodedSequences,
        mut on_epoch: impl FnMut(&EpochReport),
    ) -> Result<TrainingSummary> {
        let mut summary = TrainingSummary {
            epochs: 0,
            examples: data.len(),
            vocab_size: data.vocab_size,
            best_epoch: None,
            best_loss: None,
            checkpoints: Vec::new(),
        };

        if !self.checkpoint.dir().as_os_str().is_empty() {
            std::fs::create_dir_all(self.checkpoint.dir())?;
        }

        for epoch in 1..=self.epochs {
            let loss = self.train_epoch(data)?;
            let checkpoint = self.checkpoint.observe(epoch, loss);
            if let Some(path) = &checkpoint {
                self.varmap.save(path)?;
                tracing::info!(epoch, loss, path = %path.display(), "loss improved, saved snapshot");
                summary.best_epoch = Some(epoch);
                summary.best_loss = Some(loss);
                summary.checkpoints.push(path.clone());
            } else {
                tracing::info!(epoch, loss, "epoch complete");
            }

            summary.epochs = epoch;
            on_epoch(&EpochReport {
                epoch,
                loss,
                checkpoint,
            });
        }

        Ok(summary)
    }
}
