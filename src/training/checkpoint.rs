//! Save-best-only checkpoint policy keyed on training loss.

use std::path::{Path, PathBuf};

/// Tracks the lowest epoch loss and names a snapshot whenever it improves.
#[derive(Debug, Clone)]
pub struct BestLossCheckpoint {
    dir: PathBuf,
    best: Option<f32>,
}

impl BestLossCheckpoint {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            best: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lowest loss observed so far.
    pub fn best(&self) -> Option<f32> {
        self.best
    }

    /// `weights-improvement-{epoch:02}-{loss:.4}-bigger.safetensors`
    pub fn file_name(epoch: usize, loss: f32) -> String {
        format!("weights-improvement-{epoch:02}-{loss:.4}-bigger.safetensors")
    }

    /// Record one epoch's loss. Returns the snapshot path when `loss` is
    /// strictly below every previous loss. NaN never improves.
    pub fn observe(&mut self, epoch: usize, loss: f32) -> Option<PathBuf> {
        if loss.is_nan() {
            return None;
        }
        let improved = self.best.is_none_or(|best| loss < best);
        if !improved {
            return None;
        }
        self.best = Some(loss);
        Some(self.dir.join(Self::file_name(epoch, loss)))
    }
}
