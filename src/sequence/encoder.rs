//! Tensor encoding of training examples.

use candle_core::{Device, Tensor};

use super::{Vocabulary, training_examples};
use crate::corpus::Token;
use crate::{Error, Result};

/// Model-ready training data.
#[derive(Debug, Clone)]
pub struct EncodedSequences {
    /// `[N, W, 1]` f32, each value `code / V`.
    pub inputs: Tensor,
    /// `[N, V]` f32 one-hot rows.
    pub targets: Tensor,
    /// Integer label of each example.
    pub labels: Vec<u32>,
    pub vocab_size: usize,
}

impl EncodedSequences {
    /// Number of examples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Slides a fixed-width window over a token sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder {
    window: usize,
}

impl SequenceEncoder {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Encode all windows of `tokens` against `vocab`.
    ///
    /// Returns [`Error::InsufficientTokens`] when `tokens.len() <= window`.
    pub fn encode(
        &self,
        tokens: &[Token],
        vocab: &Vocabulary,
        device: &Device,
    ) -> Result<EncodedSequences> {
        let examples = training_examples(tokens, vocab, self.window)?;
        if examples.is_empty() {
            return Err(Error::InsufficientTokens {
                tokens: tokens.len(),
                window: self.window,
            });
        }

        let n = examples.len();
        let scale = vocab.len() as f32;
        let flat: Vec<f32> = examples
            .iter()
            .flat_map(|e| e.input.iter().map(|&code| code as f32 / scale))
            .collect();
        let inputs = Tensor::from_vec(flat, (n, self.window, 1), device)?;

        let labels: Vec<u32> = examples.iter().map(|e| e.label).collect();
        let indices = Tensor::new(labels.as_slice(), device)?;
        let targets = candle_nn::encoding::one_hot(indices, vocab.len(), 1f32, 0f32)?;

        tracing::debug!(examples = n, window = self.window, vocab = vocab.len(), "encoded");
        Ok(EncodedSequences {
            inputs,
            targets,
            labels,
            vocab_size: vocab.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeated(pattern: &[&str], times: usize) -> Vec<Token> {
        (0..times)
            .flat_map(|_| pattern.iter().map(|&t| Token::from(t)))
            .collect()
    }

    #[test]
    fn test_shapes_and_scaling() {
        let tokens = repeated(&["C4", "D4", "E4"], 10);
        let vocab = Vocabulary::from_tokens(&tokens);
        let encoded = SequenceEncoder::new(2)
            .encode(&tokens, &vocab, &Device::Cpu)
            .unwrap();

        assert_eq!(encoded.len(), 28);
        assert_eq!(encoded.inputs.dims(), &[28, 2, 1]);
        assert_eq!(encoded.targets.dims(), &[28, 3]);

        let inputs = encoded.inputs.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        for (position, value) in inputs.iter().enumerate() {
            // Example i, step j holds token i + j; codes cycle 0, 1, 2.
            let (i, j) = (position / 2, position % 2);
            let expected = ((i + j) % 3) as f32 / 3.0;
            assert!((value - expected).abs() < 1e-6);
            assert!((0.0..1.0).contains(value));
        }
    }

    #[test]
    fn test_targets_are_one_hot() {
        let tokens = repeated(&["C4", "D4", "E4"], 10);
        let vocab = Vocabulary::from_tokens(&tokens);
        let encoded = SequenceEncoder::new(2)
            .encode(&tokens, &vocab, &Device::Cpu)
            .unwrap();

        let rows = encoded.targets.to_vec2::<f32>().unwrap();
        for (row, &label) in rows.iter().zip(&encoded.labels) {
            assert_eq!(row.len(), 3);
            assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(row.iter().filter(|&&v| v == 0.0).count(), 2);
            assert_eq!(row[label as usize], 1.0);
        }
        // First window is C4 D4, followed by E4.
        assert_eq!(encoded.labels[0], 2);
    }

    #[test]
    fn test_too_few_tokens() {
        let tokens = repeated(&["C4", "D4"], 1);
        let vocab = Vocabulary::from_tokens(&tokens);
        let err = SequenceEncoder::new(2)
            .encode(&tokens, &vocab, &Device::Cpu)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientTokens {
                tokens: 2,
                window: 2
            }
        ));
    }
}
