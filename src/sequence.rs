//! Sequence encoding: tokens → (history, next token) training pairs.
//!
//! For a sequence of N tokens and a window W there are exactly
//! `max(N - W, 0)` examples. Example `i` holds the codes of
//! `tokens[i..i + W]` and is labelled with the code of `tokens[i + W]`.

mod encoder;
mod vocabulary;

pub use encoder::{EncodedSequences, SequenceEncoder};
pub use vocabulary::Vocabulary;

use crate::corpus::Token;
use crate::{Error, Result};

/// One window of codes and the code that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub input: Vec<u32>,
    pub label: u32,
}

/// All stride-1 windows of `tokens`, mapped through `vocab`.
///
/// Fails only if a token is missing from `vocab`.
pub fn training_examples(
    tokens: &[Token],
    vocab: &Vocabulary,
    window: usize,
) -> Result<Vec<TrainingExample>> {
    let codes = tokens
        .iter()
        .map(|token| {
            vocab
                .code(token)
                .ok_or_else(|| Error::UnknownToken(token.to_string()))
        })
        .collect::<Result<Vec<u32>>>()?;

    let count = codes.len().saturating_sub(window);
    let examples = (0..count)
        .map(|i| TrainingExample {
            input: codes[i..i + window].to_vec(),
            label: codes[i + window],
        })
        .collect();
    Ok(examples)
}
