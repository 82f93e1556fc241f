//! Corpus extraction: MIDI files → flat token sequence.
//!
//! Each file is parsed into a [`Score`]. When the score can be partitioned
//! by instrument, only the first part is tokenized; otherwise every note and
//! chord in the file is used. Files are visited in sorted path order and
//! their tokens concatenated.

mod chord;
mod pitch;
pub mod score;
mod store;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

pub use chord::Chord;
pub use pitch::Pitch;
pub use score::{Element, Instrument, Part, PartitionError, Score};
pub use store::{load_tokens, save_tokens};

use crate::{Error, Result};

/// One musical event: a pitch name (`C#4`) or a chord's normal order (`0.4.7`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turn an element stream into tokens. Elements other than notes and chords
/// produce nothing.
pub fn tokenize<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Vec<Token> {
    elements
        .into_iter()
        .filter_map(|element| match element {
            Element::Note(pitch) => Some(Token(pitch.name())),
            Element::Chord(chord) => Some(Token(chord.token())),
            Element::Instrument(_) => None,
        })
        .collect()
}

/// Tokens of one parsed score.
///
/// Only [`PartitionError`] selects the flat fallback.
pub fn score_tokens(score: &Score) -> Vec<Token> {
    let first_part = score
        .partition_by_instrument()
        .and_then(|parts| parts.into_iter().next().ok_or(PartitionError::NoParts));

    match first_part {
        Ok(part) => {
            tracing::debug!(instrument = ?part.instrument, "using first instrument part");
            tokenize(part.elements())
        }
        Err(reason) => {
            tracing::debug!(%reason, "falling back to flat note list");
            tokenize(&score.flat_notes())
        }
    }
}

/// Parse one MIDI file and tokenize it.
pub fn extract_tokens(path: impl AsRef<Path>) -> Result<Vec<Token>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let smf = midly::Smf::parse(&bytes)
        .map_err(|e| Error::Midi(format!("{}: {e}", path.display())))?;
    let score = Score::from_smf(&smf);
    tracing::debug!(
        file = %path.display(),
        tracks = score.track_count(),
        onsets = score.onset_count(),
        "parsed score"
    );
    Ok(score_tokens(&score))
}

/// Files directly under `dir` whose extension is exactly `extension`,
/// sorted by path.
pub fn midi_files(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == extension);
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Tokenize every MIDI file under `dir` and concatenate the results.
///
/// Fails with [`Error::EmptyCorpus`] when no tokens were found.
pub fn extract_corpus(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<Token>> {
    let dir = dir.as_ref();
    let files = midi_files(dir, extension)?;
    tracing::info!(dir = %dir.display(), files = files.len(), "extracting corpus");

    let mut tokens = Vec::new();
    for file in &files {
        let file_tokens = extract_tokens(file)?;
        tracing::debug!(file = %file.display(), tokens = file_tokens.len(), "tokenized");
        tokens.extend(file_tokens);
    }

    if tokens.is_empty() {
        return Err(Error::EmptyCorpus {
            dir: dir.to_path_buf(),
        });
    }
    tracing::info!(tokens = tokens.len(), "corpus extracted");
    Ok(tokens)
}
