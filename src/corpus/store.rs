//! Token sequence persistence (`data/notes`).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::Token;
use crate::Result;

/// Write `tokens` to `path` with bincode, replacing any previous file.
///
/// Parent directories are created as needed.
pub fn save_tokens(path: impl AsRef<Path>, tokens: &[Token]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, tokens)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), tokens = tokens.len(), "wrote token file");
    Ok(())
}

/// Read a token sequence written by [`save_tokens`].
pub fn load_tokens(path: impl AsRef<Path>) -> Result<Vec<Token>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let tokens: Vec<Token> = bincode::deserialize_from(reader)?;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("notes");

        save_tokens(&path, &[Token::from("C4"), Token::from("0.4.7")]).unwrap();
        save_tokens(&path, &[Token::from("E-5")]).unwrap();

        let loaded = load_tokens(&path).unwrap();
        assert_eq!(loaded, vec![Token::from("E-5")]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_tokens(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
