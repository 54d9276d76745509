//! Bit-length record and decoded text files.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::recovery::{LengthMetadata, ParseLengthError};

/// Errors reading or writing the bit-length record.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The record could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Record path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The record does not hold a bit length.
    #[error(transparent)]
    Parse(#[from] ParseLengthError),
}

/// Writes the bit length as a plain-text integer.
pub fn write_metadata(
    path: impl AsRef<Path>,
    metadata: LengthMetadata,
) -> Result<(), MetadataError> {
    let path = path.as_ref();
    std::fs::write(path, metadata.to_string()).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bits = metadata.bits(), "Saved bit length");
    Ok(())
}

/// Reads a bit length written by [`write_metadata`].
pub fn read_metadata(path: impl AsRef<Path>) -> Result<LengthMetadata, MetadataError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = content.parse::<LengthMetadata>()?;
    tracing::info!(path = %path.display(), bits = metadata.bits(), "Read bit length");
    Ok(metadata)
}

/// Writes recovered text as UTF-8.
pub fn write_text(path: impl AsRef<Path>, text: &str) -> Result<(), super::MediaError> {
    let path = path.as_ref();
    std::fs::write(path, text).map_err(|e| super::MediaError::io(path, e))?;
    tracing::info!(path = %path.display(), chars = text.chars().count(), "Saved decoded text");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bitgrid-{name}-{}.txt", std::process::id()))
    }

    #[test]
    fn test_metadata_round_trip() {
        let path = scratch_file("meta-roundtrip");
        write_metadata(&path, LengthMetadata(16)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "16");
        assert_eq!(read_metadata(&path).unwrap(), LengthMetadata(16));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_metadata_tolerates_newline() {
        let path = scratch_file("meta-newline");
        std::fs::write(&path, "37\n").unwrap();
        assert_eq!(read_metadata(&path).unwrap(), LengthMetadata(37));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_metadata_not_an_integer() {
        let path = scratch_file("meta-garbage");
        std::fs::write(&path, "lots of bits").unwrap();
        assert!(matches!(read_metadata(&path), Err(MetadataError::Parse(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_metadata_missing_file() {
        let result = read_metadata(scratch_file("meta-absent"));
        assert!(matches!(result, Err(MetadataError::Io { .. })));
    }

    #[test]
    fn test_write_text_utf8() {
        let path = scratch_file("text-out");
        write_text(&path, "Grüße €").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Grüße €");
        let _ = std::fs::remove_file(&path);
    }
}
