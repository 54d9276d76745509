//! Bit-length record and padding removal.

use std::fmt;
use std::str::FromStr;

use super::Condition;
use crate::bits::BitString;

/// The true payload bit length, recorded before padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LengthMetadata(pub usize);

impl LengthMetadata {
    /// Returns the recorded bit length.
    #[inline]
    pub fn bits(&self) -> usize {
        self.0
    }
}

/// Metadata text that is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("metadata {content:?} is not a bit length: {reason}")]
pub struct ParseLengthError {
    /// Text that failed to parse.
    pub content: String,
    /// Parser message.
    pub reason: String,
}

impl FromStr for LengthMetadata {
    type Err = ParseLengthError;

    /// Parses a plain integer, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<usize>()
            .map(LengthMetadata)
            .map_err(|e| ParseLengthError {
                content: trimmed.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for LengthMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What [`truncate`] did with the raw bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncation {
    /// Cut to the declared length.
    Truncated {
        /// Bits before truncation.
        from: usize,
        /// Bits kept.
        to: usize,
    },
    /// No usable metadata; bits returned unchanged.
    NoMetadata,
    /// Fewer bits than declared; bits returned unchanged.
    InsufficientData {
        /// Bits available.
        recovered: usize,
        /// Bits declared.
        declared: usize,
    },
}

impl Truncation {
    /// The warning this outcome raises, if any.
    pub fn condition(&self, reason: impl Into<String>) -> Option<Condition> {
        match *self {
            Truncation::Truncated { .. } => None,
            Truncation::NoMetadata => Some(Condition::MetadataMissing {
                reason: reason.into(),
            }),
            Truncation::InsufficientData {
                recovered,
                declared,
            } => Some(Condition::InsufficientData {
                recovered,
                declared,
            }),
        }
    }
}

/// Strips trailing padding from `raw` using the declared bit length.
///
/// Returns the raw bits unchanged when the length is unknown or larger
/// than what was recovered; both cases are reported, never fatal.
pub fn truncate(raw: &BitString, declared: Option<LengthMetadata>) -> (BitString, Truncation) {
    let Some(LengthMetadata(declared)) = declared else {
        tracing::warn!(bits = raw.len(), "No bit length available, using raw bits");
        return (raw.clone(), Truncation::NoMetadata);
    };

    if raw.len() >= declared {
        tracing::debug!(from = raw.len(), to = declared, "Truncated padding");
        return (
            raw.prefix(declared),
            Truncation::Truncated {
                from: raw.len(),
                to: declared,
            },
        );
    }

    tracing::warn!(
        recovered = raw.len(),
        declared,
        "Recovered fewer bits than declared, frames may be missing"
    );
    (
        raw.clone(),
        Truncation::InsufficientData {
            recovered: raw.len(),
            declared,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(len: usize) -> BitString {
        (0..len).map(|i| i % 2 == 0).collect()
    }

    #[test]
    fn test_truncates_to_declared_length() {
        let bits = raw(200);
        let (out, outcome) = truncate(&bits, Some(LengthMetadata(37)));
        assert_eq!(out.len(), 37);
        assert_eq!(out, bits.prefix(37));
        assert_eq!(outcome, Truncation::Truncated { from: 200, to: 37 });
        assert!(outcome.condition("").is_none());
    }

    #[test]
    fn test_exact_length_kept() {
        let bits = raw(100);
        let (out, _) = truncate(&bits, Some(LengthMetadata(100)));
        assert_eq!(out, bits);
    }

    #[test]
    fn test_insufficient_data_unchanged() {
        let bits = raw(200);
        let (out, outcome) = truncate(&bits, Some(LengthMetadata(500)));
        assert_eq!(out, bits);
        assert_eq!(
            outcome,
            Truncation::InsufficientData {
                recovered: 200,
                declared: 500
            }
        );
        assert!(matches!(
            outcome.condition(""),
            Some(Condition::InsufficientData { declared: 500, .. })
        ));
    }

    #[test]
    fn test_missing_metadata_unchanged() {
        let bits = raw(30);
        let (out, outcome) = truncate(&bits, None);
        assert_eq!(out, bits);
        assert_eq!(outcome, Truncation::NoMetadata);
        assert!(matches!(
            outcome.condition("not found"),
            Some(Condition::MetadataMissing { reason }) if reason == "not found"
        ));
    }

    #[test]
    fn test_parse_metadata() {
        assert_eq!("16\n".parse::<LengthMetadata>(), Ok(LengthMetadata(16)));
        assert_eq!("  0 ".parse::<LengthMetadata>(), Ok(LengthMetadata(0)));
        assert!("sixteen".parse::<LengthMetadata>().is_err());
        assert!("-4".parse::<LengthMetadata>().is_err());
        assert!("".parse::<LengthMetadata>().is_err());
    }
}
