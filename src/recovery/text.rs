//! Byte -> text recovery with local substitution.
//!
//! Decoding walks a cursor over the bytes. At each position it tries
//! the shortest slice first, 1 to 4 bytes, and accepts the first slice
//! that is valid UTF-8 on its own. If none is, one [`REPLACEMENT`] is
//! emitted and the cursor moves forward a single byte, so a corrupt
//! byte never swallows the valid characters behind it.

/// Substituted for each byte that starts no decodable sequence.
pub const REPLACEMENT: char = '\u{FFFD}';

const MAX_SEQUENCE: usize = 4;

/// Text rebuilt from decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveredText {
    /// The recovered text.
    pub text: String,
    /// Number of replacement characters inserted.
    pub replacements: usize,
}

impl RecoveredText {
    /// Returns true if every byte decoded cleanly.
    pub fn is_clean(&self) -> bool {
        self.replacements == 0
    }

    /// Returns the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Recovers text from `bytes`, never failing.
///
/// The output holds at most one character per input byte.
pub fn recover(bytes: &[u8]) -> RecoveredText {
    let mut out = RecoveredText {
        text: String::with_capacity(bytes.len()),
        replacements: 0,
    };
    let mut cursor = 0;

    while cursor < bytes.len() {
        match decode_at(bytes, cursor) {
            Some((decoded, width)) => {
                out.text.push_str(decoded);
                cursor += width;
            }
            None => {
                tracing::trace!(
                    offset = cursor,
                    byte = bytes[cursor],
                    "Replacing undecodable byte"
                );
                out.text.push(REPLACEMENT);
                out.replacements += 1;
                cursor += 1;
            }
        }
    }

    if out.replacements > 0 {
        tracing::warn!(
            replacements = out.replacements,
            bytes = bytes.len(),
            "Malformed UTF-8 replaced during recovery"
        );
    }

    out
}

/// Shortest valid slice starting at `cursor`, with its width.
fn decode_at(bytes: &[u8], cursor: usize) -> Option<(&str, usize)> {
    (1..=MAX_SEQUENCE)
        .take_while(|width| cursor + width <= bytes.len())
        .find_map(|width| {
            std::str::from_utf8(&bytes[cursor..cursor + width])
                .ok()
                .map(|s| (s, width))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        let out = recover(&[0x48, 0x69]);
        assert_eq!(out.text, "Hi");
        assert!(out.is_clean());
    }

    #[test]
    fn test_empty() {
        assert_eq!(recover(&[]), RecoveredText::default());
    }

    #[test]
    fn test_invalid_lead_byte() {
        let out = recover(&[0xFF]);
        assert_eq!(out.text, "\u{FFFD}");
        assert_eq!(out.replacements, 1);
    }

    #[test]
    fn test_three_byte_sequence_is_one_char() {
        let out = recover(&[0xE2, 0x82, 0xAC]);
        assert_eq!(out.text, "€");
        assert_eq!(out.text.chars().count(), 1);
        assert!(out.is_clean());
    }

    #[test]
    fn test_four_byte_sequence() {
        let out = recover("🦀".as_bytes());
        assert_eq!(out.text, "🦀");
    }

    #[test]
    fn test_bad_byte_skips_by_one() {
        // 0xFF then a valid 'A'
        let out = recover(&[0xFF, 0x41]);
        assert_eq!(out.text, "\u{FFFD}A");
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        // Lead byte of a 3-byte sequence with only one continuation left
        let out = recover(&[0x41, 0xE2, 0x82]);
        assert_eq!(out.text, "A\u{FFFD}\u{FFFD}");
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_broken_sequence_recovers_following_chars() {
        // 0xE2 0x41: lead byte followed by ASCII, which must survive
        let out = recover(&[0xE2, 0x41, 0x42]);
        assert_eq!(out.text, "\u{FFFD}AB");
    }

    #[test]
    fn test_lone_continuation_bytes() {
        let out = recover(&[0x80, 0xBF, 0x63]);
        assert_eq!(out.text, "\u{FFFD}\u{FFFD}c");
    }

    #[test]
    fn test_surrogate_encoding_rejected() {
        // CESU-style surrogate: invalid in strict UTF-8
        let out = recover(&[0xED, 0xA0, 0x80]);
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn test_overlong_rejected() {
        // Overlong encoding of '/'
        let out = recover(&[0xC0, 0xAF]);
        assert_eq!(out.text, "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_output_bounded_by_input() {
        let bytes: Vec<u8> = (0..=255).collect();
        let out = recover(&bytes);
        assert!(out.text.chars().count() <= bytes.len());
    }
}
