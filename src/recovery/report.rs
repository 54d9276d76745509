//! Degraded-but-recovered conditions.
//!
//! Nothing in the codec aborts on these. Each one is logged where it
//! happens and collected here so callers can see what was lost.

/// A non-fatal discrepancy observed during encode or decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Condition {
    /// Nothing to encode; no frames were produced.
    #[error("payload is empty, no frames generated")]
    EmptyPayload,

    /// Bits after truncation were not a multiple of 8.
    #[error("{bits} trailing bits did not fill a byte and were dropped")]
    TrailingBitsDropped {
        /// Bits discarded.
        bits: usize,
    },

    /// A frame had the wrong size and was not sampled.
    #[error("frame {index} is {actual:?}, expected {expected:?}; skipped")]
    DimensionMismatch {
        /// Frame index.
        index: usize,
        /// Planned `(width, height)`.
        expected: (u32, u32),
        /// Frame `(width, height)`.
        actual: (u32, u32),
    },

    /// A frame could not be loaded from its source.
    #[error("frame {index} could not be read: {reason}")]
    FrameUnreadable {
        /// Frame index.
        index: usize,
        /// Source error message.
        reason: String,
    },

    /// A frame could not be handed to its sink.
    #[error("frame {index} could not be written: {reason}")]
    FrameUnwritable {
        /// Frame index.
        index: usize,
        /// Sink error message.
        reason: String,
    },

    /// No usable bit length, so padding was kept.
    #[error("bit length unavailable ({reason}); output not truncated")]
    MetadataMissing {
        /// Why the record could not be used.
        reason: String,
    },

    /// Fewer bits recovered than the record declares.
    #[error("recovered {recovered} bits but {declared} were declared; frames may be missing")]
    InsufficientData {
        /// Bits sampled from frames.
        recovered: usize,
        /// Bits in the record.
        declared: usize,
    },

    /// Bytes that did not decode as UTF-8.
    #[error("{replacements} malformed bytes replaced")]
    MalformedBytes {
        /// U+FFFD characters emitted.
        replacements: usize,
    },
}

impl Condition {
    /// Returns true if this condition means a frame was not used.
    pub fn is_skipped_frame(&self) -> bool {
        matches!(
            self,
            Condition::DimensionMismatch { .. } | Condition::FrameUnreadable { .. }
        )
    }
}

/// Summary of one encode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Payload length in bits (the recorded metadata).
    pub payload_bits: usize,
    /// Frames produced.
    pub frames_rendered: usize,
    /// Zero bits appended to fill the final frame.
    pub padding_bits: usize,
    /// Conditions raised.
    pub conditions: Vec<Condition>,
}

/// Summary of one decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Frames supplied by the caller or source.
    pub frames_supplied: usize,
    /// Frames that contributed bits.
    pub frames_sampled: usize,
    /// Frames resized to the planned geometry before sampling.
    pub frames_normalized: usize,
    /// Bits recovered before truncation.
    pub raw_bits: usize,
    /// Bits kept after truncation.
    pub final_bits: usize,
    /// Declared payload length, if metadata was available.
    pub declared_bits: Option<usize>,
    /// Trailing bits dropped when grouping into bytes.
    pub dropped_bits: usize,
    /// Replacement characters inserted during text recovery.
    pub replacements: usize,
    /// Conditions raised, in the order they were observed.
    pub conditions: Vec<Condition>,
}

impl DecodeReport {
    /// Frames rejected or unreadable.
    pub fn frames_skipped(&self) -> usize {
        self.conditions.iter().filter(|c| c.is_skipped_frame()).count()
    }

    /// Returns true if nothing was lost or substituted.
    pub fn is_clean(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Records a condition.
    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}
