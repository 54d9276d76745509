//! Post-sampling recovery.
//!
//! Strips frame padding using the recorded bit length, rebuilds text
//! from bytes with local substitution of malformed sequences, and
//! collects every degraded-but-recovered condition into a report.

mod report;
mod text;
mod truncate;

pub use report::{Condition, DecodeReport, EncodeReport};
pub use text::{recover, RecoveredText, REPLACEMENT};
pub use truncate::{truncate, LengthMetadata, ParseLengthError, Truncation};
