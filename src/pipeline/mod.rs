//! Encode and decode orchestration.
//!
//! ```text
//! encode: payload → pack → plan → render (parallel) → frames + bit length
//! decode: frames → sample (parallel) → truncate → unpack → recover text
//! ```
//!
//! Per-frame work runs on the rayon pool and is collected back in frame
//! order. Packing and text recovery stay sequential.

mod decoder;
mod encoder;
mod progress;

pub use decoder::{Decoded, Decoder};
pub use encoder::{Encoded, Encoder};
pub use progress::{Progress, ProgressFn, Stage};

use thiserror::Error;

use crate::frame::{ConfigError, RenderError};
use crate::media::MediaError;

/// Fatal pipeline errors.
///
/// Everything recoverable is reported as a
/// [`Condition`](crate::recovery::Condition) instead.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Geometry or frame rate rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A chunk could not be rendered.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    /// The frame source could not be opened.
    #[error("frame source unavailable: {0}")]
    Media(#[from] MediaError),
    /// Every supplied frame was skipped and bits were expected.
    #[error("no usable frames ({supplied} supplied, all skipped)")]
    NoUsableFrames {
        /// Frames handed to the decoder.
        supplied: usize,
    },
}
