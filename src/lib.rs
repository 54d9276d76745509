//! Bit-Grid Video Codec Library
//!
//! Encodes an arbitrary byte payload as a sequence of black/white
//! bit-grid frames, and decodes such frames back into the payload.
//!
//! # Architecture
//!
//! ```text
//! encode: bits → frame (plan, render) → media
//! decode: media → frame (sample) → recovery (truncate, text) → bits
//!                        ↓
//!                 pipeline (orchestration, progress)
//! ```
//!
//! # Design Principles
//!
//! - **Pure per-frame work**: rendering and sampling depend only on their
//!   inputs, so frames are processed in parallel and re-ordered by index
//! - **Explicit configuration**: geometry and threshold live in
//!   [`CodecConfig`], never in process-wide state
//! - **Degrade, don't abort**: skipped frames, missing metadata and
//!   malformed bytes become [`Condition`]s in the decode report
//! - **Lossless media only**: PNG frames and exact-palette GIF preserve
//!   every intensity
//!
//! # Example
//!
//! ```
//! use bitgrid_video::{CodecConfig, Decoder, Encoder};
//!
//! let config = CodecConfig::default();
//! let encoder = Encoder::new(config.clone()).unwrap();
//! let decoder = Decoder::new(config).unwrap();
//!
//! let encoded = encoder.encode("Hi".as_bytes()).unwrap();
//! assert_eq!(encoded.frames.len(), 1);
//! assert_eq!(encoded.metadata.bits(), 16);
//!
//! let decoded = decoder.decode(&encoded.frames, Some(encoded.metadata)).unwrap();
//! assert_eq!(decoded.as_str(), "Hi");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod bits;
pub mod frame;
pub mod media;
pub mod metrics;
pub mod pipeline;
pub mod recovery;

// Re-export commonly used types at crate root
pub use bits::BitString;
pub use frame::{CodecConfig, FileConfig, Frame, FramePlan, FrameRenderer, FrameSampler};
pub use media::{FrameSink, FrameSource, GifVideo, MemoryFrames, PngDirectory};
pub use pipeline::{CodecError, Decoded, Decoder, Encoded, Encoder, Progress};
pub use recovery::{Condition, DecodeReport, EncodeReport, LengthMetadata, RecoveredText};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
