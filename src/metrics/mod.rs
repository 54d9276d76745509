//! Prometheus metrics for encode and decode runs.
//!
//! # Metrics Exposed
//!
//! - `bitgrid_frames_rendered_total` - Frames produced by the encoder
//! - `bitgrid_frames_sampled_total` - Frames that contributed bits on decode
//! - `bitgrid_frames_skipped_total` - Frames rejected or unreadable on decode
//! - `bitgrid_bits_encoded_total` - Payload bits encoded (before padding)
//! - `bitgrid_bits_decoded_total` - Bits kept after truncation
//! - `bitgrid_bits_dropped_total` - Trailing bits that did not fill a byte
//! - `bitgrid_replacement_chars_total` - Replacement characters emitted
//! - `bitgrid_declared_bits` - Bit length from the most recent metadata
//!
//! # Example
//!
//! ```
//! use bitgrid_video::metrics::{CodecMetrics, MetricsSnapshot};
//!
//! let metrics = CodecMetrics::new().expect("Failed to create registry");
//! metrics.update(&MetricsSnapshot {
//!     frames_rendered: 1,
//!     bits_encoded: 16,
//!     ..Default::default()
//! });
//!
//! assert!(metrics.encode().unwrap().contains("bitgrid_bits_encoded_total 16"));
//! ```

mod collector;

pub use collector::{CodecMetrics, MetricsError, MetricsSnapshot};
