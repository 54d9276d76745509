//! Bit-grid frames: geometry, rendering and sampling.
//!
//! A frame is a single-channel bitmap partitioned into a square grid of
//! equal blocks. Each block carries one bit: white is `1`, black is `0`.
//! Rendering and sampling are pure functions of a chunk (or frame) and a
//! [`FramePlan`], so frames can be processed in any order.

mod config;
#[allow(clippy::module_inception)]
mod frame;
mod plan;
mod render;
mod sample;

pub use config::{CodecConfig, ConfigError, FileConfig, OutputConfig};
pub use frame::Frame;
pub use plan::FramePlan;
pub use render::{FrameRenderer, RenderError, BACKGROUND, BLACK, PADDING_BIT, WHITE};
pub use sample::{FrameSampler, SampleError, DEFAULT_THRESHOLD};
