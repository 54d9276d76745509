//! Persistence of frames, the bit-length record and decoded text.
//!
//! The codec itself never touches the filesystem. These collaborators
//! move frames in and out through the [`FrameSink`] and [`FrameSource`]
//! traits, so tests can swap in [`MemoryFrames`].

mod frames;
mod metadata;
mod video;

pub use frames::{FrameSink, FrameSource, MediaError, MemoryFrames, PngDirectory};
pub use metadata::{read_metadata, write_metadata, write_text, MetadataError};
pub use video::GifVideo;
