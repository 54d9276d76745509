//! Frame -> bit chunk sampling (decode path).
//!
//! Each cell's pixel block is averaged and compared against a fixed
//! threshold. The threshold is not adaptive.

use super::{Frame, FramePlan};
use crate::bits::BitString;

/// Midpoint of the 8-bit intensity range.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Reasons a frame cannot be sampled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    /// Frame size differs from the plan.
    #[error("frame {index} is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        /// Frame index.
        index: usize,
        /// Planned `(width, height)`.
        expected: (u32, u32),
        /// Frame `(width, height)`.
        actual: (u32, u32),
    },
    /// Pixel count does not match width times height.
    #[error("frame {index} pixel buffer does not match its dimensions")]
    InvalidBuffer {
        /// Frame index.
        index: usize,
    },
}

impl SampleError {
    /// Index of the rejected frame.
    pub fn index(&self) -> usize {
        match *self {
            SampleError::DimensionMismatch { index, .. } | SampleError::InvalidBuffer { index } => {
                index
            }
        }
    }
}

/// Recovers bits from grid frames by thresholding block means.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    threshold: u8,
}

impl FrameSampler {
    /// Creates a sampler using [`DEFAULT_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Creates a sampler with a custom threshold.
    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Samples all `grid_size²` cells of `frame` in row-major order.
    ///
    /// A cell decodes to `1` when its mean intensity is strictly greater
    /// than the threshold. Frames whose dimensions differ from the plan
    /// are rejected; the caller decides whether to skip them.
    pub fn sample(&self, frame: &Frame, plan: &FramePlan) -> Result<BitString, SampleError> {
        let expected = (plan.frame_width, plan.frame_height);
        if frame.dimensions() != expected {
            return Err(SampleError::DimensionMismatch {
                index: frame.index(),
                expected,
                actual: frame.dimensions(),
            });
        }
        if !frame.is_valid() {
            return Err(SampleError::InvalidBuffer {
                index: frame.index(),
            });
        }

        let width = plan.frame_width as usize;
        let block = plan.pixel_block_size as usize;
        // mean > t  <=>  sum > t * n, kept in integers
        let cutoff = u64::from(self.threshold) * (block * block) as u64;
        let pixels = frame.pixels();

        let bits = (0..plan.bits_per_frame)
            .map(|cell| {
                let (x0, y0) = plan.cell_origin(cell);
                let (x0, y0) = (x0 as usize, y0 as usize);
                let sum: u64 = (y0..y0 + block)
                    .map(|y| {
                        let row = y * width;
                        pixels[row + x0..row + x0 + block]
                            .iter()
                            .map(|&p| u64::from(p))
                            .sum::<u64>()
                    })
                    .sum();
                sum > cutoff
            })
            .collect();

        Ok(bits)
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}
