//! Bit chunk -> frame rendering (encode path).

use super::{Frame, FramePlan};

/// Intensity of a `0` cell.
pub const BLACK: u8 = 0;
/// Intensity of a `1` cell.
pub const WHITE: u8 = 255;
/// Default fill for pixels the grid does not cover.
pub const BACKGROUND: u8 = 128;
/// Bit used to pad a short final chunk. Rendered as [`BLACK`].
pub const PADDING_BIT: bool = false;

/// Errors raised while rendering a chunk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The chunk holds more bits than the frame has cells.
    #[error("chunk of {len} bits exceeds frame capacity of {capacity} bits")]
    ChunkTooLong {
        /// Bits in the chunk.
        len: usize,
        /// Bits per frame.
        capacity: usize,
    },
}

/// Renders bit chunks into grid frames.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    background: u8,
}

impl FrameRenderer {
    /// Creates a renderer with the default [`BACKGROUND`].
    pub fn new() -> Self {
        Self {
            background: BACKGROUND,
        }
    }

    /// Creates a renderer with a custom background intensity.
    pub fn with_background(background: u8) -> Self {
        Self { background }
    }

    /// Renders one chunk into frame number `index`.
    ///
    /// Cells are filled row-major. A chunk shorter than
    /// `plan.bits_per_frame` is right-padded with [`PADDING_BIT`].
    pub fn render(
        &self,
        chunk: &[bool],
        plan: &FramePlan,
        index: usize,
    ) -> Result<Frame, RenderError> {
        if chunk.len() > plan.bits_per_frame {
            return Err(RenderError::ChunkTooLong {
                len: chunk.len(),
                capacity: plan.bits_per_frame,
            });
        }

        let mut frame = Frame::filled(plan.frame_width, plan.frame_height, self.background, index);
        let width = plan.frame_width as usize;
        let block = plan.pixel_block_size as usize;
        let pixels = frame.pixels_mut();

        for cell in 0..plan.bits_per_frame {
            let bit = chunk.get(cell).copied().unwrap_or(PADDING_BIT);
            let color = if bit { WHITE } else { BLACK };
            let (x0, y0) = plan.cell_origin(cell);
            let (x0, y0) = (x0 as usize, y0 as usize);

            for y in y0..y0 + block {
                let row = y * width;
                pixels[row + x0..row + x0 + block].fill(color);
            }
        }

        tracing::trace!(
            frame = index,
            bits = chunk.len(),
            padded = plan.bits_per_frame - chunk.len(),
            "Rendered frame"
        );

        Ok(frame)
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitString;
    use crate::frame::CodecConfig;

    fn plan() -> FramePlan {
        FramePlan::new(100, &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_blocks_are_solid() {
        let mut bits = vec![false; 100];
        bits[0] = true;
        bits[11] = true;
        let frame = FrameRenderer::new().render(&bits, &plan(), 0).unwrap();

        // Cell 0 spans (0..10, 0..10)
        assert_eq!(frame.pixel(0, 0), Some(WHITE));
        assert_eq!(frame.pixel(9, 9), Some(WHITE));
        assert_eq!(frame.pixel(10, 0), Some(BLACK));
        // Cell 11 is row 1, column 1
        assert_eq!(frame.pixel(10, 10), Some(WHITE));
        assert_eq!(frame.pixel(19, 19), Some(WHITE));
        assert_eq!(frame.pixel(20, 19), Some(BLACK));
    }

    #[test]
    fn test_short_chunk_padded_black() {
        let bits: BitString = "0100100001101001".parse().unwrap();
        let frame = FrameRenderer::new().render(bits.as_slice(), &plan(), 0).unwrap();

        assert!(!PADDING_BIT);
        // Cell 1 is the first set bit of 'H'
        assert_eq!(frame.pixel(15, 5), Some(WHITE));
        // Cells 16..100 are padding
        for cell in 16..100 {
            let (x, y) = plan().cell_origin(cell);
            assert_eq!(frame.pixel(x + 5, y + 5), Some(BLACK), "cell {cell}");
        }
    }

    #[test]
    fn test_chunk_too_long_rejected() {
        let bits = vec![true; 101];
        assert_eq!(
            FrameRenderer::new().render(&bits, &plan(), 0),
            Err(RenderError::ChunkTooLong { len: 101, capacity: 100 })
        );
    }

    #[test]
    fn test_uncovered_rows_use_background() {
        let config = CodecConfig::with_geometry(40, 50, 4);
        let plan = FramePlan::new(16, &config).unwrap();
        let frame = FrameRenderer::new().render(&[true; 16], &plan, 0).unwrap();

        assert_eq!(frame.dimensions(), (40, 50));
        assert_eq!(frame.pixel(39, 39), Some(WHITE));
        assert_eq!(frame.pixel(0, 40), Some(BACKGROUND));
        assert_eq!(frame.pixel(39, 49), Some(BACKGROUND));
    }

    #[test]
    fn test_frame_index_carried() {
        let frame = FrameRenderer::new().render(&[], &plan(), 42).unwrap();
        assert_eq!(frame.index(), 42);
        assert!(frame.pixels().iter().all(|&p| p == BLACK));
    }
}
