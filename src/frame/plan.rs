//! Frame-count planning.

use super::{CodecConfig, ConfigError};

/// Immutable grid geometry and frame count for one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Frame width in pixels.
    pub frame_width: u32,
    /// Frame height in pixels.
    pub frame_height: u32,
    /// Cells per grid side.
    pub grid_size: u32,
    /// `grid_size²`.
    pub bits_per_frame: usize,
    /// `frame_width / grid_size`.
    pub pixel_block_size: u32,
    /// `ceil(bit_length / bits_per_frame)`, zero for an empty payload.
    pub frame_count: usize,
}

impl FramePlan {
    /// Plans the frames needed to carry `bit_length` bits.
    ///
    /// An empty payload yields a plan with zero frames; callers treat
    /// that as an empty-input condition rather than an error.
    pub fn new(bit_length: usize, config: &CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let bits_per_frame = config.bits_per_frame();
        let frame_count = bit_length.div_ceil(bits_per_frame);

        Ok(Self {
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            grid_size: config.grid_size,
            bits_per_frame,
            pixel_block_size: config.pixel_block_size(),
            frame_count,
        })
    }

    /// Geometry only, with no frames planned. Used on the decode path
    /// where the frame count comes from the input.
    pub fn geometry(config: &CodecConfig) -> Result<Self, ConfigError> {
        Self::new(0, config)
    }

    /// Returns true if no frames are planned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Total bit capacity of all planned frames.
    #[inline]
    pub fn capacity_bits(&self) -> usize {
        self.frame_count * self.bits_per_frame
    }

    /// Zero bits appended to the final frame for a payload of
    /// `bit_length` bits.
    pub fn padding_bits(&self, bit_length: usize) -> usize {
        self.capacity_bits().saturating_sub(bit_length)
    }

    /// Top-left pixel of grid cell `cell`, counted row-major.
    #[inline]
    pub fn cell_origin(&self, cell: usize) -> (u32, u32) {
        let grid = self.grid_size as usize;
        let row = (cell / grid) as u32;
        let col = (cell % grid) as u32;
        (col * self.pixel_block_size, row * self.pixel_block_size)
    }

    /// Returns true if the grid covers every pixel of the frame.
    pub fn tiles_frame(&self) -> bool {
        let covered = self.grid_size * self.pixel_block_size;
        covered == self.frame_width && covered == self.frame_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(bits: usize) -> FramePlan {
        FramePlan::new(bits, &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_payload_has_no_frames() {
        let p = plan(0);
        assert_eq!(p.frame_count, 0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_exact_fit_is_one_frame() {
        assert_eq!(plan(100).frame_count, 1);
    }

    #[test]
    fn test_one_extra_bit_needs_second_frame() {
        let p = plan(101);
        assert_eq!(p.frame_count, 2);
        assert_eq!(p.padding_bits(101), 99);
    }

    #[test]
    fn test_default_geometry() {
        let p = plan(16);
        assert_eq!(p.bits_per_frame, 100);
        assert_eq!(p.pixel_block_size, 10);
        assert_eq!(p.padding_bits(16), 84);
        assert!(p.tiles_frame());
    }

    #[test]
    fn test_cell_origin_row_major() {
        let p = plan(1);
        assert_eq!(p.cell_origin(0), (0, 0));
        assert_eq!(p.cell_origin(9), (90, 0));
        assert_eq!(p.cell_origin(10), (0, 10));
        assert_eq!(p.cell_origin(99), (90, 90));
    }

    #[test]
    fn test_custom_geometry() {
        let config = CodecConfig::with_geometry(64, 80, 8);
        let p = FramePlan::new(130, &config).unwrap();
        assert_eq!(p.bits_per_frame, 64);
        assert_eq!(p.pixel_block_size, 8);
        assert_eq!(p.frame_count, 3);
        assert!(!p.tiles_frame());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CodecConfig::with_geometry(100, 100, 0);
        assert_eq!(FramePlan::new(10, &config), Err(ConfigError::ZeroGrid));
    }
}
