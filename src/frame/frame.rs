//! Single-channel frame bitmap.

use image::{imageops, GrayImage};

/// A single grayscale frame.
///
/// Pixels are stored row-major, one intensity byte per pixel. The
/// `index` is the frame's position in its sequence and is what the
/// decoder orders by.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw intensities, row-major.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Position within the frame sequence.
    index: usize,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        Self {
            pixels,
            width,
            height,
            index,
        }
    }

    /// Creates a frame with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8, index: usize) -> Self {
        let len = (width as usize) * (height as usize);
        Self::new(vec![value; len], width, height, index)
    }

    /// Wraps a decoded grayscale image.
    pub fn from_luma(image: GrayImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    /// Converts to an `image` buffer for encoding.
    ///
    /// Returns `None` if the pixel buffer does not match the dimensions.
    pub fn to_luma(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Returns a copy resized to `width × height`.
    ///
    /// Uses a triangle filter so that each output pixel averages the
    /// source pixels it covers. Returns `None` for an invalid buffer.
    pub fn resized(&self, width: u32, height: u32) -> Option<Frame> {
        let source = self.to_luma()?;
        let resized = imageops::resize(&source, width, height, imageops::FilterType::Triangle);
        Some(Frame::from_luma(resized, self.index))
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns a mutable reference to the raw pixel data.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the sequence index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the same frame with a different sequence index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the intensity at `(x, y)`, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels.get(offset).copied()
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("index", &self.index)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::filled(100, 100, 128, 3);

        assert_eq!(frame.dimensions(), (100, 100));
        assert_eq!(frame.index(), 3);
        assert_eq!(frame.pixel(99, 99), Some(128));
        assert_eq!(frame.pixel(100, 0), None);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let frame = Frame::new(vec![0u8; 100], 640, 480, 1);

        assert!(!frame.is_valid());
        assert!(frame.to_luma().is_none());
        assert!(frame.resized(10, 10).is_none());
    }

    #[test]
    fn test_luma_conversion_preserves_pixels() {
        let pixels: Vec<u8> = (0..12).map(|i| i * 20).collect();
        let frame = Frame::new(pixels.clone(), 4, 3, 0);

        let image = frame.to_luma().unwrap();
        assert_eq!(image.get_pixel(1, 2).0[0], pixels[9]);
        assert_eq!(Frame::from_luma(image, 0), frame);
    }

    #[test]
    fn test_resize_uniform_frame_stays_uniform() {
        let frame = Frame::filled(200, 200, 255, 7);
        let resized = frame.resized(100, 100).unwrap();

        assert_eq!(resized.dimensions(), (100, 100));
        assert_eq!(resized.index(), 7);
        assert!(resized.pixels().iter().all(|&p| p == 255));
    }
}
