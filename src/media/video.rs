//! Animated GIF container for frame sequences.
//!
//! GIF keeps an exact palette when a frame has at most 256 colours, and
//! grid frames only use black, white and the background grey, so the
//! container is lossless for them.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, DynamicImage, Frame as AnimationFrame};

use super::{FrameSink, FrameSource, MediaError};
use crate::frame::Frame;

/// In-memory target for the GIF encoder.
///
/// The encoder writes its trailer on drop and offers no way to hand its
/// writer back, so the bytes are shared with [`GifVideo`] and written to
/// disk in [`FrameSink::finish`] where failures can be returned.
#[derive(Clone, Default)]
struct GifBuffer(Arc<Mutex<Vec<u8>>>);

impl GifBuffer {
    fn take(&self) -> io::Result<Vec<u8>> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("GIF buffer lock poisoned"))?;
        Ok(std::mem::take(&mut *bytes))
    }
}

impl Write for GifBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("GIF buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes and reads frame sequences as a looping animated GIF.
pub struct GifVideo {
    path: PathBuf,
    fps: u32,
    buffer: GifBuffer,
    encoder: Option<GifEncoder<GifBuffer>>,
    frames_written: usize,
}

impl GifVideo {
    /// Creates a GIF collaborator for `path` playing at `fps`.
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            path: path.into(),
            fps: fps.max(1),
            buffer: GifBuffer::default(),
            encoder: None,
            frames_written: 0,
        }
    }

    /// Returns the container path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames appended so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn open_encoder(&mut self) -> Result<&mut GifEncoder<GifBuffer>, MediaError> {
        let encoder = match self.encoder.take() {
            Some(encoder) => encoder,
            None => self.create_encoder()?,
        };
        Ok(self.encoder.insert(encoder))
    }

    fn create_encoder(&self) -> Result<GifEncoder<GifBuffer>, MediaError> {
        let mut encoder = GifEncoder::new(self.buffer.clone());
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| MediaError::image(&self.path, e))?;
        tracing::info!(path = %self.path.display(), fps = self.fps, "Writing video");
        Ok(encoder)
    }

    fn save(&self) -> Result<(), MediaError> {
        let bytes = self.buffer.take().map_err(|e| MediaError::io(&self.path, e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MediaError::io(parent, e))?;
        }
        std::fs::write(&self.path, bytes).map_err(|e| MediaError::io(&self.path, e))
    }
}

impl FrameSink for GifVideo {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        let luma = frame.to_luma().ok_or(MediaError::InvalidFrame {
            index: frame.index(),
        })?;
        let rgba = DynamicImage::ImageLuma8(luma).to_rgba8();
        let delay = Delay::from_numer_denom_ms(1000, self.fps);

        let path = self.path.clone();
        self.open_encoder()?
            .encode_frame(AnimationFrame::from_parts(rgba, 0, 0, delay))
            .map_err(|e| MediaError::image(path, e))?;

        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MediaError> {
        let Some(encoder) = self.encoder.take() else {
            tracing::warn!(path = %self.path.display(), "No frames written, video not created");
            return Ok(());
        };
        // Dropping the encoder appends the GIF trailer to the buffer.
        drop(encoder);
        self.save()?;
        tracing::info!(
            path = %self.path.display(),
            frames = self.frames_written,
            "Video complete"
        );
        Ok(())
    }
}

impl FrameSource for GifVideo {
    fn read_frames(&mut self) -> Result<Vec<Result<Frame, MediaError>>, MediaError> {
        let file = File::open(&self.path).map_err(|e| MediaError::io(&self.path, e))?;
        let decoder =
            GifDecoder::new(BufReader::new(file)).map_err(|e| MediaError::image(&self.path, e))?;

        let mut frames = Vec::new();
        for (index, decoded) in decoder.into_frames().enumerate() {
            match decoded {
                Ok(animation_frame) => {
                    let luma = DynamicImage::ImageRgba8(animation_frame.into_buffer()).to_luma8();
                    frames.push(Ok(Frame::from_luma(luma, index)));
                }
                Err(e) => {
                    // The decoder cannot resynchronise after a broken frame.
                    frames.push(Err(MediaError::image(&self.path, e)));
                    break;
                }
            }
        }

        tracing::info!(path = %self.path.display(), frames = frames.len(), "Read video");
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{CodecConfig, FramePlan, FrameRenderer};

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bitgrid-{name}-{}.gif", std::process::id()))
    }

    #[test]
    fn test_gif_round_trip_preserves_intensities() {
        let path = scratch_file("gif-roundtrip");
        let plan = FramePlan::new(150, &CodecConfig::default()).unwrap();
        let renderer = FrameRenderer::new();
        let frames: Vec<Frame> = (0..2)
            .map(|i| {
                let chunk: Vec<bool> = (0..75).map(|b| (b + i) % 2 == 0).collect();
                renderer.render(&chunk, &plan, i).unwrap()
            })
            .collect();

        let mut video = GifVideo::new(&path, 20);
        for frame in &frames {
            video.write_frame(frame).unwrap();
        }
        video.finish().unwrap();
        assert_eq!(video.frames_written(), 2);

        let loaded: Vec<Frame> = GifVideo::new(&path, 20)
            .read_frames()
            .unwrap()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(loaded, frames);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_video_is_fatal() {
        let mut video = GifVideo::new(scratch_file("gif-missing"), 20);
        assert!(matches!(video.read_frames(), Err(MediaError::Io { .. })));
    }

    #[test]
    fn test_failed_write_is_reported_on_finish() {
        let plan = FramePlan::new(100, &CodecConfig::default()).unwrap();
        let frame = FrameRenderer::new().render(&[true; 100], &plan, 0).unwrap();

        // A directory cannot be opened as a file.
        let path = std::env::temp_dir().join(format!("bitgrid-gif-dir-{}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();

        let mut video = GifVideo::new(&path, 20);
        video.write_frame(&frame).unwrap();
        assert!(matches!(video.finish(), Err(MediaError::Io { .. })));

        let _ = std::fs::remove_dir_all(&path);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_device_is_reported_on_finish() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let plan = FramePlan::new(100, &CodecConfig::default()).unwrap();
        let frame = FrameRenderer::new().render(&[false; 100], &plan, 0).unwrap();

        let mut video = GifVideo::new("/dev/full", 20);
        video.write_frame(&frame).unwrap();
        assert!(matches!(video.finish(), Err(MediaError::Io { .. })));
    }

    #[test]
    fn test_finish_without_frames_creates_nothing() {
        let path = scratch_file("gif-empty");
        let _ = std::fs::remove_file(&path);
        let mut video = GifVideo::new(&path, 20);
        video.finish().unwrap();
        assert!(!path.exists());
    }
}
