//! Frame sinks and sources.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use rayon::prelude::*;
use thiserror::Error;

use crate::frame::Frame;

/// Errors raised while persisting or loading frames.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Image encoding or decoding failure.
    #[error("image error on {path}: {source}")]
    Image {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },
    /// Frame buffer does not match its dimensions.
    #[error("frame {index} pixel buffer does not match its dimensions")]
    InvalidFrame {
        /// Frame index.
        index: usize,
    },
    /// A source slot holds no frame.
    #[error("frame {index} is unavailable")]
    Unavailable {
        /// Frame index.
        index: usize,
    },
    /// The frame directory path is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl MediaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MediaError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        MediaError::Image {
            path: path.into(),
            source,
        }
    }
}

/// Destination for an ordered frame sequence.
pub trait FrameSink {
    /// Persists one frame. Frames arrive in index order.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError>;

    /// Flushes anything buffered after the last frame.
    fn finish(&mut self) -> Result<(), MediaError>;
}

/// Origin of an ordered frame sequence.
pub trait FrameSource {
    /// Reads every frame in presentation order.
    ///
    /// The outer error means the source could not be opened at all.
    /// Inner errors are per frame; position in the vector is the frame
    /// index, so callers can skip failures and keep going.
    fn read_frames(&mut self) -> Result<Vec<Result<Frame, MediaError>>, MediaError>;
}

/// A directory of `frame_NNNN.png` files.
///
/// PNG is lossless, so intensities survive the round trip exactly.
#[derive(Debug, Clone)]
pub struct PngDirectory {
    dir: PathBuf,
}

const FRAME_PREFIX: &str = "frame_";
const FRAME_SUFFIX: &str = ".png";

impl PngDirectory {
    /// Uses `dir` for frame files. Nothing is touched until first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of frame `index`, zero-padded to four digits.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{FRAME_PREFIX}{index:04}{FRAME_SUFFIX}"))
    }

    /// Lists frame files ordered by their numeric index.
    ///
    /// Names without a parsable index sort after all numbered frames,
    /// by name.
    pub fn list(&self) -> Result<Vec<PathBuf>, MediaError> {
        if !self.dir.is_dir() {
            return Err(MediaError::NotADirectory(self.dir.clone()));
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| MediaError::io(&self.dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| MediaError::io(&self.dir, e))?.path();
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_owned)
            else {
                continue;
            };
            let Some(stem) = name
                .strip_prefix(FRAME_PREFIX)
                .and_then(|rest| rest.strip_suffix(FRAME_SUFFIX))
            else {
                continue;
            };
            let key = stem.parse::<usize>().unwrap_or(usize::MAX);
            files.push((key, name, path));
        }

        files.sort();
        Ok(files.into_iter().map(|(_, _, path)| path).collect())
    }

    /// Removes existing frame files so a shorter payload does not leave
    /// stale frames behind. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, MediaError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let paths = self.list()?;
        for path in &paths {
            std::fs::remove_file(path).map_err(|e| MediaError::io(path, e))?;
        }
        if !paths.is_empty() {
            tracing::debug!(dir = %self.dir.display(), removed = paths.len(), "Cleared old frames");
        }
        Ok(paths.len())
    }
}

impl FrameSink for PngDirectory {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| MediaError::io(&self.dir, e))?;

        let path = self.frame_path(frame.index());
        let image = frame.to_luma().ok_or(MediaError::InvalidFrame {
            index: frame.index(),
        })?;
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| MediaError::image(&path, e))?;

        tracing::trace!(frame = frame.index(), path = %path.display(), "Wrote frame");
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MediaError> {
        Ok(())
    }
}

impl FrameSource for PngDirectory {
    fn read_frames(&mut self) -> Result<Vec<Result<Frame, MediaError>>, MediaError> {
        let paths = self.list()?;
        tracing::info!(dir = %self.dir.display(), frames = paths.len(), "Loading frames");

        Ok(paths
            .par_iter()
            .enumerate()
            .map(|(index, path)| {
                image::open(path)
                    .map(|img| Frame::from_luma(img.to_luma8(), index))
                    .map_err(|e| MediaError::image(path, e))
            })
            .collect())
    }
}

/// In-memory frames for testing.
///
/// Slots set to `None` read back as unavailable.
#[derive(Debug, Default, Clone)]
pub struct MemoryFrames {
    frames: Vec<Option<Frame>>,
}

impl MemoryFrames {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing sequence.
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().map(Some).collect(),
        }
    }

    /// Appends a slot that fails to read.
    pub fn push_unreadable(&mut self) {
        self.frames.push(None);
    }

    /// Number of slots, readable or not.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Readable frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().flatten()
    }
}

impl FrameSink for MemoryFrames {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        self.frames.push(Some(frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MediaError> {
        Ok(())
    }
}

impl FrameSource for MemoryFrames {
    fn read_frames(&mut self) -> Result<Vec<Result<Frame, MediaError>>, MediaError> {
        Ok(self
            .frames
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(frame) => Ok(frame.clone().with_index(index)),
                None => Err(MediaError::Unavailable { index }),
            })
            .collect())
    }
}
