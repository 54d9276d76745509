//! Codec configuration.
//!
//! Grid geometry, threshold and output locations are explicit values
//! threaded through planning, rendering and sampling. Nothing here is
//! process-wide state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::render::BACKGROUND;
use super::sample::DEFAULT_THRESHOLD;

/// Geometry and intensity settings shared by encoder and decoder.
///
/// Both sides must agree on every field except `fps` and `normalize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Frame width in pixels.
    pub frame_width: u32,
    /// Frame height in pixels.
    pub frame_height: u32,
    /// Cells per grid side. A frame carries `grid_size²` bits.
    pub grid_size: u32,
    /// Mean block intensity strictly above this decodes as `1`.
    pub threshold: u8,
    /// Intensity for pixels outside the grid.
    pub background: u8,
    /// Frame rate handed to the video writer.
    pub fps: u32,
    /// Resize frames with unexpected dimensions before sampling.
    pub normalize: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            frame_width: 100,
            frame_height: 100,
            grid_size: 10,
            threshold: DEFAULT_THRESHOLD,
            background: BACKGROUND,
            fps: 20,
            normalize: true,
        }
    }
}

impl CodecConfig {
    /// Creates a configuration with the given geometry and default
    /// intensities.
    pub fn with_geometry(frame_width: u32, frame_height: u32, grid_size: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            grid_size,
            ..Default::default()
        }
    }

    /// Side length of one grid cell in pixels.
    ///
    /// Zero when `grid_size` is zero; call [`validate`](Self::validate)
    /// before relying on it.
    #[inline]
    pub fn pixel_block_size(&self) -> u32 {
        self.frame_width.checked_div(self.grid_size).unwrap_or(0)
    }

    /// Payload capacity of a single frame.
    #[inline]
    pub fn bits_per_frame(&self) -> usize {
        (self.grid_size as usize) * (self.grid_size as usize)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGrid);
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        if self.frame_width % self.grid_size != 0 {
            return Err(ConfigError::UnevenBlocks {
                width: self.frame_width,
                grid: self.grid_size,
            });
        }
        let grid_height = self.grid_size * self.pixel_block_size();
        if grid_height > self.frame_height {
            return Err(ConfigError::GridOverflow {
                needed: grid_height,
                height: self.frame_height,
            });
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `grid_size` is 0.
    #[error("grid size must be non-zero (zero bits per frame)")]
    ZeroGrid,
    /// Frame width or height is 0.
    #[error("invalid frame dimensions")]
    ZeroDimensions,
    /// Cells would not have a whole number of pixels.
    #[error("frame width {width} is not divisible by grid size {grid}")]
    UnevenBlocks {
        /// Configured frame width.
        width: u32,
        /// Configured grid size.
        grid: u32,
    },
    /// The grid is taller than the frame.
    #[error("grid needs {needed} pixel rows but frame height is {height}")]
    GridOverflow {
        /// Pixel rows the grid covers.
        needed: u32,
        /// Configured frame height.
        height: u32,
    },
    /// `fps` is 0 or above 120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileRead(String),
    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[codec]` table.
    #[serde(default)]
    pub codec: CodecConfig,
    /// `[output]` table.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Locations of the artifacts written and read by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `frame_NNNN.png` files.
    pub frames_dir: PathBuf,
    /// Animated container path.
    pub video_path: PathBuf,
    /// Plain-text bit length record.
    pub metadata_path: PathBuf,
    /// Where decoded text is written.
    pub decoded_text_path: PathBuf,
    /// Prometheus text exposition output (disabled when unset).
    pub metrics_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("output_frames"),
            video_path: PathBuf::from("output_video.gif"),
            metadata_path: PathBuf::from("metadata.txt"),
            decoded_text_path: PathBuf::from("decoded_text.txt"),
            metrics_path: None,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.codec.validate()?;
        Ok(config)
    }
}
