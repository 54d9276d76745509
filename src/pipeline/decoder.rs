//! Frames -> payload.

use rayon::prelude::*;

use super::progress::{ProgressFn, Stage, Tracker};
use super::CodecError;
use crate::bits::{self, BitString};
use crate::frame::{CodecConfig, ConfigError, Frame, FramePlan, FrameSampler, SampleError};
use crate::media::{FrameSource, MediaError, MetadataError};
use crate::recovery::{self, Condition, DecodeReport, LengthMetadata, RecoveredText};

/// Output of one decode call.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Recovered text.
    pub text: RecoveredText,
    /// Bytes the text was recovered from.
    pub bytes: Vec<u8>,
    /// Bits after truncation.
    pub bits: BitString,
    /// Discrepancies observed.
    pub report: DecodeReport,
}

impl Decoded {
    /// Returns the recovered text.
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

/// Turns bit-grid frames back into payloads.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: CodecConfig,
    plan: FramePlan,
    sampler: FrameSampler,
}

impl Decoder {
    /// Creates a decoder after validating `config`.
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        let plan = FramePlan::geometry(&config)?;
        let sampler = FrameSampler::with_threshold(config.threshold);
        Ok(Self {
            config,
            plan,
            sampler,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes frames supplied in order.
    ///
    /// `None` for `metadata` skips truncation, so the padding of the
    /// final frame shows up as trailing NUL characters.
    pub fn decode(
        &self,
        frames: &[Frame],
        metadata: Option<LengthMetadata>,
    ) -> Result<Decoded, CodecError> {
        let frames: Vec<Result<Frame, MediaError>> = frames
            .iter()
            .enumerate()
            .map(|(index, frame)| Ok(frame.clone().with_index(index)))
            .collect();
        let metadata = metadata.ok_or_else(|| "not provided".to_owned());
        self.run(frames, metadata, None)
    }

    /// Reads every frame from `source` and decodes it.
    ///
    /// Fails only if the source cannot be opened or no frame is usable.
    /// An unreadable bit-length record degrades to untruncated output.
    pub fn decode_from(
        &self,
        source: &mut dyn FrameSource,
        metadata: Result<LengthMetadata, MetadataError>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Decoded, CodecError> {
        let frames = source.read_frames()?;
        self.run(frames, metadata.map_err(|e| e.to_string()), progress)
    }

    fn run(
        &self,
        frames: Vec<Result<Frame, MediaError>>,
        metadata: Result<LengthMetadata, String>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Decoded, CodecError> {
        let mut report = DecodeReport {
            frames_supplied: frames.len(),
            declared_bits: metadata.as_ref().ok().map(LengthMetadata::bits),
            ..Default::default()
        };

        tracing::info!(
            frames = frames.len(),
            threshold = self.sampler.threshold(),
            "Decoding frames"
        );

        let usable = self.prepare(frames, &mut report);
        let raw = self.sample_all(&usable, &mut report, progress);

        if report.frames_sampled == 0 && report.declared_bits != Some(0) {
            return Err(CodecError::NoUsableFrames {
                supplied: report.frames_supplied,
            });
        }
        report.raw_bits = raw.len();
        tracing::info!(bits = raw.len(), "Reconstructed raw bits");

        let (reason, declared) = match metadata {
            Ok(declared) => (String::new(), Some(declared)),
            Err(reason) => (reason, None),
        };
        let (final_bits, truncation) = recovery::truncate(&raw, declared);
        if let Some(condition) = truncation.condition(reason) {
            report.push(condition);
        }
        report.final_bits = final_bits.len();

        let unpacked = bits::unpack(&final_bits);
        report.dropped_bits = unpacked.dropped_bits;
        if unpacked.dropped_bits > 0 {
            report.push(Condition::TrailingBitsDropped {
                bits: unpacked.dropped_bits,
            });
        }

        let text = recovery::recover(&unpacked.bytes);
        report.replacements = text.replacements;
        if !text.is_clean() {
            report.push(Condition::MalformedBytes {
                replacements: text.replacements,
            });
        }

        tracing::info!(
            bytes = unpacked.bytes.len(),
            chars = text.text.chars().count(),
            skipped = report.frames_skipped(),
            "Decode complete"
        );

        Ok(Decoded {
            text,
            bytes: unpacked.bytes,
            bits: final_bits,
            report,
        })
    }

    /// Drops unreadable frames and normalizes dimensions where allowed.
    fn prepare(
        &self,
        frames: Vec<Result<Frame, MediaError>>,
        report: &mut DecodeReport,
    ) -> Vec<Frame> {
        let expected = (self.plan.frame_width, self.plan.frame_height);
        let mut usable = Vec::with_capacity(frames.len());

        for (index, result) in frames.into_iter().enumerate() {
            let frame = match result {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(frame = index, error = %e, "Skipping unreadable frame");
                    report.push(Condition::FrameUnreadable {
                        index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if self.config.normalize && frame.dimensions() != expected {
                if let Some(resized) = frame.resized(expected.0, expected.1) {
                    tracing::debug!(
                        frame = index,
                        from = ?frame.dimensions(),
                        to = ?expected,
                        "Resized frame"
                    );
                    report.frames_normalized += 1;
                    usable.push(resized);
                    continue;
                }
            }
            usable.push(frame);
        }

        usable
    }

    /// Samples frames in parallel and concatenates their bits in order.
    fn sample_all(
        &self,
        frames: &[Frame],
        report: &mut DecodeReport,
        progress: Option<ProgressFn<'_>>,
    ) -> BitString {
        let tracker = Tracker::new(Stage::Sampling, frames.len(), progress);

        let sampled: Vec<Result<BitString, SampleError>> = frames
            .par_iter()
            .map(|frame| {
                let bits = self.sampler.sample(frame, &self.plan);
                tracker.advance();
                bits
            })
            .collect();

        let mut raw = BitString::with_capacity(frames.len() * self.plan.bits_per_frame);
        for result in sampled {
            match result {
                Ok(bits) => {
                    raw.extend_from(&bits);
                    report.frames_sampled += 1;
                }
                Err(SampleError::DimensionMismatch {
                    index,
                    expected,
                    actual,
                }) => {
                    tracing::warn!(
                        frame = index,
                        ?expected,
                        ?actual,
                        "Frame has wrong dimensions, skipping"
                    );
                    report.push(Condition::DimensionMismatch {
                        index,
                        expected,
                        actual,
                    });
                }
                Err(e) => {
                    tracing::warn!(frame = e.index(), error = %e, "Skipping malformed frame");
                    report.push(Condition::FrameUnreadable {
                        index: e.index(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        raw
    }
}
