//! Payload -> frames.

use rayon::prelude::*;

use super::progress::{ProgressFn, Stage, Tracker};
use super::CodecError;
use crate::bits::{self, BitString};
use crate::frame::{CodecConfig, ConfigError, Frame, FramePlan, FrameRenderer};
use crate::media::{FrameSink, MediaError};
use crate::recovery::{Condition, EncodeReport, LengthMetadata};

/// Output of one encode call.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Frames in index order.
    pub frames: Vec<Frame>,
    /// Payload bit length before padding.
    pub metadata: LengthMetadata,
    /// Geometry and frame count used.
    pub plan: FramePlan,
    /// What happened along the way.
    pub report: EncodeReport,
}

impl Encoded {
    /// Sends every frame to `sink`, in order.
    ///
    /// A frame that fails to write is logged, recorded in the report and
    /// skipped. Only a failure to finish the sink is returned. Returns
    /// the number of frames written.
    pub fn write_to(&mut self, sink: &mut dyn FrameSink) -> Result<usize, MediaError> {
        let mut written = 0;
        for frame in &self.frames {
            match sink.write_frame(frame) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(frame = frame.index(), error = %e, "Failed to write frame");
                    self.report.conditions.push(Condition::FrameUnwritable {
                        index: frame.index(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        sink.finish()?;
        Ok(written)
    }
}

/// Turns payloads into bit-grid frames.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: CodecConfig,
    renderer: FrameRenderer,
}

impl Encoder {
    /// Creates an encoder after validating `config`.
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let renderer = FrameRenderer::with_background(config.background);
        Ok(Self { config, renderer })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Plans frames for a payload of `bit_length` bits.
    pub fn plan(&self, bit_length: usize) -> Result<FramePlan, ConfigError> {
        FramePlan::new(bit_length, &self.config)
    }

    /// Encodes `payload` into frames.
    pub fn encode(&self, payload: &[u8]) -> Result<Encoded, CodecError> {
        self.encode_with_progress(payload, None)
    }

    /// Encodes `payload`, reporting each rendered frame to `progress`.
    pub fn encode_with_progress(
        &self,
        payload: &[u8],
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Encoded, CodecError> {
        let bits = bits::pack(payload);
        let plan = self.plan(bits.len())?;
        let metadata = LengthMetadata(bits.len());

        tracing::info!(
            bytes = payload.len(),
            bits = bits.len(),
            frames = plan.frame_count,
            bits_per_frame = plan.bits_per_frame,
            "Encoding payload"
        );

        let mut report = EncodeReport {
            payload_bits: bits.len(),
            padding_bits: plan.padding_bits(bits.len()),
            ..Default::default()
        };

        if plan.is_empty() {
            tracing::warn!("Payload is empty, no frames will be generated");
            report.conditions.push(Condition::EmptyPayload);
        }

        let frames = self.render_all(&bits, &plan, progress)?;
        report.frames_rendered = frames.len();

        tracing::info!(
            frames = frames.len(),
            padding = report.padding_bits,
            "Frame generation complete"
        );

        Ok(Encoded {
            frames,
            metadata,
            plan,
            report,
        })
    }

    fn render_all(
        &self,
        bits: &BitString,
        plan: &FramePlan,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Vec<Frame>, CodecError> {
        let tracker = Tracker::new(Stage::Rendering, plan.frame_count, progress);

        let frames = bits
            .as_slice()
            .par_chunks(plan.bits_per_frame)
            .enumerate()
            .map(|(index, chunk)| -> Result<Frame, CodecError> {
                let frame = self.renderer.render(chunk, plan, index)?;
                tracker.advance();
                Ok(frame)
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        debug_assert_eq!(frames.len(), plan.frame_count);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MemoryFrames;

    fn encode(payload: &[u8]) -> Encoded {
        Encoder::new(CodecConfig::default()).unwrap().encode(payload).unwrap()
    }

    #[test]
    fn test_encode_hi() {
        let encoded = encode(b"Hi");

        assert_eq!(encoded.metadata, LengthMetadata(16));
        assert_eq!(encoded.frames.len(), 1);
        assert_eq!(encoded.report.padding_bits, 84);
        assert!(encoded.report.conditions.is_empty());
    }

    #[test]
    fn test_encode_empty_payload() {
        let encoded = encode(&[]);

        assert!(encoded.frames.is_empty());
        assert_eq!(encoded.metadata, LengthMetadata(0));
        assert_eq!(encoded.report.conditions, vec![Condition::EmptyPayload]);
    }

    #[test]
    fn test_frames_in_index_order() {
        let payload = vec![0xA5u8; 100]; // 800 bits -> 8 frames
        let encoded = encode(&payload);

        assert_eq!(encoded.frames.len(), 8);
        for (i, frame) in encoded.frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
        }
        let capacity: usize = encoded.frames.len() * encoded.plan.bits_per_frame;
        assert!(capacity >= encoded.metadata.bits());
    }

    #[test]
    fn test_progress_reported_per_frame() {
        let count = std::sync::atomic::AtomicUsize::new(0);
        let progress = |p: crate::pipeline::Progress| {
            assert_eq!(p.stage, Stage::Rendering);
            assert_eq!(p.total, 3);
            count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        };
        let payload = vec![1u8; 30]; // 240 bits -> 3 frames
        Encoder::new(CodecConfig::default())
            .unwrap()
            .encode_with_progress(&payload, Some(&progress))
            .unwrap();

        assert_eq!(count.into_inner(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CodecConfig::with_geometry(100, 100, 0);
        assert!(matches!(Encoder::new(config), Err(ConfigError::ZeroGrid)));
    }

    #[test]
    fn test_write_to_sink() {
        let mut encoded = encode(&[7u8; 20]);
        let mut sink = MemoryFrames::new();

        assert_eq!(encoded.write_to(&mut sink).unwrap(), 2);
        assert_eq!(sink.len(), 2);
    }

    struct FailingSink {
        fail_index: usize,
        written: Vec<usize>,
    }

    impl FrameSink for FailingSink {
        fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
            if frame.index() == self.fail_index {
                return Err(MediaError::Unavailable { index: frame.index() });
            }
            self.written.push(frame.index());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), MediaError> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_skips_one_frame() {
        let mut encoded = encode(&[7u8; 40]);
        let mut sink = FailingSink {
            fail_index: 1,
            written: Vec::new(),
        };

        assert_eq!(encoded.write_to(&mut sink).unwrap(), 3);
        assert_eq!(sink.written, vec![0, 2, 3]);
        assert!(matches!(
            encoded.report.conditions.as_slice(),
            [Condition::FrameUnwritable { index: 1, .. }]
        ));
    }
}
