//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::recovery::{DecodeReport, EncodeReport};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registry or encoder failure.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Counts from one encode or decode call, added to the running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Frames produced by the encoder.
    pub frames_rendered: u64,
    /// Frames turned into bits.
    pub frames_sampled: u64,
    /// Frames rejected or unreadable.
    pub frames_skipped: u64,
    /// Payload bits encoded.
    pub bits_encoded: u64,
    /// Bits left after truncation.
    pub bits_decoded: u64,
    /// Trailing bits that did not fill a byte.
    pub bits_dropped: u64,
    /// U+FFFD characters emitted by recovery.
    pub replacement_chars: u64,
    /// Declared bit length, if known.
    pub declared_bits: Option<u64>,
}

impl MetricsSnapshot {
    /// Snapshot of an encode call.
    pub fn from_encode(report: &EncodeReport) -> Self {
        Self {
            frames_rendered: report.frames_rendered as u64,
            bits_encoded: report.payload_bits as u64,
            declared_bits: Some(report.payload_bits as u64),
            ..Default::default()
        }
    }

    /// Snapshot of a decode call.
    pub fn from_decode(report: &DecodeReport) -> Self {
        Self {
            frames_sampled: report.frames_sampled as u64,
            frames_skipped: report.frames_skipped() as u64,
            bits_decoded: report.final_bits as u64,
            bits_dropped: report.dropped_bits as u64,
            replacement_chars: report.replacements as u64,
            declared_bits: report.declared_bits.map(|b| b as u64),
            ..Default::default()
        }
    }
}

/// Prometheus registry for codec runs.
pub struct CodecMetrics {
    registry: Registry,

    // Frame metrics
    frames_rendered: IntCounter,
    frames_sampled: IntCounter,
    frames_skipped: IntCounter,

    // Bit metrics
    bits_encoded: IntCounter,
    bits_decoded: IntCounter,
    bits_dropped: IntCounter,
    declared_bits: IntGauge,

    // Text metrics
    replacement_chars: IntCounter,
}

impl CodecMetrics {
    /// Creates a registry with all codec metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_rendered = IntCounter::new(
            "bitgrid_frames_rendered_total",
            "Frames produced by the encoder",
        )?;
        let frames_sampled = IntCounter::new(
            "bitgrid_frames_sampled_total",
            "Frames that contributed bits on decode",
        )?;
        let frames_skipped = IntCounter::new(
            "bitgrid_frames_skipped_total",
            "Frames rejected or unreadable on decode",
        )?;
        let bits_encoded = IntCounter::new(
            "bitgrid_bits_encoded_total",
            "Payload bits encoded before padding",
        )?;
        let bits_decoded = IntCounter::new(
            "bitgrid_bits_decoded_total",
            "Bits kept after truncation",
        )?;
        let bits_dropped = IntCounter::new(
            "bitgrid_bits_dropped_total",
            "Trailing bits that did not fill a byte",
        )?;
        let declared_bits = IntGauge::new(
            "bitgrid_declared_bits",
            "Bit length from the most recent metadata",
        )?;
        let replacement_chars = IntCounter::new(
            "bitgrid_replacement_chars_total",
            "Replacement characters emitted during text recovery",
        )?;

        registry.register(Box::new(frames_rendered.clone()))?;
        registry.register(Box::new(frames_sampled.clone()))?;
        registry.register(Box::new(frames_skipped.clone()))?;
        registry.register(Box::new(bits_encoded.clone()))?;
        registry.register(Box::new(bits_decoded.clone()))?;
        registry.register(Box::new(bits_dropped.clone()))?;
        registry.register(Box::new(declared_bits.clone()))?;
        registry.register(Box::new(replacement_chars.clone()))?;

        Ok(Self {
            registry,
            frames_rendered,
            frames_sampled,
            frames_skipped,
            bits_encoded,
            bits_decoded,
            bits_dropped,
            declared_bits,
            replacement_chars,
        })
    }

    /// Adds a snapshot to the running totals.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.frames_rendered.inc_by(snapshot.frames_rendered);
        self.frames_sampled.inc_by(snapshot.frames_sampled);
        self.frames_skipped.inc_by(snapshot.frames_skipped);

        self.bits_encoded.inc_by(snapshot.bits_encoded);
        self.bits_decoded.inc_by(snapshot.bits_decoded);
        self.bits_dropped.inc_by(snapshot.bits_dropped);
        if let Some(declared) = snapshot.declared_bits {
            self.declared_bits.set(declared as i64);
        }

        self.replacement_chars.inc_by(snapshot.replacement_chars);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::Condition;

    #[test]
    fn test_registry_creation() {
        assert!(CodecMetrics::new().is_ok());
    }

    #[test]
    fn test_updates_accumulate() {
        let metrics = CodecMetrics::new().unwrap();
        let snapshot = MetricsSnapshot {
            frames_rendered: 2,
            bits_encoded: 150,
            declared_bits: Some(150),
            ..Default::default()
        };

        metrics.update(&snapshot);
        metrics.update(&snapshot);

        let output = metrics.encode().unwrap();
        assert!(output.contains("bitgrid_frames_rendered_total 4"));
        assert!(output.contains("bitgrid_bits_encoded_total 300"));
        assert!(output.contains("bitgrid_declared_bits 150"));
    }

    #[test]
    fn test_snapshot_from_decode() {
        let report = DecodeReport {
            frames_supplied: 3,
            frames_sampled: 2,
            final_bits: 37,
            dropped_bits: 5,
            replacements: 1,
            declared_bits: Some(37),
            conditions: vec![Condition::FrameUnreadable {
                index: 2,
                reason: "gone".into(),
            }],
            ..Default::default()
        };

        let snapshot = MetricsSnapshot::from_decode(&report);
        assert_eq!(snapshot.frames_sampled, 2);
        assert_eq!(snapshot.frames_skipped, 1);
        assert_eq!(snapshot.bits_decoded, 37);
        assert_eq!(snapshot.bits_dropped, 5);
        assert_eq!(snapshot.replacement_chars, 1);
    }

    #[test]
    fn test_metrics_encode_lists_names() {
        let output = CodecMetrics::new().unwrap().encode().unwrap();
        assert!(output.contains("bitgrid_frames_skipped_total"));
        assert!(output.contains("bitgrid_replacement_chars_total"));
    }
}
