// SPDX-License-Identifier: GPL-3.0-or-later

//! Offset-bounded cross-correlation of fingerprint sequences.
//!
//! A fingerprint sequence is one unsigned 32-bit code per analyzed time
//! frame. Two recordings overlap when some relative frame offset aligns their
//! sequences with a high mean bit-agreement, so the engine slides one
//! sequence across the other within a bounded window and scores every
//! alignment.

use tracing::debug;

use crate::curve::{CorrelationCurve, Peak};
use crate::error::{CorrelateError, Result};
use crate::params::CorrelationParams;

/// Mean fraction of matching bits between two fingerprint sequences.
///
/// Both sequences must be non-empty and of equal length; callers truncate to
/// a common length before scoring. Each frame pair contributes
/// `(32 - popcount(x XOR y)) / 32`, and the sequence score is the arithmetic
/// mean of those contributions, so 1.0 means every bit agrees.
///
/// # Errors
///
/// Returns `InvalidInput` when either sequence is empty or the lengths
/// differ. Both indicate a bug in the caller, not bad fingerprint data.
pub fn similarity(x: &[u32], y: &[u32]) -> Result<f64> {
    if x.is_empty() || y.is_empty() {
        return Err(CorrelateError::InvalidInput(
            "empty fingerprint sequences cannot be scored".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(CorrelateError::InvalidInput(format!(
            "fingerprint sequence lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }

    let matching_bits: u64 = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| u64::from(32 - (a ^ b).count_ones()))
        .sum();

    Ok(matching_bits as f64 / x.len() as f64 / 32.0)
}

/// Cross-correlation engine over a fixed parameter set.
///
/// The engine is purely computational and holds no mutable state; one
/// instance can serve any number of comparisons, and independent comparisons
/// can run on separate instances without synchronization.
#[derive(Debug, Clone)]
pub struct Correlator {
    params: CorrelationParams,
}

impl Correlator {
    /// Create an engine from validated parameters.
    pub fn new(params: CorrelationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CorrelationParams {
        &self.params
    }

    /// Score the alignment of `x` and `y` at a single frame offset.
    ///
    /// A positive offset drops that many leading frames from `x`; a negative
    /// offset drops them from `y`. Both sides are then truncated to the
    /// shorter remaining length. Alignments overlapping fewer than the
    /// configured minimum frames score exactly 0.0 rather than erroring, so
    /// a curve always carries one entry per tested offset.
    pub fn at_offset(&self, x: &[u32], y: &[u32], offset: isize) -> Result<f64> {
        let (x, y) = if offset >= 0 {
            (x.get(offset as usize..).unwrap_or(&[]), y)
        } else {
            (x, y.get(offset.unsigned_abs()..).unwrap_or(&[]))
        };

        let overlap = x.len().min(y.len());
        if overlap < self.params.min_overlap_frames {
            return Ok(0.0);
        }

        similarity(&x[..overlap], &y[..overlap])
    }

    /// Build the correlation curve: one similarity score per offset in
    /// `{-span, -span+step, .., +span}`, in increasing-offset order.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` when the span exceeds the shorter input;
    /// a window wider than the available data cannot be scanned productively
    /// and no partial result is produced.
    pub fn scan(&self, x: &[u32], y: &[u32]) -> Result<CorrelationCurve> {
        let span = self.params.span_frames;
        let step = self.params.step_frames;

        let available = x.len().min(y.len());
        if span > available {
            return Err(CorrelateError::InsufficientData { span, available });
        }

        let mut scores = Vec::with_capacity(2 * span / step + 1);
        let mut offset = -(span as isize);
        while offset <= span as isize {
            scores.push(self.at_offset(x, y, offset)?);
            offset += step as isize;
        }

        debug!(
            target: "correlate",
            offsets = scores.len(),
            span,
            step,
            "correlation curve computed"
        );

        Ok(CorrelationCurve::new(scores, span, step))
    }

    /// Scan the full offset window and select the best alignment.
    pub fn correlate(&self, x: &[u32], y: &[u32]) -> Result<Peak> {
        self.scan(x, y)?.peak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlator(span: usize, step: usize, min_overlap: usize) -> Correlator {
        Correlator::new(CorrelationParams {
            span_frames: span,
            step_frames: step,
            min_overlap_frames: min_overlap,
            match_threshold: 0.5,
        })
        .unwrap()
    }

    #[test]
    fn similarity_identical_sequences_is_exactly_one() {
        let codes = vec![0u32, 0xDEAD_BEEF, u32::MAX, 12345];
        assert_eq!(similarity(&codes, &codes).unwrap(), 1.0);
    }

    #[test]
    fn similarity_fully_inverted_sequences_is_zero() {
        let x = vec![0u32, 0u32];
        let y = vec![u32::MAX, u32::MAX];
        assert_eq!(similarity(&x, &y).unwrap(), 0.0);
    }

    #[test]
    fn similarity_counts_bit_agreement_per_frame() {
        // One frame, four differing bits: 28 of 32 bits agree.
        let x = vec![0x0Fu32];
        let y = vec![0x00u32];
        assert_eq!(similarity(&x, &y).unwrap(), 28.0 / 32.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let x = vec![0xABCD_1234u32, 7, 99, 0];
        let y = vec![0x1234_ABCDu32, 8, 100, u32::MAX];
        assert_eq!(similarity(&x, &y).unwrap(), similarity(&y, &x).unwrap());
    }

    #[test]
    fn similarity_stays_within_unit_interval() {
        let x = vec![3u32, 0xFFFF_0000, 42];
        let y = vec![0xFFFF_FFFFu32, 0x0000_FFFF, 43];
        let score = similarity(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn similarity_rejects_empty_input() {
        assert!(matches!(
            similarity(&[], &[1]),
            Err(CorrelateError::InvalidInput(_))
        ));
        assert!(similarity(&[1], &[]).is_err());
        assert!(similarity(&[], &[]).is_err());
    }

    #[test]
    fn similarity_rejects_length_mismatch() {
        assert!(matches!(
            similarity(&[1, 2], &[1]),
            Err(CorrelateError::InvalidInput(_))
        ));
    }

    #[test]
    fn at_offset_zero_on_identical_sequences_is_one() {
        let engine = correlator(2, 1, 1);
        let codes = vec![5u32, 6, 7, 8];
        assert_eq!(engine.at_offset(&codes, &codes, 0).unwrap(), 1.0);
    }

    #[test]
    fn at_offset_positive_drops_leading_frames_of_x() {
        let engine = correlator(2, 1, 1);
        let x = vec![99u32, 1, 2, 3];
        let y = vec![1u32, 2, 3];
        assert_eq!(engine.at_offset(&x, &y, 1).unwrap(), 1.0);
    }

    #[test]
    fn at_offset_negative_drops_leading_frames_of_y() {
        let engine = correlator(2, 1, 1);
        let x = vec![1u32, 2, 3];
        let y = vec![99u32, 1, 2, 3];
        assert_eq!(engine.at_offset(&x, &y, -1).unwrap(), 1.0);
    }

    #[test]
    fn at_offset_unequal_tails_truncate_to_shorter_side() {
        let engine = correlator(2, 1, 1);
        let x = vec![1u32, 2, 3, 4, 5, 6];
        let y = vec![2u32, 3];
        // Offset 1 leaves x with five frames and y with two; only two pairs
        // are compared.
        assert_eq!(engine.at_offset(&x, &y, 1).unwrap(), 1.0);
    }

    #[test]
    fn at_offset_short_overlap_scores_zero_even_for_identical_content() {
        let engine = correlator(15, 1, 20);
        let codes: Vec<u32> = (0..30).collect();
        assert_eq!(engine.at_offset(&codes, &codes, 15).unwrap(), 0.0);
        assert_eq!(engine.at_offset(&codes, &codes, -15).unwrap(), 0.0);
    }

    #[test]
    fn at_offset_overlap_of_exactly_min_overlap_is_scored() {
        // y is x advanced by ten frames; offset 10 leaves exactly 20
        // perfectly aligned frames, the configured minimum.
        let engine = correlator(15, 1, 20);
        let x: Vec<u32> = (0..30).collect();
        let y: Vec<u32> = (10..40).collect();
        assert_eq!(engine.at_offset(&x, &y, 10).unwrap(), 1.0);
    }

    #[test]
    fn at_offset_beyond_sequence_length_scores_zero() {
        let engine = correlator(2, 1, 1);
        let codes = vec![1u32, 2, 3];
        assert_eq!(engine.at_offset(&codes, &codes, 10).unwrap(), 0.0);
        assert_eq!(engine.at_offset(&codes, &codes, -10).unwrap(), 0.0);
    }

    #[test]
    fn scan_produces_one_score_per_tested_offset() {
        let engine = correlator(5, 1, 1);
        let codes: Vec<u32> = (0..20).collect();
        let curve = engine.scan(&codes, &codes).unwrap();
        assert_eq!(curve.len(), 11);
    }

    #[test]
    fn scan_length_with_coarse_step() {
        // span 3 / step 2 tests offsets -3, -1, 1, 3.
        let engine = correlator(3, 2, 1);
        let codes: Vec<u32> = (0..10).collect();
        let curve = engine.scan(&codes, &codes).unwrap();
        assert_eq!(curve.len(), 2 * 3 / 2 + 1);
        assert_eq!(curve.offset_at(0), -3);
        assert_eq!(curve.offset_at(curve.len() - 1), 3);
    }

    #[test]
    fn scan_span_wider_than_data_is_insufficient() {
        let engine = correlator(10, 1, 1);
        let long: Vec<u32> = (0..50).collect();
        let short: Vec<u32> = (0..5).collect();
        let err = engine.scan(&long, &short).unwrap_err();
        assert!(matches!(
            err,
            CorrelateError::InsufficientData {
                span: 10,
                available: 5
            }
        ));
    }

    #[test]
    fn scan_does_not_mutate_inputs() {
        let engine = correlator(2, 1, 1);
        let x: Vec<u32> = (0..10).collect();
        let y: Vec<u32> = (10..20).collect();
        let (x_before, y_before) = (x.clone(), y.clone());
        engine.scan(&x, &y).unwrap();
        assert_eq!(x, x_before);
        assert_eq!(y, y_before);
    }

    #[test]
    fn correlate_identical_sequences_peaks_at_offset_zero() {
        let engine = correlator(3, 1, 2);
        let codes = vec![0b000u32, 0b111, 0b101, 0b010, 0b110, 0b001];
        let peak = engine.correlate(&codes, &codes).unwrap();
        assert_eq!(peak.offset, 0);
        assert_eq!(peak.score, 1.0);
    }

    #[test]
    fn correlate_recovers_a_one_frame_shift() {
        // y is x advanced by one frame, so dropping x's first frame aligns
        // them perfectly: the peak sits at offset +1 with a full score while
        // offset 0 scores lower.
        let engine = correlator(1, 1, 1);
        let x = vec![0b000u32, 0b111, 0b101];
        let y = vec![0b111u32, 0b101, 0b000];
        let curve = engine.scan(&x, &y).unwrap();
        let peak = curve.peak().unwrap();
        assert_eq!(peak.offset, 1);
        assert_eq!(peak.score, 1.0);
        assert!(curve.scores()[1] < 1.0);
    }

    #[test]
    fn correlate_ties_resolve_to_most_negative_offset() {
        // With a minimum overlap longer than both sequences every offset
        // scores zero, so the reported peak must be the leftmost offset.
        let engine = correlator(3, 1, 50);
        let codes: Vec<u32> = (0..10).collect();
        let peak = engine.correlate(&codes, &codes).unwrap();
        assert_eq!(peak.index, 0);
        assert_eq!(peak.offset, -3);
        assert_eq!(peak.score, 0.0);
    }

    #[test]
    fn correlator_rejects_invalid_params() {
        let params = CorrelationParams {
            step_frames: 0,
            ..Default::default()
        };
        assert!(Correlator::new(params).is_err());
    }
}
