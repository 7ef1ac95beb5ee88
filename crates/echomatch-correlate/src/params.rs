// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::error::{CorrelateError, Result};

/// Tuning parameters for a correlation scan.
///
/// The defaults reproduce the production configuration: a ±150-frame scan
/// window stepped one frame at a time with a 20-frame minimum overlap and a
/// 0.5 match threshold. Tests can construct much smaller windows to exercise
/// the engine on synthetic sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationParams {
    /// Maximum absolute frame offset scanned in each direction.
    pub span_frames: usize,
    /// Frame increment between tested offsets.
    pub step_frames: usize,
    /// Alignments overlapping fewer frames than this score zero rather than
    /// being compared, so spurious short overlaps are never rewarded.
    pub min_overlap_frames: usize,
    /// Best scores strictly above this value count as a match.
    pub match_threshold: f64,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            span_frames: 150,
            step_frames: 1,
            min_overlap_frames: 20,
            match_threshold: 0.5,
        }
    }
}

impl CorrelationParams {
    /// Check the parameters for values the scan cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.step_frames == 0 {
            return Err(CorrelateError::InvalidInput(
                "step_frames must be at least 1".to_string(),
            ));
        }
        if self.min_overlap_frames == 0 {
            return Err(CorrelateError::InvalidInput(
                "min_overlap_frames must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(CorrelateError::InvalidInput(format!(
                "match_threshold must be within 0.0..=1.0, got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }

    /// Whether a best-alignment score clears the match threshold.
    pub fn is_match(&self, score: f64) -> bool {
        score > self.match_threshold
    }
}
