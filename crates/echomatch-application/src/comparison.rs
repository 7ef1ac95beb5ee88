// SPDX-License-Identifier: GPL-3.0-or-later

//! Comparison service orchestrating the fingerprint provider and the
//! correlation engine.
//!
//! One call extracts the fingerprints of both files and scans the bounded
//! offset window for the best alignment; the winning score is reported
//! together with the derived match decision. All failures propagate to the
//! caller unchanged; there are no retries and no partial results.

use std::path::Path;

use echomatch_correlate::{CorrelateError, CorrelationParams, Correlator};
use echomatch_fingerprint::{FingerprintError, FingerprintProvider};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while comparing two audio files
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("fingerprint extraction failed: {0}")]
    Extraction(#[from] FingerprintError),

    #[error("correlation failed: {0}")]
    Correlation(#[from] CorrelateError),
}

/// Result type for comparison operations
pub type ComparisonResult<T> = Result<T, ComparisonError>;

/// Outcome of comparing two audio files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Best similarity score across all tested offsets (0.0-1.0).
    pub score: f64,
    /// Frame offset at which the best score occurred.
    pub offset: isize,
    /// Whether the best score clears the match threshold.
    pub matched: bool,
}

/// Audio comparison service.
///
/// Holds a fingerprint provider and a configured correlation engine; both are
/// stateless across calls, so a single service can run any number of
/// comparisons and independent services can run concurrently.
pub struct ComparisonService<P> {
    provider: P,
    correlator: Correlator,
}

impl<P: FingerprintProvider> ComparisonService<P> {
    /// Create a new comparison service.
    ///
    /// # Errors
    ///
    /// Fails when the correlation parameters are invalid.
    pub fn new(provider: P, params: CorrelationParams) -> Result<Self, CorrelateError> {
        Ok(Self {
            provider,
            correlator: Correlator::new(params)?,
        })
    }

    /// Compare two audio files and return the best alignment found.
    ///
    /// # Errors
    ///
    /// * `ComparisonError::Extraction` - the provider could not produce a
    ///   fingerprint sequence for either file
    /// * `ComparisonError::Correlation` - the scan window exceeds the
    ///   available fingerprint data
    pub async fn compare(&self, source: &Path, target: &Path) -> ComparisonResult<Comparison> {
        let source_codes = self.provider.fingerprints(source).await?;
        let target_codes = self.provider.fingerprints(target).await?;

        debug!(
            target: "compare",
            source_frames = source_codes.len(),
            target_frames = target_codes.len(),
            "fingerprints extracted"
        );

        let peak = self.correlator.correlate(&source_codes, &target_codes)?;
        info!(
            target: "compare",
            peak_index = peak.index,
            peak_offset = peak.offset,
            "best alignment selected"
        );

        let matched = self.correlator.params().is_match(peak.score);
        if matched {
            info!(
                target: "compare",
                "{} and {} match with correlation of {:.4} at offset {}",
                source.display(),
                target.display(),
                peak.score,
                peak.offset
            );
        }

        Ok(Comparison {
            score: peak.score,
            offset: peak.offset,
            matched,
        })
    }
}
