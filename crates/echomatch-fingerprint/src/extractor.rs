// SPDX-License-Identifier: GPL-3.0-or-later

//! Fingerprint extraction via the Chromaprint `fpcalc` tool.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{FingerprintError, Result};

/// Field marker preceding the comma-separated codes in an `fpcalc -raw` report.
const FINGERPRINT_FIELD: &str = "FINGERPRINT=";

/// Source of time-indexed acoustic fingerprint codes for an audio file.
///
/// One code summarizes one short time frame; order is significant. Extraction
/// failures are terminal for the comparison — implementations must not retry
/// or return partial sequences.
#[async_trait]
pub trait FingerprintProvider: Send + Sync {
    async fn fingerprints(&self, path: &Path) -> Result<Vec<u32>>;
}

/// Fingerprint provider backed by the Chromaprint `fpcalc` binary.
#[derive(Debug, Clone)]
pub struct FpcalcExtractor {
    tool_path: String,
    sample_duration_secs: u32,
}

impl FpcalcExtractor {
    /// Create an extractor sampling at most `sample_duration_secs` seconds
    /// from the start of each file, using `fpcalc` from `PATH`.
    pub fn new(sample_duration_secs: u32) -> Self {
        Self {
            tool_path: "fpcalc".to_string(),
            sample_duration_secs,
        }
    }

    /// Use a specific tool binary instead of resolving `fpcalc` from `PATH`.
    pub fn with_tool_path(mut self, tool_path: impl Into<String>) -> Self {
        self.tool_path = tool_path.into();
        self
    }

    /// Run the tool against one audio file and parse its report.
    #[instrument(skip(self), fields(file = ?path))]
    pub async fn extract(&self, path: &Path) -> Result<Vec<u32>> {
        let output = Command::new(&self.tool_path)
            .arg("-raw")
            .arg("-length")
            .arg(self.sample_duration_secs.to_string())
            .arg(path)
            .output()
            .await
            .map_err(|source| FingerprintError::ToolInvocation {
                tool: self.tool_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FingerprintError::ToolFailed {
                tool: self.tool_path.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report =
            String::from_utf8(output.stdout).map_err(|_| FingerprintError::OutputNotUtf8 {
                tool: self.tool_path.clone(),
            })?;

        let codes = parse_report(&report)?;
        debug!(target: "fingerprint", frames = codes.len(), "fingerprint extracted");
        Ok(codes)
    }
}

#[async_trait]
impl FingerprintProvider for FpcalcExtractor {
    async fn fingerprints(&self, path: &Path) -> Result<Vec<u32>> {
        self.extract(path).await
    }
}

/// Parse an `fpcalc -raw` report into fingerprint codes.
///
/// The report carries a `FINGERPRINT=` field followed by comma-separated
/// integers. The tool decorates tokens with stray non-digit characters
/// (whitespace, a trailing newline), so each token is stripped to its digits
/// before parsing. A token with no digits left, or one that overflows 32
/// bits, is a hard failure, so an empty fingerprint list surfaces as an
/// extraction failure rather than a shorter comparison.
pub fn parse_report(report: &str) -> Result<Vec<u32>> {
    let start = report
        .find(FINGERPRINT_FIELD)
        .ok_or(FingerprintError::MissingFingerprint)?
        + FINGERPRINT_FIELD.len();

    let mut codes = Vec::new();
    for token in report[start..].split(',') {
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        let code = digits
            .parse::<u32>()
            .map_err(|_| FingerprintError::InvalidToken {
                token: token.trim().to_string(),
            })?;
        codes.push(code);
    }
    Ok(codes)
}
