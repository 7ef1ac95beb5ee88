// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorrelateError>;

#[derive(Debug, Error)]
pub enum CorrelateError {
    /// An internal contract was violated (empty or mismatched input where the
    /// callers guarantee otherwise). Indicates an orchestration bug, not bad
    /// audio data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("scan span of {span} frames exceeds available fingerprint data ({available} frames)")]
    InsufficientData { span: usize, available: usize },
}
