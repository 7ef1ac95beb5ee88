// SPDX-License-Identifier: GPL-3.0-or-later

use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FingerprintError>;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("failed to run {tool}: {source}")]
    ToolInvocation {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} produced non-UTF-8 output")]
    OutputNotUtf8 { tool: String },

    #[error("fingerprint report is missing the FINGERPRINT= field")]
    MissingFingerprint,

    #[error("unparsable fingerprint token {token:?}")]
    InvalidToken { token: String },
}
