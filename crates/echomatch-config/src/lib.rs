// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Path or name of the Chromaprint `fpcalc` binary.
    pub tool_path: String,
    /// Seconds of audio sampled from the start of each file.
    pub sample_duration_secs: u32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            tool_path: "fpcalc".to_string(),
            sample_duration_secs: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Maximum absolute frame offset scanned in each direction.
    pub span_frames: usize,
    /// Frame increment between tested offsets.
    pub step_frames: usize,
    /// Overlaps shorter than this score zero instead of being compared.
    pub min_overlap_frames: usize,
    /// Best scores above this value are reported as a match.
    pub match_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            span_frames: 150,
            step_frames: 1,
            min_overlap_frames: 20,
            match_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub fingerprint: FingerprintConfig,
    pub correlation: CorrelationConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: ECHOMATCH_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("ECHOMATCH_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
