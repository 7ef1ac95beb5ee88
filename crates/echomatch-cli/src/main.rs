// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;

use anyhow::{bail, Result};
use echomatch_application::ComparisonService;
use echomatch_config::load as load_config;
use echomatch_correlate::CorrelationParams;
use echomatch_fingerprint::FpcalcExtractor;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(None)?;
    init_tracing(&config.telemetry.log_level);

    let (source, target) = parse_args(std::env::args().skip(1))?;

    let extractor = FpcalcExtractor::new(config.fingerprint.sample_duration_secs)
        .with_tool_path(&config.fingerprint.tool_path);
    let service = ComparisonService::new(extractor, correlation_params(&config.correlation))?;

    let comparison = service.compare(&source, &target).await?;
    info!(target: "cli", score = comparison.score, offset = comparison.offset, "comparison finished");

    println!(
        "similarity {:.4} at offset {} ({})",
        comparison.score,
        comparison.offset,
        if comparison.matched { "match" } else { "no match" }
    );

    Ok(())
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(PathBuf, PathBuf)> {
    match (args.next(), args.next(), args.next()) {
        (Some(source), Some(target), None) => Ok((PathBuf::from(source), PathBuf::from(target))),
        _ => bail!("usage: echomatch-cli <source-audio> <target-audio>"),
    }
}

fn correlation_params(config: &echomatch_config::CorrelationConfig) -> CorrelationParams {
    CorrelationParams {
        span_frames: config.span_frames,
        step_frames: config.step_frames,
        min_overlap_frames: config.min_overlap_frames,
        match_threshold: config.match_threshold,
    }
}
