//! MatchGraph core: trajektorie-til-metrikk-pipeline for fotballopptak
//! (GPS + puls). Collaborators parser filer til `Sample`-sekvenser og
//! persisterer `ActivitySummary`; kjernen kjenner verken lagring, HTTP
//! eller identitet.

pub mod geo;
pub mod heart_rate;
pub mod intervals;
pub mod models;
pub mod quality;
pub mod runs;
pub mod smoothing;
pub mod stats;
pub mod summary;
pub mod types;

pub use models::{Sample, SmoothingStrategy, ThresholdProfile};
pub use summary::extract;
pub use types::{
    AccelDecelCounts, ActivitySummary, CoreMetrics, DistanceSource, IntervalAggregate,
    MetricAvailability, QualityLevel, QualityReport, ResolvedThresholds, Run, RunType,
    SmoothingTrace,
};

use thiserror::Error;

/// Feil på JSON-grensen. Kjernen selv reiser aldri domenefeil for
/// numeriske kanttilfeller – de degraderer i stedet stille.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid samples json: {0}")]
    InvalidSamples(#[source] serde_json::Error),
    #[error("invalid threshold profile json: {0}")]
    InvalidProfile(#[source] serde_json::Error),
    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON-inngang for collaborators: samples + profil som JSON-strenger,
/// valgfri strateginøkkel (ukjent nøkkel normaliseres fail-soft til
/// AdaptiveMedian). Returnerer summary som JSON.
pub fn extract_json(
    samples_json: &str,
    profile_json: &str,
    strategy_key: Option<&str>,
) -> Result<String, ExtractError> {
    let samples: Vec<Sample> =
        serde_json::from_str(samples_json).map_err(ExtractError::InvalidSamples)?;
    let profile: ThresholdProfile =
        serde_json::from_str(profile_json).map_err(ExtractError::InvalidProfile)?;
    let strategy = strategy_key
        .map(SmoothingStrategy::from_key)
        .unwrap_or_default();

    let summary = extract(&samples, strategy, &profile);
    Ok(serde_json::to_string(&summary)?)
}
