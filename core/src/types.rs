use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot av profilen etter clamping – legges ved resultatet slik at
/// tallene kan etterprøves selv om profilen endres senere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedThresholds {
    pub max_speed_ms: f64,
    pub sprint_speed_ms: f64,
    pub high_intensity_speed_ms: f64,
    pub acceleration_ms2: f64,
    pub deceleration_ms2: f64,
    pub max_heart_rate_bpm: f64,
    pub profile_version: u32,
}

/// Spor fra smoothing-steget: hva ble gjort, og hva gjorde det med sporet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingTrace {
    pub strategy: String,
    /// Strategispesifikke parametre (alpha, vindu, koeffisienter ...).
    pub params: Value,
    pub raw_distance_m: f64,
    pub smoothed_distance_m: f64,
    pub direction_changes_raw: u32,
    pub direction_changes_tolerant: u32,
    pub direction_changes_smoothed: u32,
    /// NB: Savitzky-Golay og Exponential teller her "berørte" punkter,
    /// AdaptiveMedian teller kun ekte fartsoutliers. Bevisst ulikhet –
    /// UI-et presenterer tallene forskjellig per strategi.
    pub corrected_outliers: u32,
    pub outlier_speed_ms: f64,
    pub analyzed_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

/// Kvalitetsdom med begrunnelser. `reasons` er aldri tom – et rent
/// opptak får én bekreftende grunn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub level: QualityLevel,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunType {
    HighIntensity,
    Sprint,
}

/// Ett detektert drag (hysterese-event). Sprintfaser ligger alltid
/// fullt innenfor foreldredraget, både i tid og i punktindekser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: u32,
    pub run_type: RunType,
    pub start_elapsed_s: f64,
    pub duration_s: f64,
    pub distance_m: f64,
    /// Indekser inn i den glattede sample-sekvensen.
    pub point_indices: Vec<usize>,
    pub sprint_phases: Vec<Run>,
    pub parent_run_id: Option<u32>,
}

/// Antall akselerasjons-/retardasjonsevents (events, ikke samples).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelDecelCounts {
    pub accelerations: u32,
    pub decelerations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricAvailability {
    Available,
    AvailableWithWarning,
    NotUsable,
    NotMeasured,
}

/// Kjernemetrikkene for en hel økt eller ett tidsvindu. Verdier er
/// Some når de lot seg beregne; availability-kartet sier om de bør brukes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub is_available: bool,
    pub reason: Option<String>,
    pub distance_m: Option<f64>,
    pub sprint_distance_m: Option<f64>,
    pub sprint_count: Option<u32>,
    pub max_speed_ms: Option<f64>,
    pub high_intensity_time_s: Option<f64>,
    pub high_intensity_run_count: Option<u32>,
    pub high_speed_distance_m: Option<f64>,
    pub running_density_m_per_min: Option<f64>,
    pub acceleration_count: Option<u32>,
    pub deceleration_count: Option<u32>,
    pub hr_zone_low_s: Option<f64>,
    pub hr_zone_medium_s: Option<f64>,
    pub hr_zone_high_s: Option<f64>,
    pub trimp: Option<f64>,
    pub hr_recovery_60s_bpm: Option<f64>,
    /// Per-metrikk tilgjengelighet, deterministisk ordnet.
    pub availability: BTreeMap<String, MetricAvailability>,
    pub thresholds: ResolvedThresholds,
}

/// Aggregat for ett tidsvindu (1/2/5 min). Siste vindu kan være kortere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalAggregate {
    pub window_minutes: u32,
    pub window_index: u32,
    pub window_start_utc: DateTime<Utc>,
    pub duration_s: f64,
    pub metrics: CoreMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceSource {
    CalculatedFromGps,
    FromFile,
    Unavailable,
}

/// Toppnivåresultatet fra extract(). Immutabelt; lages på nytt per kall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub start_utc: Option<DateTime<Utc>>,
    pub duration_s: f64,
    pub trackpoint_count: usize,
    pub hr_min_bpm: Option<i32>,
    pub hr_avg_bpm: Option<f64>,
    pub hr_max_bpm: Option<i32>,
    pub distance_m: Option<f64>,
    pub distance_source: DistanceSource,
    pub has_gps: bool,
    pub quality: QualityReport,
    pub smoothing: SmoothingTrace,
    pub metrics: CoreMetrics,
    pub intervals: Vec<IntervalAggregate>,
    pub runs: Vec<Run>,
}
