use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ResolvedThresholds;

/// Ett trackpoint fra opptaket (GPS + puls), parset av collaborator.
/// Kjernen muterer aldri et sample etter innlesing; smoothing bygger
/// alltid en ny sekvens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sample {
    pub time_utc: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,   // grader
    pub longitude: Option<f64>,  // grader
    pub heart_rate_bpm: Option<i32>,
    /// Fil-deklarert distansebidrag (meter) for punktet, hvis kilden har det.
    /// Brukes kun som fallback når GPS-distanse ikke kan beregnes.
    pub distance_m: Option<f64>,
}

impl Sample {
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Fullt brukbart punkt for tidsbaserte beregninger: posisjon + tid.
    pub fn has_fix(&self) -> bool {
        self.time_utc.is_some() && self.has_position()
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Valgbar smoothing-strategi. Lukket enum – collaborators normaliserer
/// strenger via `from_key` før kall, ukjent nøkkel faller tilbake til default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingStrategy {
    Raw,
    #[default]
    AdaptiveMedian,
    SavitzkyGolay,
    Exponential,
}

impl SmoothingStrategy {
    /// Fail-soft oppslag: ukjent/tom nøkkel gir AdaptiveMedian.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "raw" | "none" => Self::Raw,
            "savitzky_golay" | "savitzkygolay" | "sg" => Self::SavitzkyGolay,
            "exponential" | "lowpass" => Self::Exponential,
            _ => Self::AdaptiveMedian,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::AdaptiveMedian => "adaptive_median",
            Self::SavitzkyGolay => "savitzky_golay",
            Self::Exponential => "exponential",
        }
    }
}

/// Terskelprofil for spilleren. Maks-HR kommer ferdig oppløst fra
/// collaborator (fast verdi eller adaptiv fra historikk). Version +
/// updated_utc følger med for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdProfile {
    /// Effektiv makshastighet (m/s) som prosentene regnes av.
    pub max_speed_ms: f64,
    /// Sprintterskel i prosent av max_speed_ms.
    pub sprint_pct: f64,
    /// Høyintensitetsterskel i prosent av max_speed_ms. Skal være
    /// strengt lavere enn sprint_pct; resolve() klemmer ved brudd.
    pub high_intensity_pct: f64,
    pub accel_threshold_ms2: f64,
    pub decel_threshold_ms2: f64,
    pub max_heart_rate_bpm: f64,
    pub version: u32,
    pub updated_utc: Option<DateTime<Utc>>,
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self {
            max_speed_ms: 9.5,
            sprint_pct: 85.0,
            high_intensity_pct: 65.0,
            accel_threshold_ms2: 2.5,
            decel_threshold_ms2: -2.5,
            max_heart_rate_bpm: 190.0,
            version: 1,
            updated_utc: None,
        }
    }
}

impl ThresholdProfile {
    /// Løser profilen til konkrete terskler (m/s, m/s², bpm) med
    /// fysiologisk plausible grenser. Snapshotet legges ved i
    /// CoreMetrics for audit/debugging.
    pub fn resolve(&self) -> ResolvedThresholds {
        let max_speed = self.max_speed_ms.clamp(5.0, 12.5);
        let sprint_pct = self.sprint_pct.clamp(60.0, 100.0);
        // invariant: høyintensitet < sprint
        let high_pct = self.high_intensity_pct.clamp(30.0, sprint_pct - 1.0);

        let max_hr = if self.max_heart_rate_bpm > 0.0 {
            self.max_heart_rate_bpm.clamp(100.0, 230.0)
        } else {
            // ugyldig maks-HR beholdes som ugyldig; HR-metrikker blir NotUsable
            self.max_heart_rate_bpm
        };

        ResolvedThresholds {
            max_speed_ms: max_speed,
            sprint_speed_ms: max_speed * sprint_pct / 100.0,
            high_intensity_speed_ms: max_speed * high_pct / 100.0,
            acceleration_ms2: self.accel_threshold_ms2.clamp(0.5, 10.0),
            deceleration_ms2: self.decel_threshold_ms2.clamp(-10.0, -0.5),
            max_heart_rate_bpm: max_hr,
            profile_version: self.version,
        }
    }
}
