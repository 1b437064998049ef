use crate::geo;
use crate::models::Sample;
use crate::types::{QualityLevel, QualityReport};

// Straffepoeng → dom: ≥4 Low, 2–3 Medium, ≤1 High.
const LOW_AT: u32 = 4;
const MEDIUM_AT: u32 = 2;

// Manglende-andel: ≥ 0.5 gir to poeng, > 0.1 gir ett. Øvre grense er
// inklusiv slik at halvveis manglende GPS trekker dommen til Medium.
const HEAVY_MISSING: f64 = 0.5;
const PARTIAL_MISSING: f64 = 0.1;

/// Scorer datakvaliteten for (glattede) samples mot outlier-terskelen.
/// Tidsstempel, GPS og puls vurderes uavhengig, i den rekkefølgen, med
/// høyst én grunn hver; deretter telles usannsynlige GPS-hopp.
pub fn assess_quality(samples: &[Sample], outlier_threshold_ms: f64) -> QualityReport {
    if samples.is_empty() {
        return QualityReport {
            level: QualityLevel::Low,
            reasons: vec!["recording contains no samples".to_string()],
        };
    }

    let total = samples.len() as f64;
    let mut points = 0u32;
    let mut reasons = Vec::new();

    let missing_ts = samples.iter().filter(|s| s.time_utc.is_none()).count() as f64 / total;
    score_missing(
        missing_ts,
        "timestamps are missing for most samples",
        "timestamps are missing for some samples",
        &mut points,
        &mut reasons,
    );

    let missing_gps = samples.iter().filter(|s| !s.has_position()).count() as f64 / total;
    score_missing(
        missing_gps,
        "GPS coverage is limited for most of the recording",
        "GPS coverage is limited in parts of the recording",
        &mut points,
        &mut reasons,
    );

    let missing_hr = samples.iter().filter(|s| s.heart_rate_bpm.is_none()).count() as f64 / total;
    score_missing(
        missing_hr,
        "heart rate is missing for most samples",
        "heart rate is missing for some samples",
        &mut points,
        &mut reasons,
    );

    // usannsynlige hopp: nabopar med fart over terskelen
    let jumps = geo::build_segments(samples)
        .iter()
        .filter(|s| s.speed_ms > outlier_threshold_ms)
        .count();
    if jumps >= 2 {
        points += 2;
        reasons.push("multiple implausible GPS jumps detected".to_string());
    } else if jumps == 1 {
        points += 1;
        reasons.push("isolated implausible GPS jump detected".to_string());
    }

    let level = if points >= LOW_AT {
        QualityLevel::Low
    } else if points >= MEDIUM_AT {
        QualityLevel::Medium
    } else {
        QualityLevel::High
    };

    if reasons.is_empty() {
        reasons.push("all data channels look complete".to_string());
    }

    QualityReport { level, reasons }
}

fn score_missing(
    ratio: f64,
    heavy_reason: &str,
    partial_reason: &str,
    points: &mut u32,
    reasons: &mut Vec<String>,
) {
    if ratio >= HEAVY_MISSING {
        *points += 2;
        reasons.push(heavy_reason.to_string());
    } else if ratio > PARTIAL_MISSING {
        *points += 1;
        reasons.push(partial_reason.to_string());
    }
}
