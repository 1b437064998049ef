use std::collections::BTreeMap;

use crate::geo;
use crate::heart_rate;
use crate::intervals;
use crate::models::{Sample, SmoothingStrategy, ThresholdProfile};
use crate::quality;
use crate::runs;
use crate::smoothing;
use crate::stats;
use crate::types::{
    ActivitySummary, CoreMetrics, DistanceSource, MetricAvailability, QualityLevel, Run,
};

// GPS- og HR-avhengige nøkler i availability-kartet.
const GPS_METRICS: [&str; 10] = [
    "distance",
    "sprint_distance",
    "sprint_count",
    "max_speed",
    "high_intensity_time",
    "high_intensity_run_count",
    "high_speed_distance",
    "running_density",
    "acceleration_count",
    "deceleration_count",
];
const HR_METRICS: [&str; 3] = ["hr_zones", "trimp", "hr_recovery_60s"];

/// Kjerneinngangen: rå samples + strategi + terskelprofil inn,
/// immutable ActivitySummary ut. Ren og synkron; feiler aldri på
/// numeriske kanttilfeller – tomt opptak gir et Low/NotMeasured-resultat.
pub fn extract(
    samples: &[Sample],
    strategy: SmoothingStrategy,
    profile: &ThresholdProfile,
) -> ActivitySummary {
    let outlier_threshold = stats::outlier_speed_threshold(samples);
    log::debug!(
        "extract: {} samples, strategi {}, outlier-terskel {:.2} m/s",
        samples.len(),
        strategy.name(),
        outlier_threshold
    );

    let (smoothed, trace) = smoothing::analyze_smoothing(strategy, samples, outlier_threshold);
    let quality = quality::assess_quality(&smoothed, outlier_threshold);

    let (metrics, detected_runs) =
        build_metrics_and_runs(&smoothed, profile, quality.level, None);
    let intervals = intervals::aggregate_intervals(&smoothed, profile);

    log::debug!(
        "extract: kvalitet {:?}, {} drag, {} vindu-aggregater",
        quality.level,
        detected_runs.len(),
        intervals.len()
    );

    // header-felter
    let timestamps: Vec<_> = smoothed.iter().filter_map(|s| s.time_utc).collect();
    let start_utc = timestamps.iter().min().copied();
    let duration_s = match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(&a), Some(&b)) => geo::secs_between(a, b),
        _ => 0.0,
    };

    let hr = heart_rate::hr_stats(&smoothed);
    let has_gps = smoothed.iter().any(|s| s.has_position());

    // GPS-distanse først, fil-deklarert distanse som fallback
    let file_distance: Option<f64> = {
        let declared: Vec<f64> = smoothed.iter().filter_map(|s| s.distance_m).collect();
        if declared.is_empty() {
            None
        } else {
            Some(declared.iter().sum())
        }
    };
    let (distance_m, distance_source) = match (metrics.distance_m, file_distance) {
        (Some(d), _) => (Some(d), DistanceSource::CalculatedFromGps),
        (None, Some(d)) => (Some(d), DistanceSource::FromFile),
        (None, None) => (None, DistanceSource::Unavailable),
    };

    ActivitySummary {
        start_utc,
        duration_s,
        trackpoint_count: smoothed.len(),
        hr_min_bpm: hr.map(|h| h.min_bpm),
        hr_avg_bpm: hr.map(|h| h.avg_bpm),
        hr_max_bpm: hr.map(|h| h.max_bpm),
        distance_m,
        distance_source,
        has_gps,
        quality,
        smoothing: trace,
        metrics,
        intervals,
        runs: detected_runs,
    }
}

/// Metrikkbygger uten draglisten – brukes av vindu-aggregatoren.
pub(crate) fn build_core_metrics(
    samples: &[Sample],
    profile: &ThresholdProfile,
    quality_level: QualityLevel,
    distance_override_m: Option<f64>,
) -> CoreMetrics {
    build_metrics_and_runs(samples, profile, quality_level, distance_override_m).0
}

/// Bygger CoreMetrics + draglisten for en sample-sekvens. Draglisten er
/// eneste kilde til sprint-/høyintensitetstallene. `distance_override_m`
/// (vindusvektet distanse) er autoritativ når den er satt.
pub(crate) fn build_metrics_and_runs(
    samples: &[Sample],
    profile: &ThresholdProfile,
    quality_level: QualityLevel,
    distance_override_m: Option<f64>,
) -> (CoreMetrics, Vec<Run>) {
    let thresholds = profile.resolve();
    let segments = geo::build_segments(samples);

    let has_gps = samples.iter().any(|s| s.has_position());
    let usable_gps = !segments.is_empty();
    let hr_pairs = samples
        .iter()
        .filter(|s| s.time_utc.is_some() && s.heart_rate_bpm.is_some())
        .count();
    let has_hr = hr_pairs >= 2;
    let valid_max_hr = thresholds.max_heart_rate_bpm > 0.0;

    let gps_availability = if !has_gps {
        MetricAvailability::NotMeasured
    } else if !usable_gps || quality_level == QualityLevel::Low {
        MetricAvailability::NotUsable
    } else if quality_level == QualityLevel::Medium {
        // Medium degraderer til advarsel, ikke NotUsable: tallene er
        // beregnbare og bør vises, bare med forbehold
        MetricAvailability::AvailableWithWarning
    } else {
        MetricAvailability::Available
    };
    let hr_availability = if !has_hr {
        MetricAvailability::NotMeasured
    } else if !valid_max_hr {
        MetricAvailability::NotUsable
    } else {
        MetricAvailability::Available
    };

    let mut availability = BTreeMap::new();
    for key in GPS_METRICS {
        availability.insert(key.to_string(), gps_availability);
    }
    for key in HR_METRICS {
        availability.insert(key.to_string(), hr_availability);
    }

    // fartsbaserte metrikker
    let detected_runs = if usable_gps {
        runs::detect_high_intensity_runs(
            &segments,
            thresholds.high_intensity_speed_ms,
            thresholds.sprint_speed_ms,
        )
    } else {
        Vec::new()
    };
    let totals = runs::totals(&detected_runs);
    let accel_decel = runs::count_accel_decel(
        &segments,
        thresholds.acceleration_ms2,
        thresholds.deceleration_ms2,
    );

    // vindusvektet distanse er autoritativ selv når vinduet mangler
    // trackpoints – overlappet ble regnet mot faktiske GPS-segmenter
    let distance_m = distance_override_m
        .or_else(|| usable_gps.then(|| segments.iter().map(|s| s.distance_m).sum()));
    let max_speed_ms = segments
        .iter()
        .map(|s| s.speed_ms)
        .fold(None, |best: Option<f64>, v| {
            Some(best.map_or(v, |b| b.max(v)))
        });

    let span_s = {
        let ts: Vec<_> = samples.iter().filter_map(|s| s.time_utc).collect();
        match (ts.iter().min(), ts.iter().max()) {
            (Some(&a), Some(&b)) => geo::secs_between(a, b),
            _ => 0.0,
        }
    };
    let running_density = match distance_m {
        Some(d) if span_s > 0.0 => Some(d / (span_s / 60.0)),
        _ => None,
    };

    // pulsbaserte metrikker
    let hr_load = if has_hr && valid_max_hr {
        heart_rate::analyze_heart_rate(samples, thresholds.max_heart_rate_bpm)
    } else {
        None
    };

    let is_available = availability
        .values()
        .any(|a| *a == MetricAvailability::Available);
    let reason = if is_available {
        None
    } else {
        Some("no metric was usable: GPS/heart-rate coverage or quality insufficient".to_string())
    };

    let metrics = CoreMetrics {
        is_available,
        reason,
        distance_m,
        sprint_distance_m: usable_gps.then_some(totals.sprint_distance_m),
        sprint_count: usable_gps.then_some(totals.sprint_count),
        max_speed_ms,
        high_intensity_time_s: usable_gps.then_some(totals.high_intensity_time_s),
        high_intensity_run_count: usable_gps.then_some(totals.high_intensity_run_count),
        high_speed_distance_m: usable_gps.then_some(totals.high_speed_distance_m),
        running_density_m_per_min: running_density,
        acceleration_count: usable_gps.then_some(accel_decel.accelerations),
        deceleration_count: usable_gps.then_some(accel_decel.decelerations),
        hr_zone_low_s: hr_load.as_ref().map(|l| l.zone_low_s),
        hr_zone_medium_s: hr_load.as_ref().map(|l| l.zone_medium_s),
        hr_zone_high_s: hr_load.as_ref().map(|l| l.zone_high_s),
        trimp: hr_load.as_ref().map(|l| l.trimp),
        hr_recovery_60s_bpm: hr_load.as_ref().and_then(|l| l.recovery_60s_bpm),
        availability,
        thresholds,
    };

    (metrics, detected_runs)
}
