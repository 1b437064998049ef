use chrono::{Duration, TimeZone, Utc};

use matchgraph_core::{
    extract, extract_json, DistanceSource, ExtractError, MetricAvailability, QualityLevel,
    Sample, SmoothingStrategy, ThresholdProfile,
};

const DEG_PER_M: f64 = 1.0 / 111_194.926_644_558_73;

fn profile() -> ThresholdProfile {
    ThresholdProfile {
        max_speed_ms: 10.0,
        sprint_pct: 70.0,
        high_intensity_pct: 55.0,
        accel_threshold_ms2: 2.5,
        decel_threshold_ms2: -2.5,
        max_heart_rate_bpm: 200.0,
        version: 3,
        updated_utc: None,
    }
}

fn steady_walk(speed_ms: f64, seconds: usize) -> Vec<Sample> {
    let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    (0..=seconds)
        .map(|i| Sample {
            time_utc: Some(t0 + Duration::seconds(i as i64)),
            latitude: Some(59.0 + i as f64 * speed_ms * DEG_PER_M),
            longitude: Some(10.0),
            heart_rate_bpm: Some(150),
            distance_m: None,
        })
        .collect()
}

#[test]
fn full_session_summary() {
    let samples = steady_walk(3.0, 60);
    let summary = extract(&samples, SmoothingStrategy::AdaptiveMedian, &profile());

    assert_eq!(summary.trackpoint_count, 61);
    assert!((summary.duration_s - 60.0).abs() < 1e-9);
    assert_eq!(
        summary.start_utc,
        Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    );
    assert!(summary.has_gps);
    assert_eq!(summary.distance_source, DistanceSource::CalculatedFromGps);
    assert!((summary.distance_m.unwrap() - 180.0).abs() < 1.0);

    assert_eq!(summary.quality.level, QualityLevel::High);
    assert!(summary.metrics.is_available);
    assert_eq!(summary.hr_min_bpm, Some(150));
    assert_eq!(summary.hr_max_bpm, Some(150));

    // 3 m/s er under høyintensitetsterskelen → ingen drag
    assert!(summary.runs.is_empty());
    assert_eq!(summary.metrics.high_intensity_run_count, Some(0));

    // tetthet: 180 m på 1 min
    assert!((summary.metrics.running_density_m_per_min.unwrap() - 180.0).abs() < 1.0);
}

#[test]
fn resolved_threshold_snapshot_is_attached() {
    let summary = extract(&steady_walk(3.0, 10), SmoothingStrategy::Raw, &profile());
    let t = summary.metrics.thresholds;

    assert!((t.sprint_speed_ms - 7.0).abs() < 1e-9);
    assert!((t.high_intensity_speed_ms - 5.5).abs() < 1e-9);
    assert_eq!(t.profile_version, 3);
}

#[test]
fn threshold_profile_clamps_to_plausible_ranges() {
    let profile = ThresholdProfile {
        max_speed_ms: 50.0,         // urealistisk → klem til 12.5
        sprint_pct: 85.0,
        high_intensity_pct: 95.0,   // bryter invarianten → under sprint
        accel_threshold_ms2: 0.0,   // → minst 0.5
        decel_threshold_ms2: 3.0,   // feil fortegn → -0.5
        max_heart_rate_bpm: 190.0,
        version: 1,
        updated_utc: None,
    };
    let t = profile.resolve();

    assert_eq!(t.max_speed_ms, 12.5);
    assert!(t.high_intensity_speed_ms < t.sprint_speed_ms);
    assert_eq!(t.acceleration_ms2, 0.5);
    assert_eq!(t.deceleration_ms2, -0.5);
}

#[test]
fn empty_input_degrades_gracefully() {
    let summary = extract(&[], SmoothingStrategy::AdaptiveMedian, &profile());

    assert_eq!(summary.trackpoint_count, 0);
    assert_eq!(summary.duration_s, 0.0);
    assert_eq!(summary.start_utc, None);
    assert_eq!(summary.quality.level, QualityLevel::Low);
    assert_eq!(summary.distance_source, DistanceSource::Unavailable);
    assert!(!summary.metrics.is_available);
    assert!(summary.metrics.reason.is_some());
    assert!(summary.intervals.is_empty());
    assert!(summary.runs.is_empty());
    assert_eq!(
        summary.metrics.availability.get("distance"),
        Some(&MetricAvailability::NotMeasured)
    );
}

#[test]
fn file_declared_distance_is_fallback_without_gps() {
    let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let samples: Vec<Sample> = (0..=10)
        .map(|i| Sample {
            time_utc: Some(t0 + Duration::seconds(i)),
            latitude: None,
            longitude: None,
            heart_rate_bpm: Some(150),
            distance_m: Some(5.0),
        })
        .collect();

    let summary = extract(&samples, SmoothingStrategy::Raw, &profile());

    assert!(!summary.has_gps);
    assert_eq!(summary.distance_source, DistanceSource::FromFile);
    assert_eq!(summary.distance_m, Some(55.0));
    // GPS-metrikker er ikke målt, HR-metrikker lever fortsatt
    assert_eq!(
        summary.metrics.availability.get("max_speed"),
        Some(&MetricAvailability::NotMeasured)
    );
    assert_eq!(
        summary.metrics.availability.get("trimp"),
        Some(&MetricAvailability::Available)
    );
    assert!(summary.metrics.is_available);
}

#[test]
fn invalid_max_hr_makes_hr_metrics_not_usable() {
    let mut profile = profile();
    profile.max_heart_rate_bpm = 0.0;

    let summary = extract(&steady_walk(3.0, 30), SmoothingStrategy::Raw, &profile);
    assert_eq!(
        summary.metrics.availability.get("trimp"),
        Some(&MetricAvailability::NotUsable)
    );
    assert_eq!(summary.metrics.trimp, None);
}

#[test]
fn extract_json_round_trip_with_fail_soft_strategy() {
    let samples_json = serde_json::to_string(&steady_walk(3.0, 20)).unwrap();
    let profile_json = serde_json::to_string(&profile()).unwrap();

    // ukjent strateginøkkel normaliseres til default
    let out = extract_json(&samples_json, &profile_json, Some("bogus")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["smoothing"]["strategy"], "adaptive_median");
    assert_eq!(value["trackpoint_count"], 21);
    assert!(value["metrics"]["is_available"].as_bool().unwrap());

    let raw = extract_json(&samples_json, &profile_json, Some("raw")).unwrap();
    let raw_value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(raw_value["smoothing"]["strategy"], "raw");
}

#[test]
fn extract_json_rejects_malformed_input() {
    let profile_json = serde_json::to_string(&profile()).unwrap();

    let err = extract_json("not json", &profile_json, None).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidSamples(_)));

    let err = extract_json("[]", "not json", None).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidProfile(_)));
}

#[test]
fn smoothing_trace_reports_raw_and_smoothed_distance() {
    let samples = steady_walk(3.0, 30);
    let summary = extract(&samples, SmoothingStrategy::Raw, &profile());

    assert!((summary.smoothing.raw_distance_m - summary.smoothing.smoothed_distance_m).abs() < 1e-9);
    assert_eq!(summary.smoothing.corrected_outliers, 0);
    assert!(summary.smoothing.outlier_speed_ms >= 6.0);
    assert!(summary.smoothing.outlier_speed_ms <= 12.5);
}
