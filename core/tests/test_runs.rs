use chrono::{Duration, TimeZone, Utc};

use matchgraph_core::geo::build_segments;
use matchgraph_core::runs::{count_accel_decel, detect_high_intensity_runs, totals};
use matchgraph_core::{extract, RunType, Sample, SmoothingStrategy, ThresholdProfile};

const DEG_PER_M: f64 = 1.0 / 111_194.926_644_558_73;

/// Spillerprofil for testene: sprint ≥ 7.0 m/s, høyintensitet ≥ 5.5 m/s.
fn profile() -> ThresholdProfile {
    ThresholdProfile {
        max_speed_ms: 10.0,
        sprint_pct: 70.0,
        high_intensity_pct: 55.0,
        accel_threshold_ms2: 2.5,
        decel_threshold_ms2: -2.5,
        max_heart_rate_bpm: 200.0,
        version: 1,
        updated_utc: None,
    }
}

/// Nordover i 1 Hz med gitt segmentfart; n farter gir n+1 punkter.
fn walk_north(segment_speeds_ms: &[f64]) -> Vec<Sample> {
    let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let mut lat = 59.0;
    let mut out = vec![Sample {
        time_utc: Some(t0),
        latitude: Some(lat),
        longitude: Some(10.0),
        heart_rate_bpm: Some(150),
        distance_m: None,
    }];
    for (i, v) in segment_speeds_ms.iter().enumerate() {
        lat += v * DEG_PER_M;
        out.push(Sample {
            time_utc: Some(t0 + Duration::seconds(i as i64 + 1)),
            latitude: Some(lat),
            longitude: Some(10.0),
            heart_rate_bpm: Some(150),
            distance_m: None,
        });
    }
    out
}

#[test]
fn two_runs_with_one_nested_sprint_phase() {
    let samples = walk_north(&[7.4, 3.0, 7.5, 7.6, 3.0, 3.0, 6.0, 6.1, 3.0, 3.0]);
    let thresholds = profile().resolve();
    let segments = build_segments(&samples);

    let runs = detect_high_intensity_runs(
        &segments,
        thresholds.high_intensity_speed_ms,
        thresholds.sprint_speed_ms,
    );

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].sprint_phases.len(), 1, "sprint nestet i første drag");
    assert!(runs[1].sprint_phases.is_empty());
    assert_eq!(runs[0].run_type, RunType::HighIntensity);
    assert_eq!(runs[0].sprint_phases[0].run_type, RunType::Sprint);
    assert_eq!(
        runs[0].sprint_phases[0].parent_run_id,
        Some(runs[0].run_id)
    );
    assert_eq!(runs[0].parent_run_id, None);

    // sprinttallene kommer fra fasene, aldri fra en flat telling
    let t = totals(&runs);
    assert_eq!(t.sprint_count, 1);
    assert!((t.sprint_distance_m - runs[0].sprint_phases[0].distance_m).abs() < 1e-9);
    assert_eq!(t.high_intensity_run_count, 2);
}

#[test]
fn single_gap_inside_run_is_survived_duration_seven_seconds() {
    let samples = walk_north(&[6.0, 6.1, 6.2, 3.0, 7.5, 6.0, 7.4, 3.0, 3.0]);
    let thresholds = profile().resolve();
    let segments = build_segments(&samples);

    let runs = detect_high_intensity_runs(
        &segments,
        thresholds.high_intensity_speed_ms,
        thresholds.sprint_speed_ms,
    );

    assert_eq!(runs.len(), 1, "hullet på ett segment skal overleves");
    assert!((runs[0].duration_s - 7.0).abs() < 1e-9);
    assert!(runs[0].sprint_phases.is_empty(), "7.5/7.4 er aldri to på rad");
}

#[test]
fn isolated_spike_yields_no_runs() {
    let samples = walk_north(&[3.0, 6.0, 3.0, 3.0]);
    let thresholds = profile().resolve();
    let segments = build_segments(&samples);

    let runs = detect_high_intensity_runs(
        &segments,
        thresholds.high_intensity_speed_ms,
        thresholds.sprint_speed_ms,
    );
    assert!(runs.is_empty());

    let t = totals(&runs);
    assert_eq!(t.high_intensity_time_s, 0.0);
    assert_eq!(t.high_speed_distance_m, 0.0);
}

#[test]
fn sprint_phases_are_nested_in_parent_time_and_indices() {
    let samples = walk_north(&[7.4, 3.0, 7.5, 7.6, 3.0, 3.0, 6.0, 6.1, 3.0, 3.0]);
    let thresholds = profile().resolve();
    let segments = build_segments(&samples);

    let runs = detect_high_intensity_runs(
        &segments,
        thresholds.high_intensity_speed_ms,
        thresholds.sprint_speed_ms,
    );

    for run in &runs {
        let run_end = run.start_elapsed_s + run.duration_s;
        let mut phase_distance = 0.0;
        for phase in &run.sprint_phases {
            assert!(phase.start_elapsed_s >= run.start_elapsed_s);
            assert!(phase.start_elapsed_s + phase.duration_s <= run_end + 1e-9);
            for idx in &phase.point_indices {
                assert!(run.point_indices.contains(idx));
            }
            phase_distance += phase.distance_m;
        }
        assert!(phase_distance <= run.distance_m + 1e-9);
    }
}

#[test]
fn runs_flow_through_extract() {
    let samples = walk_north(&[7.4, 3.0, 7.5, 7.6, 3.0, 3.0, 6.0, 6.1, 3.0, 3.0]);
    let summary = extract(&samples, SmoothingStrategy::Raw, &profile());

    assert_eq!(summary.runs.len(), 2);
    assert_eq!(summary.metrics.sprint_count, Some(1));
    assert_eq!(summary.metrics.high_intensity_run_count, Some(2));

    let expected_sprint_distance = summary.runs[0]
        .sprint_phases
        .iter()
        .map(|p| p.distance_m)
        .sum::<f64>();
    let got = summary.metrics.sprint_distance_m.unwrap();
    assert!((got - expected_sprint_distance).abs() < 1e-9);
}

#[test]
fn acceleration_and_deceleration_events_are_counted_once() {
    // rampe opp (3 m/s² to ganger på rad), platå, rampe ned
    let samples = walk_north(&[2.0, 5.0, 8.0, 8.0, 8.0, 5.0, 2.0, 2.0, 2.0]);
    let segments = build_segments(&samples);

    let counts = count_accel_decel(&segments, 2.5, -2.5);
    assert_eq!(counts.accelerations, 1);
    assert_eq!(counts.decelerations, 1);
}

#[test]
fn too_few_segments_never_panic() {
    let thresholds = profile().resolve();
    for speeds in [&[][..], &[6.0][..]] {
        let samples = walk_north(speeds);
        let segments = build_segments(&samples);
        assert!(detect_high_intensity_runs(
            &segments,
            thresholds.high_intensity_speed_ms,
            thresholds.sprint_speed_ms,
        )
        .is_empty());
        assert_eq!(count_accel_decel(&segments, 2.5, -2.5).accelerations, 0);
    }
}
