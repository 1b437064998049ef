use crate::geo::Segment;
use crate::types::{AccelDecelCounts, Run, RunType};

/// 2-inn/2-ut hysterese over en flaggserie: et run åpner ved to
/// kvalifiserende på rad, overlever nøyaktig ett hull, og lukker etter
/// to ikke-kvalifiserende på rad. Returnerer (første, siste)
/// kvalifiserende indeks per run. Enslige topper starter aldri et run.
pub(crate) fn hysteresis_ranges(flags: &[bool]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let n = flags.len();

    let mut open_start: Option<usize> = None;
    let mut last_hit = 0usize;
    let mut miss_streak = 0usize;

    let mut i = 0;
    while i < n {
        match open_start {
            None => {
                if flags[i] && i + 1 < n && flags[i + 1] {
                    open_start = Some(i);
                    last_hit = i + 1;
                    miss_streak = 0;
                    i += 2;
                    continue;
                }
                i += 1;
            }
            Some(_) => {
                if flags[i] {
                    last_hit = i;
                    miss_streak = 0;
                } else {
                    miss_streak += 1;
                    if miss_streak >= 2 {
                        if let Some(start) = open_start.take() {
                            out.push((start, last_hit));
                        }
                        miss_streak = 0;
                    }
                }
                i += 1;
            }
        }
    }

    if let Some(start) = open_start {
        out.push((start, last_hit));
    }
    out
}

/// Materialiserer et run fra et sammenhengende segmentområde
/// [first..=last]. Tolererte hull-segmenter inne i området teller med i
/// både varighet og distanse; tidsspenn er alltid elapsed-basert.
fn run_from_range(
    segments: &[Segment],
    first: usize,
    last: usize,
    run_type: RunType,
    run_id: u32,
    parent_run_id: Option<u32>,
) -> Run {
    let span = &segments[first..=last];
    let start_s = span[0].start_s;
    let end_s = span[span.len() - 1].end_s;

    let mut point_indices = Vec::with_capacity(span.len() + 1);
    for seg in span {
        if point_indices.last() != Some(&seg.from_idx) {
            point_indices.push(seg.from_idx);
        }
        point_indices.push(seg.to_idx);
    }

    Run {
        run_id,
        run_type,
        start_elapsed_s: start_s,
        duration_s: end_s - start_s,
        distance_m: span.iter().map(|s| s.distance_m).sum(),
        point_indices,
        sprint_phases: Vec::new(),
        parent_run_id,
    }
}

/// Detekterer høyintensitetsdrag og nester sprintfaser i dem: samme
/// hysterese kjøres på nytt med sprintterskelen, begrenset til
/// foreldredragets segmentområde. Sprintfaser er derfor alltid
/// inneholdt i forelderen, både i tid og punktindekser.
pub fn detect_high_intensity_runs(
    segments: &[Segment],
    high_intensity_speed_ms: f64,
    sprint_speed_ms: f64,
) -> Vec<Run> {
    if segments.len() < 2 {
        return Vec::new();
    }

    let flags: Vec<bool> = segments
        .iter()
        .map(|s| s.speed_ms >= high_intensity_speed_ms)
        .collect();

    let mut runs = Vec::new();
    let mut next_id = 1u32;

    for (first, last) in hysteresis_ranges(&flags) {
        let mut run = run_from_range(
            segments,
            first,
            last,
            RunType::HighIntensity,
            next_id,
            None,
        );
        next_id += 1;

        let sprint_flags: Vec<bool> = segments[first..=last]
            .iter()
            .map(|s| s.speed_ms >= sprint_speed_ms)
            .collect();
        for (s_first, s_last) in hysteresis_ranges(&sprint_flags) {
            run.sprint_phases.push(run_from_range(
                segments,
                first + s_first,
                first + s_last,
                RunType::Sprint,
                next_id,
                Some(run.run_id),
            ));
            next_id += 1;
        }

        runs.push(run);
    }

    runs
}

/// Summerte tall fra draglisten. DetectedRuns er eneste kilde – både
/// sprinttallene og høyintensitetstid/-distanse leses herfra, aldri fra
/// en flat terskel-telling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub high_intensity_run_count: u32,
    pub high_intensity_time_s: f64,
    pub high_speed_distance_m: f64,
    pub sprint_count: u32,
    pub sprint_distance_m: f64,
}

pub fn totals(runs: &[Run]) -> RunTotals {
    let mut t = RunTotals {
        high_intensity_run_count: runs.len() as u32,
        ..RunTotals::default()
    };
    for run in runs {
        t.high_intensity_time_s += run.duration_s;
        t.high_speed_distance_m += run.distance_m;
        t.sprint_count += run.sprint_phases.len() as u32;
        t.sprint_distance_m += run.sprint_phases.iter().map(|p| p.distance_m).sum::<f64>();
    }
    t
}

/// Akselerasjons-/retardasjonsevents: derivert akselerasjon mellom
/// nabo-segmenter som deler punkt, samme hysterese som for drag.
/// Tellingen er antall events, ikke antall samples.
pub fn count_accel_decel(
    segments: &[Segment],
    accel_threshold_ms2: f64,
    decel_threshold_ms2: f64,
) -> AccelDecelCounts {
    if segments.len() < 2 {
        return AccelDecelCounts::default();
    }

    let mut accel_flags = Vec::with_capacity(segments.len() - 1);
    let mut decel_flags = Vec::with_capacity(segments.len() - 1);

    for pair in segments.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let dt = b.end_s - a.end_s;
        // hull i sporet eller ikke-positivt tidssteg bryter eventet
        if a.to_idx != b.from_idx || dt <= 0.0 {
            accel_flags.push(false);
            decel_flags.push(false);
            continue;
        }
        let acc = (b.speed_ms - a.speed_ms) / dt;
        accel_flags.push(acc >= accel_threshold_ms2);
        decel_flags.push(acc <= decel_threshold_ms2);
    }

    AccelDecelCounts {
        accelerations: hysteresis_ranges(&accel_flags).len() as u32,
        decelerations: hysteresis_ranges(&decel_flags).len() as u32,
    }
}
