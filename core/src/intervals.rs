use chrono::Duration;

use crate::geo;
use crate::models::{Sample, ThresholdProfile};
use crate::summary;
use crate::types::{IntervalAggregate, QualityLevel};

/// Faste vindusstørrelser (minutter) for aggregatene.
pub const WINDOW_MINUTES: [u32; 3] = [1, 2, 5];

/// Deler opptakets tidsspenn i konsekutive, halvåpne vinduer per
/// størrelse (siste vindu trunkeres, aldri polstres) og bygger
/// CoreMetrics per vindu fra de overlappende trackpointene.
///
/// Distansen per vindu er overlappvektet: hvert segment klippes mot
/// vindusgrensene og bidrar med distanse · overlapp/elapsed. Den
/// forhåndsvektede distansen er autoritativ for vinduet; kvalitet
/// settes til High (vindusgranularitet regnes ikke om).
pub fn aggregate_intervals(
    samples: &[Sample],
    profile: &ThresholdProfile,
) -> Vec<IntervalAggregate> {
    let mut out = Vec::new();

    let timestamps: Vec<_> = samples.iter().filter_map(|s| s.time_utc).collect();
    let (Some(&start), Some(&end)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return out;
    };
    let total_s = geo::secs_between(start, end);
    if total_s <= 0.0 {
        return out;
    }

    let segments = geo::build_segments(samples);

    for &minutes in &WINDOW_MINUTES {
        let window_s = f64::from(minutes) * 60.0;
        let count = (total_s / window_s).ceil() as u32;

        for index in 0..count {
            let w_start = f64::from(index) * window_s;
            let w_end = (f64::from(index + 1) * window_s).min(total_s);
            let is_last = index + 1 == count;

            let mut distance_m = 0.0;
            for seg in &segments {
                let elapsed = seg.elapsed_s();
                if elapsed <= 0.0 {
                    continue;
                }
                let overlap = seg.end_s.min(w_end) - seg.start_s.max(w_start);
                if overlap > 0.0 {
                    distance_m += seg.distance_m * (overlap / elapsed);
                }
            }

            // trackpoints i vinduet; siste vindu tar med sluttpunktet
            let window_samples: Vec<Sample> = samples
                .iter()
                .filter(|s| match s.time_utc {
                    Some(t) => {
                        let e = geo::secs_between(start, t);
                        e >= w_start && (e < w_end || (is_last && e <= w_end))
                    }
                    None => false,
                })
                .cloned()
                .collect();

            // uten segmenter finnes ingen reell overlapp-distanse å overstyre med
            let distance_override = (!segments.is_empty()).then_some(distance_m);
            let metrics = summary::build_core_metrics(
                &window_samples,
                profile,
                QualityLevel::High,
                distance_override,
            );

            out.push(IntervalAggregate {
                window_minutes: minutes,
                window_index: index,
                window_start_utc: start + Duration::milliseconds((w_start * 1000.0) as i64),
                duration_s: w_end - w_start,
                metrics,
            });
        }
    }

    out
}
