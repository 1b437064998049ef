use chrono::Utc;
use serde_json::{json, Value};

use crate::geo;
use crate::models::{Sample, SmoothingStrategy};
use crate::stats;
use crate::types::SmoothingTrace;

/// Savitzky-Golay, kvintisk 5-punkts kjerne.
const SG_COEFFS: [f64; 5] = [-3.0, 12.0, 17.0, 12.0, -3.0];
const SG_NORM: f64 = 35.0;

/// Førsteordens lavpass.
const EXP_ALPHA: f64 = 0.35;

/// Svinger på minst dette bevares av adaptiv median (ekte retningsbrudd).
const TURN_PRESERVE_DEG: f64 = 25.0;
/// Toleransevinkel for "baseline-tolerant" retningsskifte-telling.
const TURN_BASELINE_DEG: f64 = 45.0;

const MEDIAN_WINDOW_MIN_POINTS: usize = 3;

/// Glatter sporet med valgt strategi. Utsekvensen har samme lengde og
/// rekkefølge; kun lat/lon kan endres, tid og puls passerer urørt.
/// Telleren betyr ulikt per strategi – se SmoothingTrace-dokumentasjonen.
pub fn smooth(
    strategy: SmoothingStrategy,
    samples: &[Sample],
    outlier_threshold_ms: f64,
) -> (Vec<Sample>, u32) {
    match strategy {
        SmoothingStrategy::Raw => (samples.to_vec(), 0),
        SmoothingStrategy::SavitzkyGolay => savitzky_golay(samples),
        SmoothingStrategy::Exponential => exponential(samples),
        SmoothingStrategy::AdaptiveMedian => adaptive_median(samples, outlier_threshold_ms),
    }
}

/// Glatter og bygger spor (før/etter-distanse, retningsskifter, teller).
pub fn analyze_smoothing(
    strategy: SmoothingStrategy,
    samples: &[Sample],
    outlier_threshold_ms: f64,
) -> (Vec<Sample>, SmoothingTrace) {
    let (smoothed, corrected) = smooth(strategy, samples, outlier_threshold_ms);

    let trace = SmoothingTrace {
        strategy: strategy.name().to_string(),
        params: strategy_params(strategy),
        raw_distance_m: geo::track_length_m(samples),
        smoothed_distance_m: geo::track_length_m(&smoothed),
        direction_changes_raw: count_direction_changes(samples, TURN_PRESERVE_DEG),
        direction_changes_tolerant: count_direction_changes(samples, TURN_BASELINE_DEG),
        direction_changes_smoothed: count_direction_changes(&smoothed, TURN_PRESERVE_DEG),
        corrected_outliers: corrected,
        outlier_speed_ms: outlier_threshold_ms,
        analyzed_utc: Utc::now(),
    };

    (smoothed, trace)
}

fn strategy_params(strategy: SmoothingStrategy) -> Value {
    match strategy {
        SmoothingStrategy::Raw => json!({}),
        SmoothingStrategy::SavitzkyGolay => json!({
            "window": 5,
            "coefficients": [-3, 12, 17, 12, -3],
            "normalization": 35,
        }),
        SmoothingStrategy::Exponential => json!({ "alpha": EXP_ALPHA }),
        SmoothingStrategy::AdaptiveMedian => json!({
            "turn_preserve_deg": TURN_PRESERVE_DEG,
            "window_radius": 2,
        }),
    }
}

/// Teller retningsskifter: nabotripler med posisjon der svingen mellom
/// inn- og utkurs er minst `min_turn_deg`.
pub fn count_direction_changes(samples: &[Sample], min_turn_deg: f64) -> u32 {
    let mut count = 0;
    for triple in samples.windows(3) {
        let (Some((lat0, lon0)), Some((lat1, lon1)), Some((lat2, lon2))) = (
            triple[0].position(),
            triple[1].position(),
            triple[2].position(),
        ) else {
            continue;
        };
        let b_in = geo::bearing_deg(lat0, lon0, lat1, lon1);
        let b_out = geo::bearing_deg(lat1, lon1, lat2, lon2);
        if geo::turn_delta_deg(b_in, b_out) >= min_turn_deg {
            count += 1;
        }
    }
    count
}

/// Konvolusjon over indre punkter (indeks 2..n-3) når alle 5 naboer har
/// posisjon. Kantene røres ikke. Telleren er "berørte punkter".
fn savitzky_golay(samples: &[Sample]) -> (Vec<Sample>, u32) {
    let n = samples.len();
    let mut out = samples.to_vec();
    if n < 5 {
        return (out, 0);
    }

    let mut touched = 0u32;
    for i in 2..n - 2 {
        let window: Option<Vec<(f64, f64)>> = samples[i - 2..=i + 2]
            .iter()
            .map(|s| s.position())
            .collect();
        let Some(window) = window else {
            continue;
        };

        let mut lat = 0.0;
        let mut lon = 0.0;
        for (k, (w_lat, w_lon)) in window.iter().enumerate() {
            lat += SG_COEFFS[k] * w_lat;
            lon += SG_COEFFS[k] * w_lon;
        }
        out[i].latitude = Some(lat / SG_NORM);
        out[i].longitude = Some(lon / SG_NORM);
        touched += 1;
    }

    (out, touched)
}

/// p[i] = α·p[i] + (1-α)·p[i-1], sekvensielt mot allerede glattet nabo.
/// Krever posisjon på begge punkter. Telleren er "berørte punkter".
fn exponential(samples: &[Sample]) -> (Vec<Sample>, u32) {
    let mut out = samples.to_vec();
    let mut touched = 0u32;

    for i in 1..out.len() {
        let Some((prev_lat, prev_lon)) = out[i - 1].position() else {
            continue;
        };
        let Some((lat, lon)) = samples[i].position() else {
            continue;
        };
        out[i].latitude = Some(EXP_ALPHA * lat + (1.0 - EXP_ALPHA) * prev_lat);
        out[i].longitude = Some(EXP_ALPHA * lon + (1.0 - EXP_ALPHA) * prev_lon);
        touched += 1;
    }

    (out, touched)
}

/// Svingbevarende medianfilter (default). Indre punkter med fix på seg
/// selv og begge naboer vurderes mot inn-/utkurs og fart fra forrige
/// punkt:
///   - sving ≥ 25° i plausibel fart → ekte retningsbrudd, urørt
///   - ellers per-akse median over koordinatgyldige naboer i vinduet
///     (radius 1 for bevart sving som fortsatt trenger distansekorreksjon,
///     radius 2 ellers) når minst 3 punkter finnes
/// Telleren øker kun når triggeren var en ekte fartsoutlier.
fn adaptive_median(samples: &[Sample], outlier_threshold_ms: f64) -> (Vec<Sample>, u32) {
    let n = samples.len();
    let mut out = samples.to_vec();
    if n < 3 {
        return (out, 0);
    }

    let mut corrected = 0u32;
    for i in 1..n - 1 {
        if !(out[i - 1].has_fix() && out[i].has_fix() && out[i + 1].has_fix()) {
            continue;
        }
        // has_fix garanterer at alt under finnes
        let (Some((p_lat, p_lon)), Some((c_lat, c_lon)), Some((n_lat, n_lon))) =
            (out[i - 1].position(), out[i].position(), out[i + 1].position())
        else {
            continue;
        };
        let (Some(t_prev), Some(t_cur)) = (out[i - 1].time_utc, out[i].time_utc) else {
            continue;
        };

        let dt = geo::secs_between(t_prev, t_cur);
        if dt <= 0.0 {
            continue;
        }

        let b_in = geo::bearing_deg(p_lat, p_lon, c_lat, c_lon);
        let b_out = geo::bearing_deg(c_lat, c_lon, n_lat, n_lon);
        let turn = geo::turn_delta_deg(b_in, b_out);
        let speed = geo::haversine_m(p_lat, p_lon, c_lat, c_lon) / dt;

        let sharp_turn = turn >= TURN_PRESERVE_DEG;
        let is_outlier = speed > outlier_threshold_ms;

        if sharp_turn && !is_outlier {
            // ekte skarp sving i plausibel fart – bevar punktet
            continue;
        }

        // smalt vindu rundt bevart sving, bredt ellers
        let radius = if sharp_turn { 1 } else { 2 };
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(n - 1);

        let mut lats = Vec::with_capacity(hi - lo + 1);
        let mut lons = Vec::with_capacity(hi - lo + 1);
        for neighbour in &out[lo..=hi] {
            if let Some((lat, lon)) = neighbour.position() {
                lats.push(lat);
                lons.push(lon);
            }
        }

        if lats.len() >= MEDIAN_WINDOW_MIN_POINTS {
            out[i].latitude = Some(stats::median(&lats));
            out[i].longitude = Some(stats::median(&lons));
            if is_outlier {
                corrected += 1;
            }
        }
    }

    (out, corrected)
}
