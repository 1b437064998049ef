use crate::geo;
use crate::models::Sample;

/// Nedre grense for outlier-terskelen (m/s).
pub const OUTLIER_SPEED_MIN_MS: f64 = 6.0;
/// Øvre grense – maks plausibel sprintfart for et menneske.
pub const OUTLIER_SPEED_MAX_MS: f64 = 12.5;

// MAD → robust sigma (normalfordelingsantagelse), 6 sigma over median.
const MAD_SCALE: f64 = 1.4826;
const MAD_SIGMAS: f64 = 6.0;

/// Robust median. Tom input gir 0 – definert, ikke feil; callers
/// sjekker tomhet der det betyr noe.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut xs = values.to_vec();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        (xs[n / 2 - 1] + xs[n / 2]) / 2.0
    }
}

/// Median absolute deviation – robust spredningsmål.
pub fn mad(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

/// Outlier-terskel for bakkefart: median + 6·1.4826·MAD over alle
/// brukbare nabopar, klemt til [6.0, 12.5] m/s. Uten brukbare par
/// faller vi til øvre grense. Samme terskel mater både smoothing og
/// kvalitetsscoring slik at de er enige om hva "usannsynlig" betyr.
pub fn outlier_speed_threshold(samples: &[Sample]) -> f64 {
    let speeds: Vec<f64> = geo::build_segments(samples)
        .iter()
        .map(|s| s.speed_ms)
        .collect();

    if speeds.is_empty() {
        return OUTLIER_SPEED_MAX_MS;
    }

    let raw = median(&speeds) + MAD_SIGMAS * MAD_SCALE * mad(&speeds);
    raw.clamp(OUTLIER_SPEED_MIN_MS, OUTLIER_SPEED_MAX_MS)
}
