use chrono::{DateTime, Duration, Utc};

use crate::geo;
use crate::models::Sample;

/// Sonegrenser som andel av maks-HR: Low < 70 %, Medium 70–85 %, High > 85 %.
const ZONE_LOW_BELOW: f64 = 0.70;
const ZONE_MEDIUM_TO: f64 = 0.85;

/// Edwards-TRIMP: 10 %-brede bånd fra 50 % av maks-HR, vekter 1..5.
const TRIMP_FLOOR: f64 = 0.50;
const TRIMP_BAND_WIDTH: f64 = 0.10;

const RECOVERY_DELAY_S: i64 = 60;

/// Min/snitt/maks over alle samples med puls (tidsstempel ikke påkrevd).
#[derive(Debug, Clone, Copy)]
pub struct HrStats {
    pub min_bpm: i32,
    pub avg_bpm: f64,
    pub max_bpm: i32,
}

pub fn hr_stats(samples: &[Sample]) -> Option<HrStats> {
    let mut min = i32::MAX;
    let mut max = i32::MIN;
    let mut sum = 0.0;
    let mut count = 0usize;

    for s in samples {
        if let Some(hr) = s.heart_rate_bpm {
            min = min.min(hr);
            max = max.max(hr);
            sum += f64::from(hr);
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(HrStats {
        min_bpm: min,
        avg_bpm: sum / count as f64,
        max_bpm: max,
    })
}

/// Pulsbelastning for økten: sonetider, Edwards-TRIMP og restitusjon
/// etter toppen.
#[derive(Debug, Clone, Default)]
pub struct HrLoad {
    pub zone_low_s: f64,
    pub zone_medium_s: f64,
    pub zone_high_s: f64,
    pub trimp: f64,
    pub recovery_60s_bpm: Option<f64>,
}

/// Krever minst 2 tidsstemplede pulsmålinger og positiv maks-HR, ellers None.
/// Sonetid vektes med elapsed sekunder per nabopar, mot parets midtpuls.
pub fn analyze_heart_rate(samples: &[Sample], max_hr_bpm: f64) -> Option<HrLoad> {
    if max_hr_bpm <= 0.0 {
        return None;
    }

    let series: Vec<(DateTime<Utc>, f64)> = samples
        .iter()
        .filter_map(|s| Some((s.time_utc?, f64::from(s.heart_rate_bpm?))))
        .collect();
    if series.len() < 2 {
        return None;
    }

    let mut load = HrLoad::default();
    for pair in series.windows(2) {
        let dt = geo::secs_between(pair[0].0, pair[1].0);
        if dt <= 0.0 {
            continue;
        }

        let mid = 0.5 * (pair[0].1 + pair[1].1);
        let pct = mid / max_hr_bpm;

        if pct < ZONE_LOW_BELOW {
            load.zone_low_s += dt;
        } else if pct <= ZONE_MEDIUM_TO {
            load.zone_medium_s += dt;
        } else {
            load.zone_high_s += dt;
        }

        if pct >= TRIMP_FLOOR {
            let band = (((pct - TRIMP_FLOOR) / TRIMP_BAND_WIDTH).floor() as i64).clamp(0, 4);
            load.trimp += (dt / 60.0) * (band + 1) as f64;
        }
    }

    load.recovery_60s_bpm = recovery_after_peak(&series);
    Some(load)
}

/// Toppen (høyeste puls, tidligste ved likhet) minus første måling
/// minst 60 s senere. None hvis ingen slik måling finnes.
fn recovery_after_peak(series: &[(DateTime<Utc>, f64)]) -> Option<f64> {
    let mut peak: Option<(DateTime<Utc>, f64)> = None;
    for &(t, hr) in series {
        match peak {
            Some((_, best)) if hr <= best => {}
            _ => peak = Some((t, hr)),
        }
    }
    let (peak_t, peak_hr) = peak?;

    let target = peak_t + Duration::seconds(RECOVERY_DELAY_S);
    let (_, later_hr) = series.iter().find(|(t, _)| *t >= target)?;
    Some(peak_hr - later_hr)
}
