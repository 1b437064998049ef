use chrono::{DateTime, Utc};

use crate::models::Sample;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Storsirkeldistanse (haversine) i meter.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial kompasskurs fra punkt 1 mot punkt 2, i [0, 360).
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    let mut deg = y.atan2(x).to_degrees() % 360.0;
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

/// Absolutt vinkelendring mellom inn- og utkurs, foldet til [0, 180].
pub fn turn_delta_deg(bearing_in_deg: f64, bearing_out_deg: f64) -> f64 {
    let mut delta = (bearing_out_deg - bearing_in_deg).abs() % 360.0;
    if delta > 180.0 {
        delta = 360.0 - delta;
    }
    delta
}

pub(crate) fn secs_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a).num_milliseconds() as f64 / 1000.0
}

/// Ett brukbart segment: to nabopunkter som begge har tid + posisjon og
/// positiv tidsdifferanse. Ikke-positive tidssteg gir ikke segment
/// (behandles som ubrukelige, ikke som nullfart).
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub from_idx: usize,
    pub to_idx: usize,
    /// Sekunder siden første tidsstemplede sample i sekvensen.
    pub start_s: f64,
    pub end_s: f64,
    pub distance_m: f64,
    pub speed_ms: f64,
}

impl Segment {
    pub fn elapsed_s(&self) -> f64 {
        self.end_s - self.start_s
    }
}

/// Bygger segmentlisten for en sample-sekvens. Punkter uten tid eller
/// posisjon hopper vi stille over; rekkefølgen er caller-kontrakt.
pub fn build_segments(samples: &[Sample]) -> Vec<Segment> {
    let Some(t0) = samples.iter().find_map(|s| s.time_utc) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for i in 0..samples.len().saturating_sub(1) {
        let (a, b) = (&samples[i], &samples[i + 1]);
        let (Some(ta), Some(tb)) = (a.time_utc, b.time_utc) else {
            continue;
        };
        let (Some((lat1, lon1)), Some((lat2, lon2))) = (a.position(), b.position()) else {
            continue;
        };

        let dt = secs_between(ta, tb);
        if dt <= 0.0 {
            continue;
        }

        let distance_m = haversine_m(lat1, lon1, lat2, lon2);
        out.push(Segment {
            from_idx: i,
            to_idx: i + 1,
            start_s: secs_between(t0, ta),
            end_s: secs_between(t0, tb),
            distance_m,
            speed_ms: distance_m / dt,
        });
    }
    out
}

/// Ren sporlengde: sum haversine over alle nabopar med posisjon,
/// uavhengig av tidsstempler. Brukes av smoothing-sporet (før/etter).
pub fn track_length_m(samples: &[Sample]) -> f64 {
    let mut total = 0.0;
    for pair in samples.windows(2) {
        let (Some((lat1, lon1)), Some((lat2, lon2))) =
            (pair[0].position(), pair[1].position())
        else {
            continue;
        };
        total += haversine_m(lat1, lon1, lat2, lon2);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_north_and_east() {
        let north = bearing_deg(59.0, 10.0, 59.001, 10.0);
        assert!(north < 1.0 || north > 359.0, "nord, fikk {north}");

        let east = bearing_deg(59.0, 10.0, 59.0, 10.001);
        assert!((east - 90.0).abs() < 1.0, "øst, fikk {east}");
    }

    #[test]
    fn turn_delta_folds_to_half_circle() {
        assert!((turn_delta_deg(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((turn_delta_deg(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((turn_delta_deg(90.0, 90.0)).abs() < 1e-9);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        // 1 breddegrad ≈ 111.19 km med R = 6371 km
        let d = haversine_m(59.0, 10.0, 60.0, 10.0);
        assert!((d - 111_194.9).abs() < 10.0, "fikk {d}");
    }
}
