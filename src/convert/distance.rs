use crate::convert::types::Sample;

pub fn meters_per_sec(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

/// The Power Pilot logs cumulative distance to one decimal of a kilometer,
/// so long runs of consecutive samples repeat the same value while the rider
/// keeps moving. Platforms that derive speed from distance deltas then see
/// phantom stops. Rebuild the series by integrating the reported speed
/// instead, one sample per second; the result is non-decreasing because
/// speed is never negative.
pub fn correct_distances(samples: &mut [Sample]) {
    let mut total_meters = 0.0;
    for sample in samples.iter_mut() {
        total_meters += meters_per_sec(sample.speed_kmh);
        sample.distance_km = total_meters / 1000.0;
    }
}
