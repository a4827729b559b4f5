use crate::convert::distance::meters_per_sec;
use crate::convert::types::{DeviceHeader, RideSummary, Sample};

/// Running sums and maxima over the sample sequence, threaded through one
/// forward pass as a fold accumulator. Averages are derived only at the end
/// of the pass; `count` must be non-zero by then, which the pipeline
/// guarantees by rejecting empty workouts first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    pub count: u32,
    pub speed_sum_kmh: f64,
    pub heart_sum: u64,
    pub cadence_sum: u64,
    pub watts_sum: u64,
    pub max_speed_kmh: f64,
    pub max_heart_bpm: u32,
    pub max_cadence_rpm: u32,
    pub max_watts: u32,
}

impl RunningStats {
    pub fn observe(mut self, sample: &Sample) -> Self {
        self.count += 1;
        self.speed_sum_kmh += sample.speed_kmh;
        self.heart_sum += u64::from(sample.heart_rate_bpm);
        self.cadence_sum += u64::from(sample.cadence_rpm);
        self.watts_sum += u64::from(sample.power_watts);
        self.max_speed_kmh = self.max_speed_kmh.max(sample.speed_kmh);
        self.max_heart_bpm = self.max_heart_bpm.max(sample.heart_rate_bpm);
        self.max_cadence_rpm = self.max_cadence_rpm.max(sample.cadence_rpm);
        self.max_watts = self.max_watts.max(sample.power_watts);
        self
    }

    pub fn avg_speed_kmh(&self) -> f64 {
        self.speed_sum_kmh / f64::from(self.count)
    }

    // Integer averages truncate, matching the integer element types the
    // document schema uses for these fields.
    pub fn avg_heart_bpm(&self) -> u32 {
        (self.heart_sum / u64::from(self.count)) as u32
    }

    pub fn avg_cadence_rpm(&self) -> u32 {
        (self.cadence_sum / u64::from(self.count)) as u32
    }

    pub fn avg_watts(&self) -> u32 {
        (self.watts_sum / u64::from(self.count)) as u32
    }
}

pub fn collect_stats(samples: &[Sample]) -> RunningStats {
    samples
        .iter()
        .fold(RunningStats::default(), |stats, sample| stats.observe(sample))
}

/// Fold the finished pass into the lap-level summary. Returns `None` for an
/// empty sequence, which the pipeline maps to its empty-workout error.
pub fn derive_ride_summary(
    device: &DeviceHeader,
    samples: &[Sample],
    stats: &RunningStats,
) -> Option<RideSummary> {
    let last = samples.last()?;

    Some(RideSummary {
        start_time: device.start_time,
        total_time_secs: last.offset_secs,
        distance_meters: last.distance_km * 1000.0,
        calories: last.calories,
        avg_speed_ms: meters_per_sec(stats.avg_speed_kmh()),
        max_speed_ms: meters_per_sec(stats.max_speed_kmh),
        avg_heart_bpm: stats.avg_heart_bpm(),
        max_heart_bpm: stats.max_heart_bpm,
        avg_cadence_rpm: stats.avg_cadence_rpm(),
        max_cadence_rpm: stats.max_cadence_rpm,
        avg_watts: stats.avg_watts(),
        max_watts: stats.max_watts,
        sample_count: samples.len(),
    })
}
