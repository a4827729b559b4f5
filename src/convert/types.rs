use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Local, Utc};

/// One second of Power Pilot telemetry.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Clock value of the TIME column, as seconds since midnight. Added to
    /// the header start time when emitting absolute timestamps.
    pub offset_secs: u32,
    pub speed_kmh: f64,
    /// Cumulative ride distance. The logged value is quantized to 0.1 km and
    /// is replaced by [`crate::convert::distance::correct_distances`].
    pub distance_km: f64,
    pub power_watts: u32,
    pub heart_rate_bpm: u32,
    pub cadence_rpm: u32,
    /// Cumulative calories burned up to this sample.
    pub calories: u32,
    pub torque: i32,
    /// Training-target column, carried through but never emitted.
    pub target: String,
}

/// Environmental calibration block from the Revolution device header.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    pub altitude: i64,
    pub temperature_c: i64,
    pub humidity_pct: i64,
    pub tire_size_mm: i64,
    pub calibration_factor: i64,
}

/// Validated identity and start time from the first header row.
#[derive(Debug, Clone)]
pub struct DeviceHeader {
    pub name: String,
    pub product_id: String,
    /// Firmware as logged: `"63"` for the Revolution, `"0.31"` for the GT.
    pub firmware: String,
    pub start_time: DateTime<Utc>,
    /// Only the Revolution layout carries the environment fields.
    pub environment: Option<Environment>,
}

/// Ambient inputs the log format leaves implicit. The Revolution header has
/// no year field and neither variant records a UTC offset or DST flag, so
/// the host has to decide both. Keeping them as explicit inputs lets tests
/// pin a fixed year and offset.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Year assumed for the Revolution header's month/day start date. Rides
    /// logged across New Year come out a year off; the format gives us
    /// nothing better.
    pub reference_year: i32,
    /// Offset the logged wall-clock times are interpreted in.
    pub utc_offset: FixedOffset,
}

impl ConvertOptions {
    /// Options matching the machine running the conversion, which is what
    /// the Power Pilot's own clock is most likely set to.
    pub fn from_local_clock() -> Self {
        let now = Local::now();
        Self {
            reference_year: now.year(),
            utc_offset: *now.offset(),
        }
    }
}

/// Lap-level metrics derived from the full corrected sample sequence.
#[derive(Debug, Clone, Copy)]
pub struct RideSummary {
    pub start_time: DateTime<Utc>,
    pub total_time_secs: u32,
    pub distance_meters: f64,
    pub calories: u32,
    pub avg_speed_ms: f64,
    pub max_speed_ms: f64,
    pub avg_heart_bpm: u32,
    pub max_heart_bpm: u32,
    pub avg_cadence_rpm: u32,
    pub max_cadence_rpm: u32,
    pub avg_watts: u32,
    pub max_watts: u32,
    pub sample_count: usize,
}

/// Converted workout returned to the web handler.
#[derive(Debug, Clone)]
pub struct ConvertedRide {
    pub device: DeviceHeader,
    /// Samples in file order, distances already corrected.
    pub samples: Vec<Sample>,
    pub summary: RideSummary,
    /// The rendered TCX document, ready to download.
    pub tcx_bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum ConvertError {
    /// Structural violation: wrong row/column counts, header content or tag
    /// mismatch, unsupported firmware or device identity.
    Format(String),
    /// A field that cannot be converted to its expected type. `row` is the
    /// 1-based position in the file.
    Parse { row: usize, message: String },
    /// No data rows followed the two header rows.
    EmptyWorkout,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Format(msg) => write!(f, "invalid workout file: {msg}"),
            ConvertError::Parse { row, message } => write!(f, "row {row}: {message}"),
            ConvertError::EmptyWorkout => write!(f, "workout file contains no data rows"),
        }
    }
}

impl std::error::Error for ConvertError {}
