use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use csv::StringRecord;

use crate::convert::types::{ConvertError, Sample};

pub const POINT_COLUMNS: usize = 9;

/// Decode one data row into a typed sample. `row_number` is the 1-based
/// position in the file and only feeds error messages.
pub fn decode_row(row_number: usize, row: &StringRecord) -> Result<Sample, ConvertError> {
    if row.len() != POINT_COLUMNS {
        return Err(ConvertError::Format(format!(
            "row {row_number} has {} fields, expected {POINT_COLUMNS}",
            row.len()
        )));
    }

    Ok(Sample {
        offset_secs: clock_to_secs(row_number, &row[0])?,
        speed_kmh: numeric(row_number, "SPEED", &row[1])?,
        distance_km: numeric(row_number, "DIST", &row[2])?,
        power_watts: numeric(row_number, "POWER", &row[3])?,
        heart_rate_bpm: numeric(row_number, "HEART RATE", &row[4])?,
        cadence_rpm: numeric(row_number, "CADENCE", &row[5])?,
        calories: numeric(row_number, "CALORIES", &row[6])?,
        torque: numeric(row_number, "TORQUE", &row[7])?,
        target: row[8].to_string(),
    })
}

fn clock_to_secs(row_number: usize, raw: &str) -> Result<u32, ConvertError> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S").map_err(|_| {
        ConvertError::Parse {
            row: row_number,
            message: format!("TIME value {raw:?} is not an HH:MM:SS clock time"),
        }
    })?;
    Ok(time.num_seconds_from_midnight())
}

fn numeric<T: FromStr>(row_number: usize, column: &str, raw: &str) -> Result<T, ConvertError> {
    raw.trim().parse().map_err(|_| ConvertError::Parse {
        row: row_number,
        message: format!("{column} value {raw:?} is not numeric"),
    })
}
