use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::StringRecord;

use crate::convert::types::{ConvertError, ConvertOptions, DeviceHeader, Environment};

pub const REVOLUTION_DEVICE_COLUMNS: usize = 11;
pub const REVOLUTION_GT_DEVICE_COLUMNS: usize = 9;

/// Firmware builds known to write the column layouts handled here. Anything
/// else may log a different schema, so the conversion refuses it outright.
pub const SUPPORTED_REVOLUTION_FIRMWARE: &[i64] = &[63];
pub const SUPPORTED_REVOLUTION_GT_FIRMWARE: &[&str] = &["0.31"];

const REVOLUTION_POINT_COLUMNS: &[&str] = &[
    "TIME", "SPEED", "DIST", "POWER", "HEART RATE", "CADENCE", "CALORIES", "TORQUE", "TARGET",
];
const REVOLUTION_GT_POINT_COLUMNS: &[&str] = &[
    "secs", "SPEED", "DIST", "POWER", "heart", "cadence", "CALORIES", "TORQUE", "target",
];

/// The two firmware families write different device-header layouts. The
/// variant is chosen once from the first row and drives all header parsing;
/// the point pipeline downstream is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceVariant {
    Revolution,
    RevolutionGt,
}

impl DeviceVariant {
    /// Tell the layouts apart by the device-header column count.
    pub fn detect(row: &StringRecord) -> Result<Self, ConvertError> {
        match row.len() {
            REVOLUTION_DEVICE_COLUMNS => Ok(Self::Revolution),
            REVOLUTION_GT_DEVICE_COLUMNS => Ok(Self::RevolutionGt),
            other => Err(ConvertError::Format(format!(
                "device header has {other} columns, expected {REVOLUTION_DEVICE_COLUMNS} \
                 (Revolution) or {REVOLUTION_GT_DEVICE_COLUMNS} (Revolution GT)"
            ))),
        }
    }

    pub fn expected_point_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Revolution => REVOLUTION_POINT_COLUMNS,
            Self::RevolutionGt => REVOLUTION_GT_POINT_COLUMNS,
        }
    }

    pub fn parse_device_header(
        &self,
        row: &StringRecord,
        options: &ConvertOptions,
    ) -> Result<DeviceHeader, ConvertError> {
        match self {
            Self::Revolution => parse_revolution_header(row, options),
            Self::RevolutionGt => parse_revolution_gt_header(row, options),
        }
    }

    /// Point decoding assumes field positions, so the second row must match
    /// the expected names exactly and in order.
    pub fn check_point_header(&self, row: &StringRecord) -> Result<(), ConvertError> {
        let expected = self.expected_point_columns();
        let actual: Vec<&str> = row.iter().collect();
        if actual != expected {
            return Err(ConvertError::Format(format!(
                "unexpected point header {actual:?}, expected {expected:?}"
            )));
        }
        Ok(())
    }
}

fn parse_revolution_header(
    row: &StringRecord,
    options: &ConvertOptions,
) -> Result<DeviceHeader, ConvertError> {
    if row.len() != REVOLUTION_DEVICE_COLUMNS {
        return Err(ConvertError::Format(format!(
            "device header has {} columns, expected {REVOLUTION_DEVICE_COLUMNS}",
            row.len()
        )));
    }

    let make = field(row, 0).trim();
    let model = field(row, 1).trim();
    if (make, model) != ("LeMond", "Revolution") {
        return Err(ConvertError::Format(format!(
            "device identity {make:?} {model:?} does not match the expected \"LeMond\" \"Revolution\""
        )));
    }

    let firmware = tagged_int(field(row, 2), "FW")?;
    if !SUPPORTED_REVOLUTION_FIRMWARE.contains(&firmware) {
        return Err(ConvertError::Format(format!(
            "Power Pilot firmware {firmware} is not supported, supported versions: \
             {SUPPORTED_REVOLUTION_FIRMWARE:?}"
        )));
    }
    let hardware = tagged_int(field(row, 3), "HW")?;

    let start_time = parse_revolution_start(field(row, 4), field(row, 5), options)?;

    let environment = Environment {
        altitude: tagged_int(field(row, 6), "Alt")?,
        temperature_c: tagged_int(field(row, 7), "Temp")?,
        humidity_pct: tagged_int(field(row, 8), "Hum")?,
        tire_size_mm: tagged_int(field(row, 9), "Tire")?,
        calibration_factor: tagged_int(field(row, 10), "CF")?,
    };

    Ok(DeviceHeader {
        name: format!("{make} {model}"),
        product_id: hardware.to_string(),
        firmware: firmware.to_string(),
        start_time,
        environment: Some(environment),
    })
}

fn parse_revolution_gt_header(
    row: &StringRecord,
    options: &ConvertOptions,
) -> Result<DeviceHeader, ConvertError> {
    if row.len() != REVOLUTION_GT_DEVICE_COLUMNS {
        return Err(ConvertError::Format(format!(
            "device header has {} columns, expected {REVOLUTION_GT_DEVICE_COLUMNS}",
            row.len()
        )));
    }

    let identity = field(row, 0).trim();
    if identity != "LeMond Revolution" {
        return Err(ConvertError::Format(format!(
            "device identity {identity:?} does not match the expected \"LeMond Revolution\""
        )));
    }

    let firmware = tagged_value(field(row, 1), "FW")?.to_string();
    if !SUPPORTED_REVOLUTION_GT_FIRMWARE.contains(&firmware.as_str()) {
        return Err(ConvertError::Format(format!(
            "Power Pilot firmware {firmware} is not supported, supported versions: \
             {SUPPORTED_REVOLUTION_GT_FIRMWARE:?}"
        )));
    }
    let hardware = tagged_value(field(row, 2), "HW")?.to_string();

    // Field 3 is an unidentified station tag and fields 6-8 carry nothing
    // the GT log uses; only their presence is required by the column count.
    let start_time = parse_revolution_gt_start(field(row, 4), field(row, 5), options)?;

    Ok(DeviceHeader {
        name: identity.to_string(),
        product_id: hardware,
        firmware,
        start_time,
        environment: None,
    })
}

/// The Revolution header stores only month/day. The year comes from the
/// conversion options so the New Year ambiguity stays visible to the host
/// instead of being read off the process clock here.
fn parse_revolution_start(
    date: &str,
    time: &str,
    options: &ConvertOptions,
) -> Result<DateTime<Utc>, ConvertError> {
    let stamp = format!("{}/{} {}", options.reference_year, date.trim(), time.trim());
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y/%m/%d %H:%M:%S").map_err(|_| {
        ConvertError::Format(format!(
            "start date/time {date:?} {time:?} is not m/d + HH:MM:SS"
        ))
    })?;
    to_utc(naive, options)
}

/// GT headers carry a 2-digit year and an hour:minute clock whose hour may
/// lack a leading zero ("9:15"); pad before parsing.
fn parse_revolution_gt_start(
    date: &str,
    time: &str,
    options: &ConvertOptions,
) -> Result<DateTime<Utc>, ConvertError> {
    let stamp = format!("{} {:0>5}", date.trim(), time.trim());
    let naive = NaiveDateTime::parse_from_str(&stamp, "%y%m%d %H:%M").map_err(|_| {
        ConvertError::Format(format!(
            "start date/time {date:?} {time:?} is not YYMMDD + HH:MM"
        ))
    })?;
    to_utc(naive, options)
}

fn to_utc(naive: NaiveDateTime, options: &ConvertOptions) -> Result<DateTime<Utc>, ConvertError> {
    options
        .utc_offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ConvertError::Format(format!("start time {naive} is outside the representable range"))
        })
}

/// Borrow the raw field at `index`. Callers validate the column count before
/// reaching here, so the position is always in range.
fn field(row: &StringRecord, index: usize) -> &str {
    &row[index]
}

/// Header fields carry a `"<TAG> <value>"` shape; the tag must match exactly.
fn tagged_value<'a>(raw: &'a str, tag: &str) -> Result<&'a str, ConvertError> {
    match raw.trim().split_once(' ') {
        Some((found, value)) if found == tag => Ok(value.trim()),
        Some((found, _)) => Err(ConvertError::Format(format!(
            "expected {tag} tag, got {found}"
        ))),
        None => Err(ConvertError::Format(format!(
            "expected \"{tag} <value>\", got {raw:?}"
        ))),
    }
}

fn tagged_int(raw: &str, tag: &str) -> Result<i64, ConvertError> {
    let value = tagged_value(raw, tag)?;
    value.parse().map_err(|_| {
        ConvertError::Format(format!("{tag} value {value:?} is not an integer"))
    })
}
