pub mod distance;
pub mod header;
pub mod parse;
pub mod point;
pub mod stats;
pub mod tcx;
pub mod types;

pub use header::DeviceVariant;
pub use types::{
    ConvertError, ConvertOptions, ConvertedRide, DeviceHeader, RideSummary, Sample,
};

/// Convert a Power Pilot CSV payload into a TCX document.
///
/// The function performs five stages:
/// 1. [`parse::read_rows`] splits the payload into CSV rows.
/// 2. [`header::DeviceVariant`] picks the firmware layout from the first row
///    and validates the device and point-schema headers.
/// 3. [`point::decode_row`] turns each remaining row into a typed [`Sample`].
/// 4. [`distance::correct_distances`] rebuilds the distance series from
///    speed and [`stats::collect_stats`] accumulates the lap statistics over
///    the same buffered sequence.
/// 5. [`tcx::render_tcx`] assembles the summary-before-track document.
///
/// The document orders the lap summary ahead of the track, so the full
/// sample sequence is buffered before any output exists. Any failure aborts
/// the conversion; there is no partial output.
pub fn convert_csv_bytes(
    bytes: &[u8],
    options: &ConvertOptions,
) -> Result<ConvertedRide, ConvertError> {
    let rows = parse::read_rows(bytes)?;

    let device_row = rows
        .first()
        .ok_or_else(|| ConvertError::Format("missing device header row".into()))?;
    let variant = DeviceVariant::detect(device_row)?;
    let device = variant.parse_device_header(device_row, options)?;

    let schema_row = rows
        .get(1)
        .ok_or_else(|| ConvertError::Format("missing point header row".into()))?;
    variant.check_point_header(schema_row)?;

    let mut samples = Vec::with_capacity(rows.len().saturating_sub(2));
    for (index, row) in rows.iter().enumerate().skip(2) {
        samples.push(point::decode_row(index + 1, row)?);
    }
    if samples.is_empty() {
        return Err(ConvertError::EmptyWorkout);
    }

    distance::correct_distances(&mut samples);
    let running = stats::collect_stats(&samples);
    let summary = stats::derive_ride_summary(&device, &samples, &running)
        .ok_or(ConvertError::EmptyWorkout)?;

    let tcx_bytes = tcx::render_tcx(&device, &samples, &summary);

    Ok(ConvertedRide {
        device,
        samples,
        summary,
        tcx_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const THREE_ROW_RIDE: &str = "\
LeMond,Revolution,FW 63,HW 104,09/26,13:00:00,Alt 6,Temp 23,Hum 51,Tire 2096,CF 83
TIME,SPEED,DIST,POWER,HEART RATE,CADENCE,CALORIES,TORQUE,TARGET
00:00:01,10.0,0.0,100,95,80,1,10,0
00:00:02,20.0,0.0,150,100,85,2,12,0
00:00:03,30.0,0.0,200,105,90,3,14,0
";

    fn fixed_options() -> ConvertOptions {
        ConvertOptions {
            reference_year: 2013,
            utc_offset: FixedOffset::east_opt(0).expect("zero offset"),
        }
    }

    #[test]
    fn converts_a_short_ride_end_to_end() {
        let ride = convert_csv_bytes(THREE_ROW_RIDE.as_bytes(), &fixed_options())
            .expect("conversion should succeed");

        assert_eq!(ride.summary.sample_count, 3);
        assert_eq!(ride.summary.total_time_secs, 3);
        assert!((ride.summary.distance_meters - 16.667).abs() < 0.01);
        assert_eq!(ride.summary.max_speed_ms, 30.0 / 3.6);
        assert_eq!(ride.summary.avg_heart_bpm, 100);
        assert_eq!(ride.summary.calories, 3);

        let doc = String::from_utf8(ride.tcx_bytes).unwrap();
        assert_eq!(doc.matches("<Trackpoint>").count(), 3);
        assert!(doc.contains("<Id>2013-09-26T13:00:00.000Z</Id>"));
        assert!(doc.contains("<Time>2013-09-26T13:00:01.000Z</Time>"));
        assert!(doc.contains("<Time>2013-09-26T13:00:03.000Z</Time>"));
        assert!(doc.contains(&format!("<MaximumSpeed>{}</MaximumSpeed>", 30.0 / 3.6)));
    }

    #[test]
    fn conversion_is_deterministic() {
        let first = convert_csv_bytes(THREE_ROW_RIDE.as_bytes(), &fixed_options()).unwrap();
        let second = convert_csv_bytes(THREE_ROW_RIDE.as_bytes(), &fixed_options()).unwrap();
        assert_eq!(first.tcx_bytes, second.tcx_bytes);
    }

    #[test]
    fn headers_without_data_rows_are_rejected() {
        let input = "\
LeMond,Revolution,FW 63,HW 104,09/26,13:00:00,Alt 6,Temp 23,Hum 51,Tire 2096,CF 83
TIME,SPEED,DIST,POWER,HEART RATE,CADENCE,CALORIES,TORQUE,TARGET
";
        let err = convert_csv_bytes(input.as_bytes(), &fixed_options()).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyWorkout));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = convert_csv_bytes(b"", &fixed_options()).unwrap_err();
        assert!(matches!(err, ConvertError::Format(_)));
    }

    #[test]
    fn bad_data_row_aborts_with_its_position() {
        let input = "\
LeMond,Revolution,FW 63,HW 104,09/26,13:00:00,Alt 6,Temp 23,Hum 51,Tire 2096,CF 83
TIME,SPEED,DIST,POWER,HEART RATE,CADENCE,CALORIES,TORQUE,TARGET
00:00:01,10.0,0.0,100,95,80,1,10,0
00:00:02,fast,0.0,150,100,85,2,12,0
";
        let err = convert_csv_bytes(input.as_bytes(), &fixed_options()).unwrap_err();
        match err {
            ConvertError::Parse { row, message } => {
                assert_eq!(row, 4);
                assert!(message.contains("SPEED"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn gt_layout_converts_through_the_same_pipeline() {
        let input = "\
LeMond Revolution,FW 0.31,HW 1.0,STN 1,130926,9:15,0,0,0
secs,SPEED,DIST,POWER,heart,cadence,CALORIES,TORQUE,target
00:00:01,18.0,0.0,160,120,88,1,12,0
00:00:02,21.6,0.0,180,125,90,2,13,0
";
        let ride = convert_csv_bytes(input.as_bytes(), &fixed_options())
            .expect("GT conversion should succeed");

        assert_eq!(ride.device.firmware, "0.31");
        let doc = String::from_utf8(ride.tcx_bytes).unwrap();
        assert!(doc.contains("<Id>2013-09-26T09:15:00.000Z</Id>"));
        assert!(doc.contains("<VersionMajor>0</VersionMajor><VersionMinor>31</VersionMinor>"));
    }
}
