use chrono::{DateTime, TimeDelta, Utc};

use crate::convert::distance::meters_per_sec;
use crate::convert::types::{DeviceHeader, RideSummary, Sample};

const TCX_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";
const EXT_NS: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";

pub fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Render the finished TCX document. The schema places the lap summary ahead
/// of the track it summarizes, so the whole ride must already be corrected
/// and aggregated before the first byte is emitted.
pub fn render_tcx(device: &DeviceHeader, samples: &[Sample], summary: &RideSummary) -> Vec<u8> {
    let mut doc = String::with_capacity(1024 + samples.len() * 320);

    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str(&format!(
        "<TrainingCenterDatabase xmlns=\"{TCX_NS}\" xmlns:xsi=\"{XSI_NS}\" \
         xsi:schemaLocation=\"{TCX_NS} {XSD_LOCATION}\">"
    ));
    doc.push_str("<Activities>");
    doc.push_str("<Activity Sport=\"Biking\">");
    doc.push_str(&format!("<Id>{}</Id>", iso_timestamp(summary.start_time)));
    push_lap(&mut doc, samples, summary);
    push_creator(&mut doc, device);
    doc.push_str("</Activity>");
    doc.push_str("</Activities>");
    push_author(&mut doc);
    doc.push_str("</TrainingCenterDatabase>");

    doc.into_bytes()
}

fn push_lap(doc: &mut String, samples: &[Sample], summary: &RideSummary) {
    doc.push_str(&format!(
        "<Lap StartTime=\"{}\">",
        iso_timestamp(summary.start_time)
    ));
    doc.push_str(&format!(
        "<TotalTimeSeconds>{}</TotalTimeSeconds>",
        summary.total_time_secs
    ));
    doc.push_str(&format!(
        "<DistanceMeters>{}</DistanceMeters>",
        summary.distance_meters
    ));
    doc.push_str(&format!("<MaximumSpeed>{}</MaximumSpeed>", summary.max_speed_ms));
    doc.push_str(&format!("<Calories>{}</Calories>", summary.calories));
    doc.push_str(&format!(
        "<AverageHeartRateBpm><Value>{}</Value></AverageHeartRateBpm>",
        summary.avg_heart_bpm
    ));
    doc.push_str(&format!(
        "<MaximumHeartRateBpm><Value>{}</Value></MaximumHeartRateBpm>",
        summary.max_heart_bpm
    ));
    doc.push_str("<Intensity>Active</Intensity>");
    doc.push_str(&format!("<Cadence>{}</Cadence>", summary.avg_cadence_rpm));
    doc.push_str("<TriggerMethod>Manual</TriggerMethod>");

    doc.push_str("<Track>");
    for sample in samples {
        push_trackpoint(doc, summary.start_time, sample);
    }
    doc.push_str("</Track>");

    doc.push_str("<Extensions>");
    push_lap_extension(doc, "MaxBikeCadence", &summary.max_cadence_rpm.to_string());
    push_lap_extension(doc, "AvgSpeed", &summary.avg_speed_ms.to_string());
    push_lap_extension(doc, "AvgWatts", &summary.avg_watts.to_string());
    push_lap_extension(doc, "MaxWatts", &summary.max_watts.to_string());
    doc.push_str("</Extensions>");

    doc.push_str("</Lap>");
}

fn push_trackpoint(doc: &mut String, start: DateTime<Utc>, sample: &Sample) {
    let time = start + TimeDelta::seconds(i64::from(sample.offset_secs));

    doc.push_str("<Trackpoint>");
    doc.push_str(&format!("<Time>{}</Time>", iso_timestamp(time)));
    doc.push_str(&format!(
        "<DistanceMeters>{}</DistanceMeters>",
        sample.distance_km * 1000.0
    ));
    doc.push_str(&format!(
        "<HeartRateBpm><Value>{}</Value></HeartRateBpm>",
        sample.heart_rate_bpm
    ));
    doc.push_str(&format!("<Cadence>{}</Cadence>", sample.cadence_rpm));
    doc.push_str(&format!(
        "<Extensions><TPX xmlns=\"{EXT_NS}\"><Speed>{}</Speed><Watts>{}</Watts></TPX></Extensions>",
        meters_per_sec(sample.speed_kmh),
        sample.power_watts
    ));
    doc.push_str("</Trackpoint>");
}

fn push_lap_extension(doc: &mut String, tag: &str, value: &str) {
    doc.push_str(&format!(
        "<LX xmlns=\"{EXT_NS}\"><{tag}>{value}</{tag}></LX>"
    ));
}

fn push_creator(doc: &mut String, device: &DeviceHeader) {
    // Firmware "63" becomes version 63.0, "0.31" becomes 0.31.
    let (major, minor) = device
        .firmware
        .split_once('.')
        .unwrap_or((device.firmware.as_str(), "0"));

    doc.push_str("<Creator xsi:type=\"Device_t\">");
    doc.push_str(&format!("<Name>{}</Name>", device.name));
    doc.push_str("<UnitId>0</UnitId>");
    doc.push_str(&format!("<ProductID>{}</ProductID>", device.product_id));
    doc.push_str(&format!(
        "<Version><VersionMajor>{major}</VersionMajor><VersionMinor>{minor}</VersionMinor>\
         <BuildMajor>0</BuildMajor><BuildMinor>0</BuildMinor></Version>"
    ));
    doc.push_str("</Creator>");
}

fn push_author(doc: &mut String) {
    doc.push_str("<Author xsi:type=\"Application_t\">");
    doc.push_str("<Name>Revolution CSV to TCX Convertor</Name>");
    doc.push_str(
        "<Build><Version><VersionMajor>1</VersionMajor><VersionMinor>0</VersionMinor>\
         <BuildMajor>0</BuildMajor><BuildMinor>0</BuildMinor></Version></Build>",
    );
    doc.push_str("<LangID>en</LangID>");
    doc.push_str("<PartNumber>none</PartNumber>");
    doc.push_str("</Author>");
}
