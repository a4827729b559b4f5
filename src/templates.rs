use crate::convert::ConvertedRide;

fn format_duration(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else {
        format!("{}m {:02}s", minutes, seconds)
    }
}

fn format_clock(total_secs: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

fn format_speed(meters_per_sec: f64) -> String {
    format!("{:.1} km/h", meters_per_sec * 3.6)
}

fn format_heart_rate(bpm: u32) -> String {
    format!("{bpm} bpm")
}

fn format_power(watts: u32) -> String {
    format!("{watts} W")
}

pub fn render_landing_page() -> String {
    include_str!("../templates/landing.html").to_string()
}

pub fn render_converted_ride(ride: &ConvertedRide, download_url: &str) -> String {
    let mut body = String::new();

    let summary = &ride.summary;

    body.push_str("<section class=\"results-card\">");
    body.push_str(&format!(
        "<div class=\"results-header\"><div><p class=\"eyebrow\">Ride Overview</p><h2>Recorded by {} (FW {})</h2></div>",
        ride.device.name, ride.device.firmware
    ));
    body.push_str(&format!(
        "<a class=\"cta\" download=\"workout.tcx\" href=\"{download_url}\">Download TCX</a>"
    ));
    body.push_str("</div>");

    body.push_str("<div class=\"summary-grid\">");
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Ride Duration</p><p class=\"value\">{}</p></div>",
        format_duration(summary.total_time_secs)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Ride Distance</p><p class=\"value\">{}</p></div>",
        format_distance(summary.distance_meters)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Calories</p><p class=\"value\">{}</p></div>",
        summary.calories
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Speed (avg)</p><p class=\"value\">{}</p></div>",
        format_speed(summary.avg_speed_ms)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Speed (max)</p><p class=\"value\">{}</p></div>",
        format_speed(summary.max_speed_ms)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Heart Rate (avg)</p><p class=\"value\">{}</p></div>",
        format_heart_rate(summary.avg_heart_bpm)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Heart Rate (max)</p><p class=\"value\">{}</p></div>",
        format_heart_rate(summary.max_heart_bpm)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Power (avg)</p><p class=\"value\">{}</p></div>",
        format_power(summary.avg_watts)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Power (max)</p><p class=\"value\">{}</p></div>",
        format_power(summary.max_watts)
    ));
    if let Some(env) = &ride.device.environment {
        body.push_str(&format!(
            "<div class=\"summary-card\"><p class=\"label\">Recorded at</p><p class=\"value\">{}&deg;C, {}% humidity</p></div>",
            env.temperature_c, env.humidity_pct
        ));
    }
    body.push_str("</div>");
    body.push_str("</section>");

    body.push_str("<section class=\"results-card\">");
    body.push_str(&format!(
        "<div class=\"results-header\"><div><p class=\"eyebrow\">Trackpoints</p><h2>Showing the first 25 of {} samples</h2></div></div>",
        ride.samples.len()
    ));
    body.push_str(
        "<div class=\"table-wrapper\"><table><thead><tr><th>Time</th><th>Speed</th>\
         <th>Distance</th><th>Power</th><th>Heart rate</th><th>Cadence</th></tr></thead><tbody>",
    );

    for sample in ride.samples.iter().take(25) {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{:.1} km/h</td><td>{}</td><td>{} W</td><td>{} bpm</td><td>{} rpm</td></tr>",
            format_clock(sample.offset_secs),
            sample.speed_kmh,
            format_distance(sample.distance_km * 1000.0),
            sample.power_watts,
            sample.heart_rate_bpm,
            sample.cadence_rpm
        ));
    }

    body.push_str("</tbody></table></div>");
    body.push_str("</section>");
    body
}
