/// Format a bytes-per-second rate compactly (`"1.3M"`, `"34K"`, `"512B"`).
pub fn format_rate(bytes_per_sec: f32) -> String {
    const MB: f32 = 1_000_000.0;
    const KB: f32 = 1_000.0;

    let bps = if bytes_per_sec.is_finite() { bytes_per_sec.max(0.0) } else { 0.0 };
    if bps >= MB {
        format!("{:.1}M", bps / MB)
    } else if bps >= KB {
        format!("{:.0}K", bps / KB)
    } else {
        format!("{:.0}B", bps)
    }
}

/// Whole-number percentage (`"37%"`).
pub fn format_percent(percent: f32) -> String {
    format!("{:.0}%", percent.clamp(0.0, 100.0))
}

/// GPU utilisation and temperature (`"45% 62°"`).
pub fn format_gpu(util: f32, temp: f32) -> String {
    format!("{} {:.0}°", format_percent(util), temp.max(0.0))
}
