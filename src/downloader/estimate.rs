// Size estimation from duration and nominal bitrate

/// Corrects nominal bitrate x duration for real-world container/codec
/// overhead variance. Fixed constant, not user-configurable.
pub const EFFICIENCY_FACTOR: f64 = 0.85;

/// Project the file size in MB for a media stream of the given duration
/// and bitrate. Pure; returns 0 for zero duration.
///
/// `size_bytes = (bitrate_kbps * 1000 / 8) * duration_secs * EFFICIENCY_FACTOR`,
/// reported as MiB rounded to two decimals.
pub fn estimate(duration_secs: f64, bitrate_kbps: f64) -> f64 {
    estimate_with_factor(duration_secs, bitrate_kbps, EFFICIENCY_FACTOR)
}

pub fn estimate_with_factor(duration_secs: f64, bitrate_kbps: f64, efficiency_factor: f64) -> f64 {
    let size_bytes = (bitrate_kbps * 1000.0 / 8.0) * duration_secs * efficiency_factor;
    round2(size_bytes / (1024.0 * 1024.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
