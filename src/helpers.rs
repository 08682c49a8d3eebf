//! Shared numeric and pace-format helpers.

/// Round a distance to one decimal for API responses.
pub(crate) fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Parse a "M:SS" pace string into seconds per km.
///
/// Pace is free text upstream, so anything that does not match
/// minutes ":" two-digit seconds under 60 is rejected. Callers exclude
/// rejected values from weighted averages — folding them in as zero would
/// corrupt the average.
pub(crate) fn parse_pace(pace: &str) -> Option<i64> {
    let (minutes, seconds) = pace.split_once(':')?;
    if seconds.len() != 2 {
        return None;
    }
    let minutes = i64::from(minutes.parse::<u32>().ok()?);
    let seconds = i64::from(seconds.parse::<u32>().ok()?);
    if seconds > 59 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// Format seconds-per-km as "M:SS".
pub(crate) fn format_pace(seconds_per_km: i64) -> String {
    format!("{}:{:02}", seconds_per_km / 60, seconds_per_km % 60)
}
