const MS_PER_MINUTE: f64 = 60_000.0;

/// `"1h 30m"` from 90, `"45m"` from 45.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    format_hours_minutes(minutes)
}

pub fn format_playtime(playtime_ms: f64) -> String {
    format_duration(ms_to_minutes(playtime_ms))
}

/// Always spells out the hour part, [`format_duration`] drops it below an hour.
pub fn format_hours_minutes(minutes: i64) -> String {
    let hours = minutes.div_euclid(60);
    let remaining = minutes.rem_euclid(60);
    format!("{hours}h {remaining}m")
}

/// Shortens `label` to `limit` chars followed by an ellipsis.
pub fn truncate_label(label: &str, limit: usize) -> String {
    match label.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &label[..cut]),
        None => label.to_string(),
    }
}

pub(crate) fn ms_to_minutes(playtime_ms: f64) -> i64 {
    (playtime_ms / MS_PER_MINUTE).round() as i64
}
