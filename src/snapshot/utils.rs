use chrono::Utc;

/// Timestamp with microsecond precision in YYYYMMDD_HHMMSS_ffffff format
pub fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string()
}

/// Filename for an action artifact
pub fn generate_filename(prefix: &str, label: &str, timestamp: &str) -> String {
    format!("{}_{}_{}.png", prefix, label, timestamp)
}

/// Make a label safe for use in filenames.
///
/// Anything outside `[A-Za-z0-9_-]` becomes an underscore. Labels are capped
/// so long button texts do not produce unwieldy paths.
pub fn sanitize_label(label: &str) -> String {
    const MAX_LEN: usize = 48;
    label
        .trim()
        .chars()
        .take(MAX_LEN)
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
