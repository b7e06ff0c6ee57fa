use std::time::Duration;

pub const BATCH_DELIMITER: char = ';';

/// Removes CR and LF characters pasted along with a URL.
pub fn strip_line_breaks(url: &str) -> String {
    url.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Splits a raw `;`-separated batch into URLs, dropping empty entries.
pub fn split_batch(raw: &str) -> Vec<String> {
    raw.split(BATCH_DELIMITER)
        .map(strip_line_breaks)
        .filter(|url| !url.is_empty())
        .collect()
}

/// Renders a duration as `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
