/// Builds the output file name for the `index`-th job.
///
/// The index is zero-padded to four digits; larger indices keep their natural
/// width. `extension` is appended verbatim and should carry its leading dot.
pub fn name_for(index: u32, extension: &str) -> String {
    format!("{:04}{}", index, extension)
}

/// Returns the extension of `url`, leading dot included.
///
/// The extension runs from the last `.` to the end of the string. A URL whose
/// last path segment has no dot yields an empty extension.
pub fn extension_of(url: &str) -> String {
    match url.rfind('.') {
        Some(pos) if !url[pos..].contains('/') => url[pos..].to_string(),
        _ => String::new(),
    }
}
