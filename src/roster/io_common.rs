use std::path::Path;

use crate::roster::*;

/// The spreadsheet formats accepted for import, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// The lowercase extension of a path, if any.
pub fn file_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Checks that a file name (or a bare extension) is an accepted
/// spreadsheet format and returns the normalized extension.
pub fn check_extension(name: &str) -> AppResult<String> {
    let ext = file_extension(name).unwrap_or_else(|| name.trim_start_matches('.').to_lowercase());
    ensure!(
        ALLOWED_EXTENSIONS.contains(&ext.as_str()),
        UnsupportedFileSnafu { path: name }
    );
    Ok(ext)
}
