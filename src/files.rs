// Local file enumeration: which files in a directory can be uploaded.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image and video formats the service accepts, in enumeration order.
/// RAW formats (RAW, DNG, NEF, ...) can be added here if wanted.
pub const SUPPORTED_FORMATS: &[&str] = &[
    "JPG", "GIF", "PNG", "TIF", "ASF", "ASX", "AVI", "DIVX", "DV", "DVX", "M4V", "MOV", "MP4",
    "MPEG", "MPG", "QT", "WMV", "3G2", "3GP", "3IVX", "3VX",
];

/// Supported files directly inside `directory`.
///
/// Files come out grouped by format in `SUPPORTED_FORMATS` order, and in
/// directory read order within a format. Each format matches its upper-
/// and lower-case spelling exactly, so `a.JPG` and `a.jpg` are found but
/// `a.Jpg` is not. Subdirectories are not searched, hidden files (leading
/// `.`) are skipped, and a missing or unreadable directory gives an empty
/// list.
pub fn list_supported_files(directory: &Path) -> Vec<PathBuf> {
    list_files_with_formats(directory, SUPPORTED_FORMATS)
}

pub fn list_files_with_formats(directory: &Path, formats: &[&str]) -> Vec<PathBuf> {
    let entries: Vec<PathBuf> = match fs::read_dir(directory) {
        Ok(read_dir) => read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && !is_hidden(p))
            .collect(),
        Err(e) => {
            debug!(directory = %directory.display(), error = %e, "directory not readable");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for format in formats {
        for spelling in spellings(format) {
            for path in &entries {
                if path.extension() == Some(OsStr::new(&spelling)) && seen.insert(path.clone()) {
                    files.push(path.clone());
                }
            }
        }
    }

    debug!(directory = %directory.display(), count = files.len(), "supported files listed");
    files
}

/// Comma separated list of the formats, for help text.
pub fn describe_formats() -> String {
    SUPPORTED_FORMATS.join(", ")
}

fn spellings(format: &str) -> Vec<String> {
    let upper = format.to_ascii_uppercase();
    let lower = format.to_ascii_lowercase();
    if upper == lower {
        vec![upper]
    } else {
        vec![upper, lower]
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true)
}
