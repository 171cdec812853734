use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tiff", "tif"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// List the supported images directly inside `dir`, sorted by path.
///
/// Entries resolving to the same physical file (symlinks, case-folding file
/// systems) are returned once.
pub fn discover_images(dir: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1) // Only immediate children
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_image(path) {
            continue;
        }

        let identity = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if seen.insert(identity) {
            files.push(path.to_path_buf());
        } else {
            trace!("Skipping duplicate entry {}", path.display());
        }
    }

    files
}

/// `<dir>/<dir name><suffix>`, e.g. `photos/photos_watermark`.
pub fn output_directory_for(input_dir: &Path, suffix: &str) -> PathBuf {
    let resolved = std::fs::canonicalize(input_dir).unwrap_or_else(|_| input_dir.to_path_buf());
    let dir_name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input_dir.join(format!("{}{}", dir_name, suffix))
}
