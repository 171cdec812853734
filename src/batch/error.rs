use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a whole batch. Per-file problems never end up here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
