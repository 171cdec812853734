use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Watermarked,
    SkippedNoDate,
    Failed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Watermarked => "watermarked",
            FileStatus::SkippedNoDate => "skipped-no-date",
            FileStatus::Failed => "failed",
        })
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub file: PathBuf,
    pub status: FileStatus,
    /// Output path for watermarked files, the reason otherwise
    pub message: String,
}

impl BatchResult {
    pub fn watermarked(file: PathBuf, output: &std::path::Path) -> Self {
        Self {
            file,
            status: FileStatus::Watermarked,
            message: output.display().to_string(),
        }
    }

    pub fn skipped(file: PathBuf) -> Self {
        Self {
            file,
            status: FileStatus::SkippedNoDate,
            message: "no capture date found".to_string(),
        }
    }

    pub fn failed(file: PathBuf, message: impl Into<String>) -> Self {
        Self {
            file,
            status: FileStatus::Failed,
            message: message.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub output_directory: PathBuf,
    pub results: Vec<BatchResult>,
}

impl BatchReport {
    pub fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
