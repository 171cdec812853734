use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod batch;
pub mod capture_date;
pub mod metadata;
pub mod watermark;

pub use batch::{BatchError, BatchReport, BatchResult, FileStatus, process_directory};
pub use watermark::{Position, WatermarkError, Watermarker};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub watermark: WatermarkConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub font_size: f32,
    /// Named color (`white`, `black`, `red`, `blue`) or `#RRGGBB`
    pub color: String,
    pub position: Position,
    /// Distance in pixels between the text and the nearest image edges
    pub margin: i32,
    /// Font files tried before the built-in search paths
    pub font_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    pub file_prefix: String,
    pub directory_suffix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files processed at the same time; 1 keeps the batch sequential
    pub jobs: usize,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            color: "white".to_string(),
            position: Position::BottomRight,
            margin: watermark::DEFAULT_MARGIN,
            font_paths: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            file_prefix: "watermarked_".to_string(),
            directory_suffix: "_watermark".to_string(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}
