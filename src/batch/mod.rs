// Batch module - walks one directory and watermarks every dated photo in it
mod discover;
mod error;
mod types;

pub use discover::{SUPPORTED_EXTENSIONS, discover_images, is_supported_image, output_directory_for};
pub use error::BatchError;
pub use types::{BatchReport, BatchResult, FileStatus};

use crate::capture_date::extract_capture_date;
use crate::metadata::{log_metadata_summary, read_metadata};
use crate::watermark::Watermarker;
use crate::{Config, OutputConfig};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Watermark every supported image directly inside `input_dir`.
///
/// Results go to `<input_dir>/<dir name>_watermark/`. Only a missing input
/// directory (or an output directory that cannot be created) fails the batch;
/// every per-file problem becomes a [`BatchResult`]. Results are sorted by file
/// path.
pub async fn process_directory(input_dir: &Path, config: &Config) -> Result<BatchReport, BatchError> {
    if !input_dir.exists() {
        return Err(BatchError::DirectoryNotFound(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(BatchError::NotADirectory(input_dir.to_path_buf()));
    }

    let output_directory = output_directory_for(input_dir, &config.output.directory_suffix);
    tokio::fs::create_dir_all(&output_directory)
        .await
        .map_err(|e| BatchError::OutputDirectory {
            path: output_directory.clone(),
            source: e,
        })?;
    info!("Output directory: {}", output_directory.display());

    let files = discover_images(input_dir);
    if files.is_empty() {
        info!("No supported image files found in {}", input_dir.display());
        return Ok(BatchReport {
            output_directory,
            results: Vec::new(),
        });
    }
    info!("Found {} image files", files.len());

    let watermarker = Arc::new(Watermarker::new(&config.watermark));
    let mut results = run_files(
        files,
        &output_directory,
        watermarker,
        &config.output,
        config.processing.jobs,
    )
    .await;
    results.sort_by(|a, b| a.file.cmp(&b.file));

    Ok(BatchReport {
        output_directory,
        results,
    })
}

/// Run each file on the blocking pool, at most `jobs` at a time.
async fn run_files(
    files: Vec<PathBuf>,
    output_directory: &Path,
    watermarker: Arc<Watermarker>,
    output: &OutputConfig,
    jobs: usize,
) -> Vec<BatchResult> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for source in files {
        let semaphore = semaphore.clone();
        let watermarker = watermarker.clone();
        let output_directory = output_directory.to_path_buf();
        let output = output.clone();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return BatchResult::failed(source, "worker pool closed");
            };

            let file = source.clone();
            let work = tokio::task::spawn_blocking(move || {
                process_file(&source, &output_directory, &watermarker, &output)
            });
            match work.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Worker for {} failed: {}", file.display(), e);
                    BatchResult::failed(file, format!("worker failed: {}", e))
                }
            }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!("Batch task failed: {}", e),
        }
    }
    results
}

/// Metadata → capture date → watermark → save, for one file.
pub(crate) fn process_file(
    source: &Path,
    output_directory: &Path,
    watermarker: &Watermarker,
    output: &OutputConfig,
) -> BatchResult {
    let Some(file_name) = source.file_name() else {
        return BatchResult::failed(source.to_path_buf(), "path has no file name");
    };
    info!("Processing {}", source.display());

    let metadata = read_metadata(source);
    if metadata.is_none() {
        info!("No EXIF metadata in {}", source.display());
    }
    log_metadata_summary(source, metadata.as_ref());

    let Some(capture_date) = metadata.as_ref().and_then(extract_capture_date) else {
        info!("No capture date in {}, skipping", source.display());
        return BatchResult::skipped(source.to_path_buf());
    };
    debug!("Capture date for {}: {}", source.display(), capture_date);

    let output_path = output_directory.join(output_file_name(&output.file_prefix, file_name));
    match watermarker.watermark_file(source, &output_path, &capture_date, output.jpeg_quality) {
        Ok(()) => BatchResult::watermarked(source.to_path_buf(), &output_path),
        Err(e) => {
            warn!("Failed to watermark {}: {}", source.display(), e);
            BatchResult::failed(source.to_path_buf(), e.to_string())
        }
    }
}

fn output_file_name(prefix: &str, file_name: &std::ffi::OsStr) -> OsString {
    let mut name = OsString::from(prefix);
    name.push(file_name);
    name
}
