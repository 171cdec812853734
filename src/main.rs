use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

use datemark::{BatchError, BatchReport, Config, FileStatus, Position, process_directory};

/// Stamp every photo in a directory with the date it was taken, read from EXIF.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the photos (not searched recursively)
    input_dir: PathBuf,

    /// Font size in pixels [default: 24]
    #[arg(long)]
    font_size: Option<f32>,

    /// Text color: white, black, red, blue or #RRGGBB [default: white]
    #[arg(long)]
    color: Option<String>,

    /// Where to place the date [default: bottom-right]
    #[arg(long, value_enum)]
    position: Option<Position>,

    /// Distance from the image edges in pixels [default: 20]
    #[arg(long)]
    margin: Option<i32>,

    /// Font file to try before the built-in search paths (repeatable)
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Number of files processed at the same time [default: 1]
    #[arg(short, long)]
    jobs: Option<usize>,

    #[arg(short, long, default_value = "datemark.toml")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;

    info!("Input directory: {}", cli.input_dir.display());
    info!("Font size: {}", config.watermark.font_size);
    info!("Color: {}", config.watermark.color);
    info!("Position: {}", config.watermark.position);

    match process_directory(&cli.input_dir, &config).await {
        Ok(report) => print_report(&report),
        Err(BatchError::DirectoryNotFound(path)) => {
            eprintln!("Error: directory does not exist: {}", path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    println!("Done.");
    Ok(())
}

/// Config file values, overridden by any flags given on the command line.
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli.config.exists() {
        let config_content = std::fs::read_to_string(&cli.config)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", cli.config);
        config
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
        Config::default()
    };

    if let Some(font_size) = cli.font_size {
        config.watermark.font_size = font_size;
    }
    if let Some(color) = &cli.color {
        config.watermark.color = color.clone();
    }
    if let Some(position) = cli.position {
        config.watermark.position = position;
    }
    if let Some(margin) = cli.margin {
        config.watermark.margin = margin;
    }
    if !cli.fonts.is_empty() {
        let mut font_paths = cli.fonts.clone();
        font_paths.append(&mut config.watermark.font_paths);
        config.watermark.font_paths = font_paths;
    }
    if let Some(jobs) = cli.jobs {
        config.processing.jobs = jobs;
    }

    Ok(config)
}

fn print_report(report: &BatchReport) {
    if report.is_empty() {
        println!("No supported image files found.");
        return;
    }

    for result in &report.results {
        match result.status {
            FileStatus::Watermarked => {
                println!("✓ {}: watermarked -> {}", result.file_name(), result.message)
            }
            FileStatus::SkippedNoDate => println!("- {}: skipped-no-date", result.file_name()),
            FileStatus::Failed => {
                println!("✗ {}: failed: {}", result.file_name(), result.message)
            }
        }
    }

    println!(
        "{} watermarked, {} skipped, {} failed",
        report.count(FileStatus::Watermarked),
        report.count(FileStatus::SkippedNoDate),
        report.count(FileStatus::Failed)
    );
    println!("Output directory: {}", report.output_directory.display());
}
