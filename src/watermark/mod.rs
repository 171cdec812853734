mod color;
mod error;
mod font;
mod position;

pub use color::resolve_color;
pub use error::WatermarkError;
pub use font::{FontSource, WatermarkFont, font_sources};
pub use position::{Position, resolve_position};

use crate::WatermarkConfig;
use image::{
    DynamicImage, ImageEncoder, ImageFormat, Rgba, RgbaImage, codecs::jpeg::JpegEncoder,
};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_MARGIN: i32 = 20;

/// Stamps a single line of text onto images. Holds the resolved font and color
/// so they are looked up once per batch rather than once per file.
#[derive(Debug)]
pub struct Watermarker {
    font: WatermarkFont,
    color: Rgba<u8>,
    position: Position,
    margin: i32,
}

impl Watermarker {
    pub fn new(config: &WatermarkConfig) -> Self {
        let sources = font_sources(&config.font_paths);
        let font = WatermarkFont::resolve(&sources, config.font_size);
        Self::with_font(font, &config.color, config.position, config.margin)
    }

    pub fn with_font(font: WatermarkFont, color_spec: &str, position: Position, margin: i32) -> Self {
        Self {
            font,
            color: resolve_color(color_spec),
            position,
            margin,
        }
    }

    /// Composite `text` over `image` and return an opaque RGB image of the same
    /// size.
    pub fn render(&self, image: &DynamicImage, text: &str) -> DynamicImage {
        let mut base = image.to_rgba8();
        let (width, height) = base.dimensions();

        let text_size = self.font.measure(text);
        let (x, y) = self.position.anchor((width, height), text_size, self.margin);
        debug!(
            "Placing {:?} ({}x{}) at ({}, {}) on {}x{} image",
            text, text_size.0, text_size.1, x, y, width, height
        );

        // Transparent layer carrying the ink color, so anti-aliased glyph edges
        // only vary in alpha
        let [r, g, b, _] = self.color.0;
        let mut layer = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 0]));
        self.font.draw(&mut layer, x, y, text, self.color);

        image::imageops::overlay(&mut base, &layer, 0, 0);

        // Encoders downstream expect no alpha channel
        let rgb_image = DynamicImage::ImageRgba8(base).to_rgb8();
        DynamicImage::ImageRgb8(rgb_image)
    }

    /// Decode `source`, stamp `text` and write the result to `output`.
    pub fn watermark_file(
        &self,
        source: &Path,
        output: &Path,
        text: &str,
        jpeg_quality: u8,
    ) -> Result<(), WatermarkError> {
        let image = image::open(source).map_err(|e| WatermarkError::Decode {
            path: source.to_path_buf(),
            source: e,
        })?;

        let watermarked = self.render(&image, text);
        save_image(&watermarked, output, jpeg_quality)
    }
}

/// Save an image in the format implied by the output extension. JPEG output
/// uses the given quality.
pub fn save_image(image: &DynamicImage, path: &Path, jpeg_quality: u8) -> Result<(), WatermarkError> {
    let encode_error = |source| WatermarkError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let format = ImageFormat::from_path(path).map_err(encode_error)?;
    let rgb_image = image.to_rgb8();

    if format == ImageFormat::Jpeg {
        let output = std::fs::File::create(path).map_err(|e| WatermarkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(output), jpeg_quality);
        encoder
            .write_image(
                &rgb_image,
                rgb_image.width(),
                rgb_image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(encode_error)?;
    } else {
        rgb_image.save_with_format(path, format).map_err(encode_error)?;
    }

    debug!("Wrote {}", path.display());
    Ok(())
}
