use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Font search paths tried after any user supplied fonts.
const SEARCH_PATHS: [&str; 7] = [
    "arial.ttf",
    "static/DejaVuSans.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

/// One way of obtaining a font face.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    File(PathBuf),
    Builtin,
}

/// Build the ordered list of font sources: user fonts, then the search paths,
/// then the built-in bitmap font.
pub fn font_sources(user_fonts: &[PathBuf]) -> Vec<FontSource> {
    user_fonts
        .iter()
        .cloned()
        .chain(SEARCH_PATHS.iter().map(PathBuf::from))
        .map(FontSource::File)
        .chain(std::iter::once(FontSource::Builtin))
        .collect()
}

/// A font face at a fixed pixel size.
pub enum WatermarkFont {
    Outline { font: FontVec, scale: PxScale },
    Bitmap { dot: u32 },
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatermarkFont::Outline { scale, .. } => {
                write!(f, "WatermarkFont::Outline({}px)", scale.y)
            }
            WatermarkFont::Bitmap { dot } => write!(f, "WatermarkFont::Bitmap(dot={})", dot),
        }
    }
}

impl WatermarkFont {
    /// Try each source in order; the first that yields a usable face wins.
    /// The built-in bitmap font is always available, so this cannot fail.
    pub fn resolve(sources: &[FontSource], size: f32) -> Self {
        for source in sources {
            match source {
                FontSource::File(path) => match load_font_file(path) {
                    Ok(font) => {
                        info!("Using font {}", path.display());
                        return WatermarkFont::Outline {
                            font,
                            scale: PxScale::from(size),
                        };
                    }
                    Err(e) => debug!("Font {} unavailable: {}", path.display(), e),
                },
                FontSource::Builtin => break,
            }
        }

        info!("No font file found, using built-in bitmap font");
        Self::builtin(size)
    }

    pub fn builtin(size: f32) -> Self {
        // Glyph cells are 7 dots tall plus one dot of leading
        let dot = (size / 8.0).round().max(1.0) as u32;
        WatermarkFont::Bitmap { dot }
    }

    /// Rendered width and height of `text` in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            WatermarkFont::Outline { font, scale } => text_size(*scale, font, text),
            WatermarkFont::Bitmap { dot } => {
                let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                if count == 0 {
                    return (0, 0);
                }
                let columns = count.saturating_mul(bitmap::ADVANCE) - 1;
                (
                    columns.saturating_mul(*dot),
                    bitmap::ROWS.saturating_mul(*dot),
                )
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
    /// canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        match self {
            WatermarkFont::Outline { font, scale } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text);
            }
            WatermarkFont::Bitmap { dot } => {
                let dot = i64::from(*dot);
                let advance = i64::from(bitmap::ADVANCE) * dot;
                for (i, ch) in text.chars().enumerate() {
                    let origin_x = i64::from(x) + i as i64 * advance;
                    if origin_x >= i64::from(canvas.width()) {
                        break;
                    }
                    for (row, bits) in bitmap::glyph(ch).iter().enumerate() {
                        for col in 0..bitmap::COLUMNS {
                            if bits & (0x10 >> col) == 0 {
                                continue;
                            }
                            let left = origin_x + i64::from(col) * dot;
                            let top = i64::from(y) + row as i64 * dot;
                            fill_dot(canvas, left, top, dot, color);
                        }
                    }
                }
            }
        }
    }
}

/// Fill one `dot`-sized square, clipped to the canvas in wide arithmetic so
/// huge font sizes cannot overflow the rectangle bounds.
fn fill_dot(canvas: &mut RgbaImage, left: i64, top: i64, dot: i64, color: Rgba<u8>) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let (x0, y0) = (left.max(0), top.max(0));
    let (x1, y1) = ((left + dot).min(width), (top + dot).min(height));
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    // Clipped bounds lie inside the canvas, so they fit the imageproc types
    let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

fn load_font_file(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let font_data = std::fs::read(path)?;
    let font = FontVec::try_from_vec(font_data).map_err(|_| "Failed to parse font")?;
    Ok(font)
}

/// 5x7 dot-matrix glyphs. Each row is five bits, most significant bit on the left.
mod bitmap {
    pub const COLUMNS: u32 = 5;
    pub const ROWS: u32 = 7;
    /// Glyph width plus one column of spacing
    pub const ADVANCE: u32 = COLUMNS + 1;

    const MISSING: [u8; 7] = [0x1f, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1f];

    pub fn glyph(ch: char) -> [u8; 7] {
        match ch {
            '0' => [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
            '1' => [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
            '2' => [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
            '3' => [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
            '4' => [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
            '5' => [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
            '6' => [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
            '7' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
            '9' => [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
            '-' => [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00],
            ':' => [0x00, 0x0c, 0x0c, 0x00, 0x0c, 0x0c, 0x00],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c],
            '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
            ' ' => [0x00; 7],
            _ => MISSING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_sources_order() {
        let sources = font_sources(&[PathBuf::from("custom.otf")]);
        assert_eq!(sources[0], FontSource::File(PathBuf::from("custom.otf")));
        assert_eq!(sources[1], FontSource::File(PathBuf::from("arial.ttf")));
        assert_eq!(sources.last(), Some(&FontSource::Builtin));
        assert_eq!(sources.len(), SEARCH_PATHS.len() + 2);
    }

    #[test]
    fn test_resolve_falls_back_to_builtin() {
        let sources = vec![
            FontSource::File(PathBuf::from("/nonexistent/font.ttf")),
            FontSource::Builtin,
        ];
        let font = WatermarkFont::resolve(&sources, 24.0);
        assert!(matches!(font, WatermarkFont::Bitmap { dot: 3 }));
    }

    #[test]
    fn test_resolve_skips_unparsable_font_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"definitely not a font").unwrap();

        let font = WatermarkFont::resolve(&[FontSource::File(bogus), FontSource::Builtin], 16.0);
        assert!(matches!(font, WatermarkFont::Bitmap { dot: 2 }));
    }

    #[test]
    fn test_bitmap_dot_size_never_zero() {
        assert!(matches!(WatermarkFont::builtin(1.0), WatermarkFont::Bitmap { dot: 1 }));
    }

    #[test]
    fn test_bitmap_measure() {
        let font = WatermarkFont::builtin(24.0);
        // 10 glyphs * 6 columns - 1 trailing spacing column, 3px dots
        assert_eq!(font.measure("2024-05-01"), (177, 21));
        assert_eq!(font.measure(""), (0, 0));
    }

    #[test]
    fn test_bitmap_draw_stays_inside_measured_box() {
        let font = WatermarkFont::builtin(8.0);
        let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 0]));
        let (w, h) = font.measure("18");
        font.draw(&mut canvas, 2, 3, "18", Rgba([255, 0, 0, 255]));

        let mut inked = 0;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel[3] != 0 {
                inked += 1;
                assert!(x >= 2 && x < 2 + w, "x={} outside text box", x);
                assert!(y >= 3 && y < 3 + h, "y={} outside text box", y);
                assert_eq!(*pixel, Rgba([255, 0, 0, 255]));
            }
        }
        assert!(inked > 0);
    }

    #[test]
    fn test_bitmap_huge_size_saturates() {
        let font = WatermarkFont::builtin(1.0e12);
        let (w, h) = font.measure("2024-05-01");
        assert_eq!((w, h), (u32::MAX, u32::MAX));

        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        font.draw(&mut canvas, 0, 0, "5", Rgba([255, 255, 255, 255]));
        // The top-left dot of '5' covers the whole canvas
        assert_eq!(*canvas.get_pixel(7, 7), Rgba([255, 255, 255, 255]));

        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        font.draw(&mut canvas, i32::MIN, i32::MAX, "2024-05-01", Rgba([255, 255, 255, 255]));
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_resolve_loads_outline_font() {
        let Some(path) = system_font() else {
            // No outline font on this machine
            return;
        };
        let font = WatermarkFont::resolve(&[FontSource::File(path), FontSource::Builtin], 24.0);
        assert!(matches!(font, WatermarkFont::Outline { .. }));
        let (w, h) = font.measure("2024-05-01");
        assert!(w > 0 && h > 0);
    }

    fn system_font() -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| load_font_file(path).is_ok())
    }

    #[test]
    fn test_bitmap_draw_clips_negative_origin() {
        let font = WatermarkFont::builtin(8.0);
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        font.draw(&mut canvas, -3, -3, "8", Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.dimensions(), (4, 4));
    }
}
