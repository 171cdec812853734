use image::{ImageDecoder, ImageReader};
use rexif::{ExifData, ExifEntry, ExifError, ExifTag, TagValue};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// Tag name → value mapping for one image's embedded EXIF block.
pub type MetadataMap = BTreeMap<String, MetadataValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    /// Anything else, kept as rexif's readable rendering
    Opaque(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) | MetadataValue::Opaque(s) => f.write_str(s),
            MetadataValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Fields echoed to the debug log for every processed file.
const DESCRIBED_FIELDS: [&str; 8] = [
    "DateTimeOriginal",
    "DateTime",
    "DateTimeDigitized",
    "Make",
    "Model",
    "FNumber",
    "ExposureTime",
    "ISOSpeedRatings",
];

/// Read the embedded metadata of an image.
///
/// JPEG and TIFF are parsed by rexif directly. For other containers (PNG
/// `eXIf`) the raw EXIF block is pulled out through the image codec and handed
/// to rexif. Returns `None` when the file cannot be parsed or carries no EXIF
/// block. File handles live only for the duration of the call.
pub fn read_metadata(image_path: &Path) -> Option<MetadataMap> {
    let exif_data = match rexif::parse_file(image_path) {
        Ok(exif_data) => exif_data,
        Err(ExifError::FileTypeUnknown) => read_codec_exif(image_path)?,
        Err(e) => {
            trace!("No EXIF data for {}: {}", image_path.display(), e);
            return None;
        }
    };

    let map = metadata_map(&exif_data);
    if map.is_empty() {
        trace!("Empty EXIF block in {}", image_path.display());
        None
    } else {
        Some(map)
    }
}

/// EXIF block exposed by the image decoder, parsed with rexif.
fn read_codec_exif(image_path: &Path) -> Option<ExifData> {
    let block = match codec_exif_block(image_path) {
        Ok(Some(block)) => block,
        Ok(None) => {
            trace!("No EXIF block in {}", image_path.display());
            return None;
        }
        Err(e) => {
            trace!("Failed to read {}: {}", image_path.display(), e);
            return None;
        }
    };

    match rexif::parse_buffer(&block) {
        Ok(exif_data) => Some(exif_data),
        Err(e) => {
            trace!("Unreadable EXIF block in {}: {}", image_path.display(), e);
            None
        }
    }
}

fn codec_exif_block(image_path: &Path) -> image::ImageResult<Option<Vec<u8>>> {
    let mut decoder = ImageReader::open(image_path)?
        .with_guessed_format()?
        .into_decoder()?;
    decoder.exif_metadata()
}

pub(crate) fn metadata_map(exif: &ExifData) -> MetadataMap {
    let mut map = MetadataMap::new();
    for entry in &exif.entries {
        // IFD0 comes before the thumbnail IFD, so the first occurrence wins
        map.entry(tag_name(entry.tag, entry.ifd.tag))
            .or_insert_with(|| metadata_value(entry));
    }
    map
}

/// Human-readable name for a tag, or the numeric id when rexif does not know it.
pub fn tag_name(tag: ExifTag, tag_id: u16) -> String {
    match tag {
        ExifTag::UnknownToMe => tag_id.to_string(),
        known => format!("{:?}", known),
    }
}

fn metadata_value(entry: &ExifEntry) -> MetadataValue {
    match &entry.value {
        TagValue::Ascii(s) => MetadataValue::Text(s.clone()),
        TagValue::U8(v) if v.len() == 1 => MetadataValue::Number(f64::from(v[0])),
        TagValue::U16(v) if v.len() == 1 => MetadataValue::Number(f64::from(v[0])),
        TagValue::U32(v) if v.len() == 1 => MetadataValue::Number(f64::from(v[0])),
        _ => MetadataValue::Opaque(entry.value_more_readable.to_string()),
    }
}

/// Log the timestamp and camera fields of a file at debug level.
pub fn log_metadata_summary(image_path: &Path, metadata: Option<&MetadataMap>) {
    let name = image_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let Some(metadata) = metadata else {
        debug!("{}: no metadata", name);
        return;
    };

    for field in DESCRIBED_FIELDS {
        if let Some(value) = metadata.get(field) {
            debug!("{}: {} = {}", name, field, value);
        }
    }
}
