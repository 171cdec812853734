use crate::metadata::MetadataMap;
use chrono::NaiveDateTime;
use tracing::debug;

/// Timestamp fields in order of preference. The digitization time is the
/// weakest signal for when the photo was taken.
pub const DATE_FIELDS: [&str; 3] = ["DateTimeOriginal", "DateTime", "DateTimeDigitized"];

/// EXIF timestamp grammar, e.g. "2005:07:30 07:22:46"
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const CAPTURE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Pick the capture date out of a metadata map, formatted as `YYYY-MM-DD`.
///
/// A field that is present but does not parse does not stop the search; the
/// next field in [`DATE_FIELDS`] is tried instead.
pub fn extract_capture_date(metadata: &MetadataMap) -> Option<String> {
    for field in DATE_FIELDS {
        let Some(value) = metadata.get(field) else {
            continue;
        };

        let raw = value.to_string();
        match parse_exif_datetime(&raw) {
            Some(datetime) => {
                debug!("Found capture date in {}: {}", field, datetime);
                return Some(datetime.format(CAPTURE_DATE_FORMAT).to_string());
            }
            None => debug!("Unparsable {} value {:?}, trying next field", field, raw),
        }
    }

    None
}

/// Parse an EXIF timestamp. ASCII tags are often NUL padded; any other
/// whitespace besides the single date/time separator is rejected.
pub fn parse_exif_datetime(datetime_str: &str) -> Option<NaiveDateTime> {
    let unpadded = datetime_str.trim_end_matches('\0');
    if !has_single_separator(unpadded) {
        return None;
    }
    NaiveDateTime::parse_from_str(unpadded, EXIF_DATETIME_FORMAT).ok()
}

// chrono skips whitespace in front of numeric fields, so check the shape first
fn has_single_separator(s: &str) -> bool {
    let mut parts = s.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(time), None) => [date, time]
            .iter()
            .all(|part| !part.is_empty() && !part.contains(char::is_whitespace)),
        _ => false,
    }
}
