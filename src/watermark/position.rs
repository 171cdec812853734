use serde::{Deserialize, Serialize};

/// Where the watermark text is anchored on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Position {
    /// Lenient parse for callers that bypass CLI validation: unknown tokens
    /// behave like `top-left`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "top-right" => Position::TopRight,
            "bottom-left" => Position::BottomLeft,
            "bottom-right" => Position::BottomRight,
            "center" => Position::Center,
            _ => Position::TopLeft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
            Position::Center => "center",
        }
    }

    /// Top-left pixel where text of `text_size` starts on a canvas of
    /// `canvas_size`. Not clamped: text larger than the canvas yields negative
    /// coordinates.
    pub fn anchor(&self, canvas_size: (u32, u32), text_size: (u32, u32), margin: i32) -> (i32, i32) {
        let (canvas_w, canvas_h) = (i64::from(canvas_size.0), i64::from(canvas_size.1));
        let (text_w, text_h) = (i64::from(text_size.0), i64::from(text_size.1));
        let margin = i64::from(margin);

        let (x, y) = match self {
            Position::TopLeft => (margin, margin),
            Position::TopRight => (canvas_w - text_w - margin, margin),
            Position::BottomLeft => (margin, canvas_h - text_h - margin),
            Position::BottomRight => (canvas_w - text_w - margin, canvas_h - text_h - margin),
            Position::Center => (
                (canvas_w - text_w).div_euclid(2),
                (canvas_h - text_h).div_euclid(2),
            ),
        };

        (saturate(x), saturate(y))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Anchor for a position given by name; see [`Position::from_token`].
pub fn resolve_position(
    canvas_w: u32,
    canvas_h: u32,
    text_w: u32,
    text_h: u32,
    position: &str,
    margin: i32,
) -> (i32, i32) {
    Position::from_token(position).anchor((canvas_w, canvas_h), (text_w, text_h), margin)
}
