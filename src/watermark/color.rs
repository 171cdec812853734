use image::Rgba;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Resolve a color spec to opaque RGBA.
///
/// Accepts `white`, `black`, `red`, `blue` (case-sensitive) or `#RRGGBB`.
/// Anything else resolves to white.
pub fn resolve_color(spec: &str) -> Rgba<u8> {
    match spec {
        "white" => WHITE,
        "black" => Rgba([0, 0, 0, 255]),
        "red" => Rgba([255, 0, 0, 255]),
        "blue" => Rgba([0, 0, 255, 255]),
        _ => spec
            .strip_prefix('#')
            .and_then(parse_hex_rgb)
            .unwrap_or(WHITE),
    }
}

fn parse_hex_rgb(hex: &str) -> Option<Rgba<u8>> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}
