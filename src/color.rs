//! Background color parsing: hex (`#RGB`, `#RRGGBB`) and a few named colors.

/// Parse a color string into an RGB triple.
///
/// Accepts:
/// - `#RGB` / `RGB`: 3-digit hex
/// - `#RRGGBB` / `RRGGBB`: 6-digit hex
/// - named colors (case-insensitive): `white`, `black`, `red`, `green`,
///   `blue`, `gray`/`grey`
pub(crate) fn parse_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if let Some(rgb) = parse_hex(hex) {
        return Some(rgb);
    }

    lookup_named(s)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let bytes = hex.as_bytes();
    match hex.len() {
        3 => Some([
            expand_nibble(bytes[0])?,
            expand_nibble(bytes[1])?,
            expand_nibble(bytes[2])?,
        ]),
        6 => Some([
            parse_byte(&hex[0..2])?,
            parse_byte(&hex[2..4])?,
            parse_byte(&hex[4..6])?,
        ]),
        _ => None,
    }
}

/// 'f' -> 0xFF, 'a' -> 0xAA
fn expand_nibble(ch: u8) -> Option<u8> {
    let n = hex_val(ch)?;
    Some(n << 4 | n)
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(pair: &str) -> Option<u8> {
    u8::from_str_radix(pair, 16).ok()
}

fn lookup_named(name: &str) -> Option<[u8; 3]> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(rgb)
}
