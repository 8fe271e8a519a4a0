//! Gauge colors.

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#rrggbb` (alpha is not written).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

pub const SAFE: Rgba = Rgba::rgb(0xA9, 0xD5, 0xDF); // muted aqua
pub const CAUTION: Rgba = Rgba::rgb(0xF8, 0xD7, 0x9B); // soft peach
pub const DANGER: Rgba = Rgba::rgb(0xF4, 0x7A, 0x6E); // gentle coral
pub const NEEDLE: Rgba = Rgba::rgb(0x38, 0x40, 0x48);
pub const TEXT: Rgba = Rgba::rgb(0x38, 0x40, 0x48);
pub const TRACK: Rgba = Rgba::rgb(0xF5, 0xF5, 0xF5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_uppercase_without_alpha() {
        assert_eq!(DANGER.to_hex(), "#F47A6E");
        assert_eq!(TRACK.to_hex(), "#F5F5F5");
        let translucent = Rgba { a: 0, ..SAFE };
        assert_eq!(translucent.to_hex(), "#A9D5DF");
    }
}
