//! Monochrome pixel colors
//!
//! Each pixel is one bit in a memory plane: 1 is white, 0 is black.
//!
//! ```
//! use monoepd::Color;
//!
//! assert_eq!(Color::Black.byte(), 0x00);
//! assert_eq!(Color::White.byte(), 0xFF);
//! ```

/// Colors a black/white panel can show
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    /// Black pixels
    Black,
    /// White pixels
    #[default]
    White,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU1;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        match color {
            embedded_graphics_core::pixelcolor::BinaryColor::On => Self::Black,
            embedded_graphics_core::pixelcolor::BinaryColor::Off => Self::White,
        }
    }
}

impl Color {
    /// Byte with all eight pixels set to this color
    pub fn byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }

    /// The other color
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}
