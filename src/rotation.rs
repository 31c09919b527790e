//! Coordinate rotation utilities
//!
//! Panel memory is bit-packed, 8 horizontal pixels per byte with the
//! leftmost pixel in the MSB. Rows are `width_bytes()` long, including the
//! padding column some panels carry past their visible width. Rotation maps
//! a logical pixel onto that layout and never lands in the padding.
//!
//! ## Example
//!
//! ```
//! use monoepd::{rotation::apply_rotation, PanelCapabilities, Rotation};
//!
//! let dims = PanelCapabilities::LCMEN2R13EFC1.dimensions;
//!
//! // Native orientation: pixel (0,0) is byte 0, MSB
//! assert_eq!(apply_rotation(0, 0, &dims, Rotation::Rotate0), (0, 0x80));
//!
//! // Rotated 180: the last visible pixel of the last row
//! assert_eq!(apply_rotation(0, 0, &dims, Rotation::Rotate180), (249 * 16 + 15, 0x40));
//! ```

use crate::config::Dimensions;

/// Display rotation
///
/// Rotation is clockwise, applied to the visible area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// Native orientation
    #[default]
    Rotate0,
    /// 90° clockwise, width and height swapped
    Rotate90,
    /// 180°, origin at the bottom-right
    Rotate180,
    /// 270° clockwise
    Rotate270,
}

/// Logical (width, height) of the visible area under `rotation`
pub fn rotated_size(dims: &Dimensions, rotation: Rotation) -> (u16, u16) {
    match rotation {
        Rotation::Rotate0 | Rotation::Rotate180 => (dims.visible_width, dims.height),
        Rotation::Rotate90 | Rotation::Rotate270 => (dims.height, dims.visible_width),
    }
}

/// Apply rotation transformation to get buffer index and bit mask
///
/// `x` and `y` must lie inside [`rotated_size`].
///
/// Returns `(byte_index, bit_mask)` into a full-panel buffer.
pub fn apply_rotation(x: u32, y: u32, dims: &Dimensions, rotation: Rotation) -> (usize, u8) {
    let visible = u32::from(dims.visible_width);
    let height = u32::from(dims.height);
    let (px, py) = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (visible - 1 - y, x),
        Rotation::Rotate180 => (visible - 1 - x, height - 1 - y),
        Rotation::Rotate270 => (y, height - 1 - x),
    };
    let index = (px / 8 + py * u32::from(dims.width_bytes())) as usize;
    (index, 0x80 >> (px % 8))
}
