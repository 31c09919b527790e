//! Rectangle clipping against panel memory
//!
//! Image data is packed 8 pixels per byte, so every window sent to the
//! controller starts and ends on a byte boundary. [`clip`] maps a caller
//! rectangle onto such a window and remembers how much of the source bitmap
//! was cut away on the left and top, so rows can still be read from the
//! right place.
//!
//! ## Example
//!
//! ```
//! use monoepd::geometry::{clip, Rect};
//! use monoepd::PanelCapabilities;
//!
//! let dims = PanelCapabilities::LCMEN2R13EFC1.dimensions;
//!
//! // x is aligned down to 8, the left overhang is skipped in the source
//! let clipped = clip(Rect::new(-5, 10, 20, 4), &dims).unwrap();
//! assert_eq!((clipped.window.x, clipped.window.w), (0, 16));
//! assert_eq!(clipped.source_offset_x, 8);
//!
//! // Entirely off the panel
//! assert!(clip(Rect::new(200, 0, 8, 8), &dims).is_none());
//! ```

use crate::config::Dimensions;

/// Caller rectangle in pixels, top-left origin
///
/// May extend past the panel on any side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    #[allow(clippy::many_single_char_names)]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// The whole addressable panel
    pub fn full(dims: &Dimensions) -> Self {
        Self::new(0, 0, i32::from(dims.width), i32::from(dims.height))
    }
}

/// Byte-aligned window inside panel memory
///
/// `x` and `w` are multiples of 8 and the window never leaves the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Left edge in pixels
    pub x: u16,
    /// Top row
    pub y: u16,
    /// Width in pixels
    pub w: u16,
    /// Height in rows
    pub h: u16,
}

impl Window {
    /// The whole addressable panel
    pub fn full(dims: &Dimensions) -> Self {
        Self {
            x: 0,
            y: 0,
            w: dims.width,
            h: dims.height,
        }
    }

    /// First byte column
    pub fn x_start_byte(&self) -> u16 {
        self.x / 8
    }

    /// Last byte column, inclusive
    pub fn x_end_byte(&self) -> u16 {
        (self.x + self.w) / 8 - 1
    }

    /// Last row, inclusive
    pub fn y_end(&self) -> u16 {
        self.y + self.h - 1
    }

    /// Bytes per window row
    pub fn width_bytes(&self) -> usize {
        usize::from(self.w / 8)
    }

    /// Whether the window covers every addressable pixel
    pub fn is_full_panel(&self, dims: &Dimensions) -> bool {
        *self == Self::full(dims)
    }
}

/// A [`Window`] together with where its pixels live in the source bitmap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedRect {
    /// Destination window in panel memory
    pub window: Window,
    /// Pixels cut from the left of the aligned rectangle (multiple of 8)
    pub source_offset_x: u16,
    /// Rows cut from the top
    pub source_offset_y: u16,
    /// Bytes per source row
    pub source_stride: usize,
    /// Rows in the source bitmap
    pub source_height: usize,
}

impl ClippedRect {
    /// Minimum bitmap length for the requested rectangle
    ///
    /// `None` when the length does not fit in `usize`.
    pub fn required_source_len(&self) -> Option<usize> {
        self.source_stride.checked_mul(self.source_height)
    }

    /// Index into the source bitmap for destination `row` and byte `column`
    ///
    /// With `mirror_y` the source is read bottom-up.
    pub fn source_index(&self, row: usize, column: usize, mirror_y: bool) -> usize {
        let source_row = row + usize::from(self.source_offset_y);
        let source_row = if mirror_y {
            self.source_height - 1 - source_row
        } else {
            source_row
        };
        column + usize::from(self.source_offset_x / 8) + source_row * self.source_stride
    }
}

/// Map `requested` onto a byte-aligned window inside the panel
///
/// `x` is aligned down to a multiple of 8 and the width is rounded up to
/// whole bytes; the source bitmap is assumed to be padded the same way.
/// Returns `None` when nothing of the rectangle lands on the panel.
pub fn clip(requested: Rect, dims: &Dimensions) -> Option<ClippedRect> {
    if requested.w <= 0 || requested.h <= 0 {
        return None;
    }
    let panel_w = i64::from(dims.width);
    let panel_h = i64::from(dims.height);

    let width_bytes = (i64::from(requested.w) + 7) / 8;
    let x = i64::from(requested.x) - i64::from(requested.x.rem_euclid(8));
    let w = width_bytes * 8;
    let (y, h) = (i64::from(requested.y), i64::from(requested.h));

    let x1 = x.max(0);
    let y1 = y.max(0);
    let dx = x1 - x;
    let dy = y1 - y;
    let w1 = (x + w).min(panel_w) - x - dx;
    let h1 = (y + h).min(panel_h) - y - dy;
    if w1 <= 0 || h1 <= 0 {
        return None;
    }

    // Offsets are below the rectangle size and the window inside the panel.
    Some(ClippedRect {
        window: Window {
            x: x1 as u16,
            y: y1 as u16,
            w: w1 as u16,
            h: h1 as u16,
        },
        source_offset_x: dx as u16,
        source_offset_y: dy as u16,
        source_stride: width_bytes as usize,
        source_height: h as usize,
    })
}

/// Smallest byte-aligned window covering the on-panel part of `requested`
///
/// Used to address a refresh, where no source bitmap is involved, so the
/// window grows outwards instead of skipping source bytes.
pub fn cover(requested: Rect, dims: &Dimensions) -> Option<Window> {
    let panel_w = i32::from(dims.width);
    let panel_h = i32::from(dims.height);

    let x1 = requested.x.max(0);
    let y1 = requested.y.max(0);
    let x2 = requested.x.saturating_add(requested.w).min(panel_w);
    let y2 = requested.y.saturating_add(requested.h).min(panel_h);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    let x_start = x1 - x1 % 8;
    let x_end = (x2 + 7) / 8 * 8;
    Some(Window {
        x: x_start as u16,
        y: y1 as u16,
        w: (x_end - x_start) as u16,
        h: (y2 - y1) as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Dimensions {
        Dimensions::new(128, 250, 122).unwrap()
    }

    #[test]
    fn test_clip_full_panel_is_identity() {
        let clipped = clip(Rect::full(&dims()), &dims()).unwrap();
        assert!(clipped.window.is_full_panel(&dims()));
        assert_eq!(clipped.source_offset_x, 0);
        assert_eq!(clipped.source_offset_y, 0);
        assert_eq!(clipped.source_stride, 16);
        assert_eq!(clipped.required_source_len(), Some(16 * 250));
    }

    #[test]
    fn test_clip_outside_panel_is_empty() {
        let d = dims();
        for rect in [
            Rect::new(128, 0, 8, 8),
            Rect::new(0, 250, 8, 8),
            Rect::new(-16, 0, 8, 8),
            Rect::new(0, -20, 8, 10),
            Rect::new(0, 0, 0, 10),
            Rect::new(0, 0, 8, -1),
            Rect::new(i32::MAX - 4, 0, 8, 8),
        ] {
            assert!(clip(rect, &d).is_none(), "{rect:?} should be empty");
        }
    }

    #[test]
    fn test_clip_is_byte_aligned_and_bounded() {
        let d = dims();
        for x in -20..140 {
            for (y, w, h) in [(-3, 1, 5), (0, 13, 250), (100, 64, 200), (249, 200, 10)] {
                let Some(clipped) = clip(Rect::new(x, y, w, h), &d) else {
                    continue;
                };
                let win = clipped.window;
                assert_eq!(win.x % 8, 0);
                assert_eq!(win.w % 8, 0);
                assert!(win.w > 0 && win.h > 0);
                assert!(win.x + win.w <= d.width);
                assert!(win.y + win.h <= d.height);
            }
        }
    }

    #[test]
    fn test_clip_unaligned_x_rounds_down() {
        let clipped = clip(Rect::new(13, 2, 10, 3), &dims()).unwrap();
        assert_eq!(clipped.window.x, 8);
        assert_eq!(clipped.window.w, 16);
        assert_eq!(clipped.source_stride, 2);
    }

    #[test]
    fn test_clip_records_top_left_overhang() {
        let clipped = clip(Rect::new(-16, -3, 32, 10), &dims()).unwrap();
        assert_eq!(clipped.window, Window { x: 0, y: 0, w: 16, h: 7 });
        assert_eq!(clipped.source_offset_x, 16);
        assert_eq!(clipped.source_offset_y, 3);
        // First destination byte comes from source column 2, row 3
        assert_eq!(clipped.source_index(0, 0, false), 2 + 3 * 4);
    }

    #[test]
    fn test_clip_bottom_right_overhang() {
        let clipped = clip(Rect::new(120, 245, 16, 10), &dims()).unwrap();
        assert_eq!(clipped.window, Window { x: 120, y: 245, w: 8, h: 5 });
        assert_eq!(clipped.source_offset_x, 0);
        assert_eq!(clipped.source_stride, 2);
    }

    #[test]
    fn test_source_index_mirrored() {
        let clipped = clip(Rect::new(0, 0, 16, 4), &dims()).unwrap();
        assert_eq!(clipped.source_index(0, 1, true), 1 + 3 * 2);
        assert_eq!(clipped.source_index(3, 0, true), 0);
        assert_eq!(clipped.source_index(3, 0, false), 6);
    }

    #[test]
    fn test_source_index_mirrored_with_top_trim() {
        let clipped = clip(Rect::new(0, -1, 8, 3), &dims()).unwrap();
        assert_eq!(clipped.source_offset_y, 1);
        assert_eq!(clipped.source_index(0, 0, true), 1);
        assert_eq!(clipped.source_index(1, 0, true), 0);
        assert_eq!(clipped.source_index(0, 0, false), 1);
    }

    #[test]
    fn test_required_source_len_overflow_is_none() {
        let clipped = ClippedRect {
            window: Window { x: 0, y: 0, w: 8, h: 1 },
            source_offset_x: 0,
            source_offset_y: 0,
            source_stride: usize::MAX / 2 + 1,
            source_height: 2,
        };
        assert_eq!(clipped.required_source_len(), None);
    }

    #[test]
    fn test_window_byte_bounds() {
        let win = Window { x: 16, y: 10, w: 24, h: 5 };
        assert_eq!(win.x_start_byte(), 2);
        assert_eq!(win.x_end_byte(), 4);
        assert_eq!(win.y_end(), 14);
        assert_eq!(win.width_bytes(), 3);
    }

    #[test]
    fn test_cover_grows_to_byte_boundaries() {
        let win = cover(Rect::new(3, 0, 8, 8), &dims()).unwrap();
        assert_eq!(win, Window { x: 0, y: 0, w: 16, h: 8 });
        let win = cover(Rect::new(0, 0, 8, 8), &dims()).unwrap();
        assert_eq!((win.x_start_byte(), win.x_end_byte(), win.y_end()), (0, 0, 7));
    }

    #[test]
    fn test_cover_clamps_and_rejects_off_panel() {
        let win = cover(Rect::new(-10, 240, 300, 300), &dims()).unwrap();
        assert_eq!(win, Window { x: 0, y: 240, w: 128, h: 10 });
        assert!(cover(Rect::new(0, 300, 8, 8), &dims()).is_none());
    }
}
