//! Plane writer
//!
//! The controller keeps two 1-bit images: the one to show next
//! ([`Plane::Current`]) and the one currently on the glass
//! ([`Plane::Previous`]). A fast refresh drives only the pixels that differ
//! between the two, so both have to be right before it runs.
//!
//! Bits set to 1 are white.

use embedded_hal::delay::DelayNs;
use log::{debug, trace};

use crate::command::{Controller, PartialWindow, RamWindow, jd79656, ssd1680};
use crate::controller::PanelController;
use crate::error::Error;
use crate::geometry::{ClippedRect, Rect, Window, clip};
use crate::interface::DisplayInterface;

type PlaneResult<I> = core::result::Result<(), Error<I>>;

/// Bytes buffered before each bus transfer
const CHUNK_SIZE: usize = 64;

/// Bound for the wait after terminating a RAM write
const DATA_STOP_TIMEOUT_MS: u32 = 200;

/// Fill byte for a blank (white) plane
pub const WHITE: u8 = 0xFF;

/// One of the two on-controller image memories
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    /// Image shown by the next refresh
    Current,
    /// Image the next fast refresh starts from
    Previous,
}

impl Plane {
    /// Write command for this plane on `controller`
    pub fn command(self, controller: Controller) -> u8 {
        match (controller, self) {
            (Controller::Jd79656, Self::Current) => jd79656::WRITE_NEW_DATA,
            (Controller::Jd79656, Self::Previous) => jd79656::WRITE_OLD_DATA,
            (Controller::Ssd1680, Self::Current) => ssd1680::WRITE_RAM_BW,
            (Controller::Ssd1680, Self::Previous) => ssd1680::WRITE_RAM_RED,
        }
    }
}

/// A 1bpp bitmap and where it goes on the panel
///
/// Rows are packed 8 pixels per byte, MSB first, padded to whole bytes.
///
/// ## Example
///
/// ```
/// use monoepd::{Image, Rect};
///
/// let icon = [0u8; 2 * 16];
/// let image = Image::new(&icon, Rect::new(8, 8, 16, 16)).invert(true);
/// assert!(image.invert);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Image<'a> {
    /// Pixel data
    pub bitmap: &'a [u8],
    /// Target rectangle, also the bitmap's size
    pub rect: Rect,
    /// Write every byte inverted
    pub invert: bool,
    /// Read the bitmap bottom row first
    pub mirror_y: bool,
}

impl<'a> Image<'a> {
    /// Create an image at `rect`
    pub fn new(bitmap: &'a [u8], rect: Rect) -> Self {
        Self {
            bitmap,
            rect,
            invert: false,
            mirror_y: false,
        }
    }

    /// Set inversion
    #[must_use]
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Set vertical mirroring
    #[must_use]
    pub fn mirror_y(mut self, mirror_y: bool) -> Self {
        self.mirror_y = mirror_y;
        self
    }
}

/// Result of a plane write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Bytes were written to this window
    Written(ClippedRect),
    /// The rectangle lies entirely off the panel, nothing was sent
    EmptyRegion,
}

impl<I> PanelController<I>
where
    I: DisplayInterface,
{
    /// Write `image` into `plane`
    ///
    /// Memory that was never initialized is filled white first, so the part
    /// of the plane outside the window is defined.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPartialWrite` for a window smaller than the
    /// panel on a controller that only takes full images, and
    /// `Error::BufferTooSmall` when the bitmap is shorter than its rectangle.
    pub fn write_plane<D: DelayNs>(
        &mut self,
        plane: Plane,
        image: &Image<'_>,
        delay: &mut D,
    ) -> core::result::Result<WriteOutcome, Error<I>> {
        let caps = *self.capabilities();
        let dims = caps.dimensions;

        let Some(clipped) = self.check_image(image)? else {
            trace!("{:?} is off the panel", image.rect);
            return Ok(WriteOutcome::EmptyRegion);
        };
        let window = clipped.window;

        if !self.state().initial_write_done {
            debug!("memory planes uninitialized, filling white");
            self.fill_plane(Plane::Current, WHITE, delay)?;
            self.fill_plane(Plane::Previous, WHITE, delay)?;
            self.state_mut().initial_write_done = true;
        }

        let windowed = caps.controller == Controller::Ssd1680 || caps.supports_partial_update;
        if windowed {
            self.address_window(window)?;
        }
        self.send_command(plane.command(caps.controller))?;

        let padding_column = dims
            .has_padding_column()
            .then_some(usize::from(dims.width_bytes() - 1));
        let first_column = usize::from(window.x_start_byte());
        let mut chunk = [0u8; CHUNK_SIZE];
        let mut len = 0;
        for row in 0..usize::from(window.h) {
            for column in 0..window.width_bytes() {
                let mut byte = image.bitmap[clipped.source_index(row, column, image.mirror_y)];
                if image.invert {
                    byte = !byte;
                }
                if padding_column == Some(first_column + column) {
                    byte = WHITE;
                }
                chunk[len] = byte;
                len += 1;
                if len == CHUNK_SIZE {
                    self.send_data(&chunk)?;
                    len = 0;
                }
            }
        }
        if len > 0 {
            self.send_data(&chunk[..len])?;
        }

        self.finish_ram_write(delay)?;
        if windowed {
            self.leave_window()?;
        }
        Ok(WriteOutcome::Written(clipped))
    }

    /// Resolve where `image` lands without touching the bus
    ///
    /// Returns `Ok(None)` for a rectangle entirely off the panel.
    ///
    /// # Errors
    ///
    /// Same as [`write_plane`](Self::write_plane).
    pub fn check_image(
        &self,
        image: &Image<'_>,
    ) -> core::result::Result<Option<ClippedRect>, Error<I>> {
        let caps = self.capabilities();
        let dims = caps.dimensions;

        let Some(clipped) = clip(image.rect, &dims) else {
            return Ok(None);
        };
        let window = clipped.window;
        if !caps.supports_partial_update && !window.is_full_panel(&dims) {
            return Err(Error::UnsupportedPartialWrite {
                x: window.x,
                y: window.y,
                w: window.w,
                h: window.h,
            });
        }
        let provided = image.bitmap.len();
        match clipped.required_source_len() {
            Some(required) if provided >= required => Ok(Some(clipped)),
            required => Err(Error::BufferTooSmall {
                required: required.unwrap_or(usize::MAX),
                provided,
            }),
        }
    }

    /// Fill the whole of `plane` with `value`
    pub fn fill_plane<D: DelayNs>(
        &mut self,
        plane: Plane,
        value: u8,
        delay: &mut D,
    ) -> PlaneResult<I> {
        let caps = *self.capabilities();
        trace!("filling {plane:?} plane with {value:#04x}");
        if caps.controller == Controller::Ssd1680 {
            self.address_window(Window::full(&caps.dimensions))?;
        }
        self.send_command(plane.command(caps.controller))?;

        let chunk = [value; CHUNK_SIZE];
        let mut remaining = caps.dimensions.buffer_size();
        while remaining > 0 {
            let len = remaining.min(CHUNK_SIZE);
            self.send_data(&chunk[..len])?;
            remaining -= len;
        }
        self.finish_ram_write(delay)
    }

    /// Point subsequent plane writes (and on the JD79656, refreshes) at `window`
    pub(crate) fn address_window(&mut self, window: Window) -> PlaneResult<I> {
        let caps = *self.capabilities();
        match caps.controller {
            Controller::Jd79656 => {
                let partial = PartialWindow {
                    x_start: window.x_start_byte(),
                    x_end: window.x_end_byte(),
                    y_start: window.y,
                    y_end: window.y_end(),
                    scan_inside: true,
                };
                trace!(
                    "partial window x bytes {}..={}, rows {}..={}",
                    partial.x_start, partial.x_end, partial.y_start, partial.y_end
                );
                self.send_command(jd79656::PARTIAL_IN)?;
                self.command(jd79656::PARTIAL_WINDOW, &partial.encode())?;
                self.state_mut().using_partial_mode = true;
            }
            Controller::Ssd1680 => {
                // Builder::build keeps both ends within the 8-bit RAM X range.
                let offset = u16::from(caps.ram_x_offset_bytes);
                let ram = RamWindow {
                    x_start: (window.x_start_byte() + offset) as u8,
                    x_end: (window.x_end_byte() + offset) as u8,
                    y_start: window.y,
                    y_end: window.y_end(),
                };
                trace!(
                    "RAM window x bytes {}..={}, rows {}..={}",
                    ram.x_start, ram.x_end, ram.y_start, ram.y_end
                );
                self.command(ssd1680::SET_RAM_X_RANGE, &ram.encode_x_range())?;
                self.command(ssd1680::SET_RAM_Y_RANGE, &ram.encode_y_range())?;
                self.command(ssd1680::SET_RAM_X_COUNTER, &ram.encode_x_counter())?;
                self.command(ssd1680::SET_RAM_Y_COUNTER, &ram.encode_y_counter())?;
                let full = window.is_full_panel(&caps.dimensions);
                self.state_mut().using_partial_mode = !full;
            }
        }
        Ok(())
    }

    /// Undo [`address_window`](Self::address_window) where the controller needs it
    pub(crate) fn leave_window(&mut self) -> PlaneResult<I> {
        if self.capabilities().controller == Controller::Jd79656 {
            self.send_command(jd79656::PARTIAL_OUT)?;
            self.state_mut().using_partial_mode = false;
        }
        Ok(())
    }

    fn finish_ram_write<D: DelayNs>(&mut self, delay: &mut D) -> PlaneResult<I> {
        if self.capabilities().controller == Controller::Ssd1680 {
            self.send_command(ssd1680::NOP)?;
            self.wait_ready(delay, "data stop", DATA_STOP_TIMEOUT_MS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions, PanelCapabilities};
    use crate::interface::mock::{MockDelay, MockInterface};

    fn controller(caps: PanelCapabilities) -> PanelController<MockInterface> {
        let mut controller = PanelController::new(MockInterface::new(), caps);
        controller.state_mut().initial_write_done = true;
        controller
    }

    #[test]
    fn test_plane_commands() {
        assert_eq!(Plane::Current.command(Controller::Jd79656), 0x13);
        assert_eq!(Plane::Previous.command(Controller::Jd79656), 0x10);
        assert_eq!(Plane::Current.command(Controller::Ssd1680), 0x24);
        assert_eq!(Plane::Previous.command(Controller::Ssd1680), 0x26);
    }

    #[test]
    fn test_off_panel_write_touches_nothing() {
        let mut controller = controller(PanelCapabilities::LCMEN2R13EFC1);
        controller.state_mut().initial_write_done = false;
        let bitmap = [0u8; 8];
        let outcome = controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(300, 0, 8, 8)),
                &mut MockDelay,
            )
            .unwrap();
        assert_eq!(outcome, WriteOutcome::EmptyRegion);
        assert!(controller.interface().commands.is_empty());
    }

    #[test]
    fn test_first_write_fills_both_planes_white() {
        let mut controller = controller(PanelCapabilities::LCMEN2R13EFC1);
        controller.state_mut().initial_write_done = false;
        let bitmap = [0u8; 8];
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(0, 0, 8, 8)),
                &mut MockDelay,
            )
            .unwrap();
        let iface = controller.interface();
        let fills = iface.all_data(jd79656::WRITE_NEW_DATA);
        assert_eq!(fills[0].len(), 16 * 250);
        assert!(fills[0].iter().all(|b| *b == 0xFF));
        let old = iface.last_data(jd79656::WRITE_OLD_DATA).unwrap();
        assert_eq!(old.len(), 16 * 250);
        assert!(old.iter().all(|b| *b == 0xFF));
        assert_eq!(fills[1], &[0u8; 8][..]);
        assert!(controller.state().initial_write_done);
    }

    #[test]
    fn test_window_write_round_trips_bytes() {
        let mut controller = controller(PanelCapabilities::LCMEN2R13EFC1);
        let bitmap: alloc::vec::Vec<u8> = (0..2 * 4).collect();
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(16, 4, 16, 4)),
                &mut MockDelay,
            )
            .unwrap();
        let iface = controller.interface();
        assert_eq!(
            iface.commands,
            alloc::vec![
                jd79656::PARTIAL_IN,
                jd79656::PARTIAL_WINDOW,
                jd79656::WRITE_NEW_DATA,
                jd79656::PARTIAL_OUT
            ]
        );
        assert_eq!(
            iface.last_data(jd79656::PARTIAL_WINDOW),
            Some(&[0x10, 0x1F, 0, 4, 0, 7, 1][..])
        );
        assert_eq!(
            iface.last_data(jd79656::WRITE_NEW_DATA),
            Some(&bitmap[..])
        );
        assert!(!controller.state().using_partial_mode);
    }

    #[test]
    fn test_invert_and_padding_column() {
        let mut controller = controller(PanelCapabilities::LCMEN2R13EFC1);
        let bitmap = [0x0Fu8, 0xA0, 0x00, 0x3C];
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(112, 0, 16, 2)).invert(true),
                &mut MockDelay,
            )
            .unwrap();
        // Column 15 is the padding column of a 122-pixel-wide panel
        assert_eq!(
            controller.interface().last_data(jd79656::WRITE_NEW_DATA),
            Some(&[0xF0, 0xFF, 0xFF, 0xFF][..])
        );
    }

    #[test]
    fn test_no_padding_without_invert_on_full_width_panel() {
        let mut controller = controller(PanelCapabilities::DEPG0290BNS800);
        let bitmap = [0x0Fu8, 0xA0];
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(112, 0, 16, 1)),
                &mut MockDelay,
            )
            .unwrap();
        assert_eq!(
            controller.interface().last_data(ssd1680::WRITE_RAM_BW),
            Some(&[0x0F, 0xA0][..])
        );
    }

    #[test]
    fn test_mirrored_rows() {
        let mut controller = controller(PanelCapabilities::DEPG0290BNS800);
        let bitmap = [1u8, 2, 3];
        controller
            .write_plane(
                Plane::Previous,
                &Image::new(&bitmap, Rect::new(0, 0, 8, 3)).mirror_y(true),
                &mut MockDelay,
            )
            .unwrap();
        assert_eq!(
            controller.interface().last_data(ssd1680::WRITE_RAM_RED),
            Some(&[3, 2, 1][..])
        );
    }

    #[test]
    fn test_mirrored_rows_with_top_overhang() {
        let mut controller = controller(PanelCapabilities::DEPG0290BNS800);
        // Row 0 of the source sits above the panel and is clipped away
        let bitmap = [10u8, 20, 30];
        let outcome = controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(0, -1, 8, 3)).mirror_y(true),
                &mut MockDelay,
            )
            .unwrap();
        assert!(matches!(
            outcome,
            WriteOutcome::Written(clipped) if clipped.source_offset_y == 1 && clipped.window.h == 2
        ));
        assert_eq!(
            controller.interface().last_data(ssd1680::WRITE_RAM_BW),
            Some(&[20, 10][..])
        );
    }

    #[test]
    fn test_clipped_write_skips_source_overhang() {
        let mut controller = controller(PanelCapabilities::DEPG0290BNS800);
        // 3 bytes wide, 3 rows, starting one byte left of and one row above the panel
        let bitmap = [0u8, 1, 2, 10, 11, 12, 20, 21, 22];
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(-8, -1, 24, 3)),
                &mut MockDelay,
            )
            .unwrap();
        assert_eq!(
            controller.interface().last_data(ssd1680::WRITE_RAM_BW),
            Some(&[11, 12, 21, 22][..])
        );
    }

    #[test]
    fn test_ssd1680_window_includes_x_offset_and_data_stop() {
        let mut controller = controller(PanelCapabilities::DEPG0290BNS800);
        let bitmap = [0u8; 2 * 10];
        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::new(8, 280, 16, 10)),
                &mut MockDelay,
            )
            .unwrap();
        let iface = controller.interface();
        assert_eq!(iface.last_data(ssd1680::SET_RAM_X_RANGE), Some(&[2, 3][..]));
        assert_eq!(
            iface.last_data(ssd1680::SET_RAM_Y_RANGE),
            Some(&[24, 1, 33, 1][..])
        );
        assert_eq!(iface.last_data(ssd1680::SET_RAM_X_COUNTER), Some(&[2][..]));
        assert_eq!(iface.last_data(ssd1680::SET_RAM_Y_COUNTER), Some(&[24, 1][..]));
        assert_eq!(iface.commands.last(), Some(&ssd1680::NOP));
        assert_eq!(iface.waits, alloc::vec![DATA_STOP_TIMEOUT_MS]);
    }

    #[test]
    fn test_short_bitmap_is_rejected() {
        let mut controller = controller(PanelCapabilities::LCMEN2R13EFC1);
        let bitmap = [0u8; 10];
        let result = controller.write_plane(
            Plane::Current,
            &Image::new(&bitmap, Rect::new(0, 0, 16, 8)),
            &mut MockDelay,
        );
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: 16,
                provided: 10
            })
        ));
    }

    #[test]
    fn test_full_image_only_controller_rejects_windows() {
        let dims = Dimensions::new(128, 250, 122).unwrap();
        let caps = Builder::new(Controller::Jd79656)
            .dimensions(dims)
            .supports_partial_update(false)
            .build()
            .unwrap();
        let mut controller = controller(caps);
        let bitmap = alloc::vec![0u8; dims.buffer_size()];

        let result = controller.write_plane(
            Plane::Current,
            &Image::new(&bitmap, Rect::new(0, 0, 64, 64)),
            &mut MockDelay,
        );
        assert!(matches!(
            result,
            Err(Error::UnsupportedPartialWrite { w: 64, h: 64, .. })
        ));

        controller
            .write_plane(
                Plane::Current,
                &Image::new(&bitmap, Rect::full(&dims)),
                &mut MockDelay,
            )
            .unwrap();
        assert_eq!(
            controller.interface().commands,
            alloc::vec![jd79656::WRITE_NEW_DATA]
        );
    }
}
