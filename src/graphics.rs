//! Graphics support via embedded-graphics
//!
//! [`GraphicDisplay`] owns a full-panel frame buffer, implements
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) on it and
//! pushes it to the panel with [`flush`](GraphicDisplay::flush).
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//!     text::Text,
//! };
//! use monoepd::{Color, GraphicDisplay, RefreshMode};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use monoepd::{Display, Interface, PanelCapabilities};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let caps = PanelCapabilities::LCMEN2R13EFC1;
//! # let interface = Interface::for_panel(MockSpi, MockPin, MockPin, MockPin, &caps);
//! # let driver = Display::new(interface, caps);
//! # let mut delay = MockDelay;
//! let buffer = vec![0xFFu8; caps.dimensions.buffer_size()];
//! let mut display = GraphicDisplay::new(driver, buffer);
//!
//! display.clear(Color::White);
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Black))
//!     .draw(&mut display);
//! let _ = Circle::new(Point::new(60, 120), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Color::Black, 2))
//!     .draw(&mut display);
//! let _ = Text::new("Hello", Point::new(10, 200), MonoTextStyle::new(&FONT_6X10, Color::Black))
//!     .draw(&mut display);
//!
//! // The first flush clears the panel and runs a full refresh on its own
//! let _ = display.flush(RefreshMode::Fast, &mut delay);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};
use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::display::{Display, RefreshMode};
use crate::error::Error;
use crate::geometry::Rect;
use crate::interface::DisplayInterface;
use crate::plane::Image;
use crate::rotation::{Rotation, apply_rotation, rotated_size};

/// Display with a frame buffer
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B` - Buffer type implementing `AsMut<[u8]>`, at least one memory plane long
pub struct GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    display: Display<I>,
    buffer: B,
    rotation: Rotation,
}

type GraphicsResult<I> = core::result::Result<(), Error<I>>;

impl<I, B> GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// Create a new GraphicDisplay
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is shorter than one memory plane. The size never
    /// depends on rotation.
    pub fn new(display: Display<I>, mut buffer: B) -> Self {
        let required = display.dimensions().buffer_size();
        assert!(
            buffer.as_mut().len() >= required,
            "buffer too small: required {} bytes, got {}",
            required,
            buffer.as_mut().len()
        );
        Self {
            display,
            buffer,
            rotation: Rotation::default(),
        }
    }

    /// Fallible version of [`new`](Self::new)
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `buffer` is shorter than one
    /// memory plane.
    pub fn try_new(display: Display<I>, mut buffer: B) -> core::result::Result<Self, Error<I>> {
        let required = display.dimensions().buffer_size();
        let provided = buffer.as_mut().len();
        if provided < required {
            return Err(Error::BufferTooSmall { required, provided });
        }
        Ok(Self {
            display,
            buffer,
            rotation: Rotation::default(),
        })
    }

    /// Fill the buffer with `color`
    pub fn clear(&mut self, color: Color) {
        self.buffer.as_mut().fill(color.byte());
    }

    /// Rotation applied to drawing
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Change the rotation applied to later drawing
    ///
    /// Pixels already in the buffer stay where they are.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Send the buffer to the panel and refresh it
    ///
    /// The buffer is written to both memory planes, so the next fast refresh
    /// only drives pixels drawn after this one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] if there's a communication error.
    pub fn flush<D: DelayNs>(&mut self, mode: RefreshMode, delay: &mut D) -> GraphicsResult<I> {
        let full = Rect::full(self.display.dimensions());
        let buffer: &[u8] = self.buffer.as_mut();
        self.display.write_image(&Image::new(buffer, full), delay)?;
        self.display.refresh(mode, delay)?;
        self.display.write_image_again(&Image::new(buffer, full), delay)?;
        Ok(())
    }

    /// Access the underlying Display
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Access the underlying Display mutably
    ///
    /// Use this for region refreshes, power control and hibernation.
    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let (index, bit) = apply_rotation(x, y, self.display.dimensions(), self.rotation);
        let Some(byte) = self.buffer.as_mut().get_mut(index) else {
            return;
        };
        match color {
            Color::Black => *byte &= !bit,
            Color::White => *byte |= bit,
        }
    }
}

impl<I, B> DrawTarget for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let x = x as u32;
            let y = y as u32;

            if x >= sz.width || y >= sz.height {
                continue;
            }

            self.set_pixel(x, y, color);
        }

        Ok(())
    }
}

impl<I, B> OriginDimensions for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (width, height) = rotated_size(self.display.dimensions(), self.rotation);
        Size::new(u32::from(width), u32::from(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::jd79656;
    use crate::config::PanelCapabilities;
    use crate::interface::mock::{MockDelay, MockInterface};
    use embedded_graphics::{
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    const PLANE: usize = 16 * 250;

    fn test_display() -> Display<MockInterface> {
        Display::new(MockInterface::new(), PanelCapabilities::LCMEN2R13EFC1)
    }

    fn graphic_display() -> GraphicDisplay<MockInterface, alloc::vec::Vec<u8>> {
        GraphicDisplay::new(test_display(), alloc::vec![0xFFu8; PLANE])
    }

    #[test]
    fn test_size_follows_rotation_over_visible_area() {
        let mut gd = graphic_display();
        assert_eq!(gd.size(), Size::new(122, 250));
        gd.set_rotation(Rotation::Rotate90);
        assert_eq!(gd.rotation(), Rotation::Rotate90);
        assert_eq!(gd.size(), Size::new(250, 122));
    }

    #[test]
    fn test_try_new_small_buffer_returns_error() {
        let result = GraphicDisplay::try_new(test_display(), alloc::vec![0u8; PLANE - 1]);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: PLANE,
                provided
            }) if provided == PLANE - 1
        ));
    }

    #[test]
    fn test_try_new_valid_buffer_succeeds() {
        assert!(GraphicDisplay::try_new(test_display(), alloc::vec![0u8; PLANE]).is_ok());
    }

    #[test]
    #[should_panic(expected = "buffer too small")]
    fn test_new_panics_on_small_buffer() {
        let _ = GraphicDisplay::new(test_display(), alloc::vec![0u8; PLANE - 1]);
    }

    #[test]
    fn test_draw_sets_bits_msb_first() {
        let mut gd = graphic_display();
        Rectangle::new(Point::new(0, 0), Size::new(4, 1))
            .into_styled(PrimitiveStyle::with_fill(Color::Black))
            .draw(&mut gd)
            .unwrap();
        assert_eq!(gd.buffer[0], 0x0F);
        assert_eq!(gd.buffer[16], 0xFF);
    }

    #[test]
    fn test_draw_outside_visible_area_is_ignored() {
        let mut gd = graphic_display();
        gd.draw_iter([
            Pixel(Point::new(-1, 0), Color::Black),
            Pixel(Point::new(122, 0), Color::Black),
            Pixel(Point::new(0, 250), Color::Black),
        ])
        .unwrap();
        assert!(gd.buffer.iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_clear() {
        let mut gd = graphic_display();
        gd.clear(Color::Black);
        assert!(gd.buffer.iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_flush_writes_both_planes() {
        let mut gd = graphic_display();
        gd.clear(Color::Black);
        gd.flush(RefreshMode::Full, &mut MockDelay).unwrap();

        let iface = gd.display().controller_interface();
        // Startup clear, then the frame refresh
        assert_eq!(iface.count(jd79656::DISPLAY_REFRESH), 2);
        let written = iface.last_data(jd79656::WRITE_OLD_DATA).unwrap();
        assert_eq!(written.len(), PLANE);
        assert_eq!(written[0], 0x00);
        // Padding column stays white
        assert_eq!(written[15], 0xFF);
        assert_eq!(iface.last_data(jd79656::WRITE_NEW_DATA), Some(written));
    }

    #[test]
    fn test_second_fast_flush_uses_fast_waveform() {
        let mut gd = graphic_display();
        gd.flush(RefreshMode::Fast, &mut MockDelay).unwrap();
        gd.flush(RefreshMode::Fast, &mut MockDelay).unwrap();
        let iface = gd.display().controller_interface();
        assert_eq!(iface.last_data(jd79656::VCOM_DATA_INTERVAL), Some(&[0xD7][..]));
        assert_eq!(iface.count(jd79656::LUT_VCOM), 1);
    }
}
