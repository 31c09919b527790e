//! Monochrome E-Paper Display Driver
//!
//! A driver for small black/white e-paper panels on the JD79656 and SSD1680
//! controllers, with full and fast (differential) refresh.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Presets for the LCMEN2R13EFC1 (2.13", 122x250) and DEPG0290BNS800 (2.9", 128x296)
//! - Windowed image writes with clipping to the panel
//! - Region refresh on controllers that support it
//! - Busy timeout diagnostics instead of hangs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use monoepd::{Display, Image, Interface, PanelCapabilities, Rect, RefreshMode};
//!
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
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let caps = PanelCapabilities::LCMEN2R13EFC1;
//! let interface = Interface::for_panel(spi, dc, rst, busy, &caps);
//! let mut display = Display::new(interface, caps);
//!
//! // An 8x8 black square in the top-left corner
//! let square = [0x00u8; 8];
//! let _ = display.write_image(&Image::new(&square, Rect::new(0, 0, 8, 8)), &mut delay);
//! let _ = display.refresh_region(Rect::new(0, 0, 8, 8), &mut delay);
//!
//! // Keep the previous plane in step for the next fast refresh
//! let _ = display.write_image_again(&Image::new(&square, Rect::new(0, 0, 8, 8)), &mut delay);
//! let _ = display.refresh(RefreshMode::Fast, &mut delay);
//! let _ = display.power_off(&mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Monochrome pixel colors
pub mod color;
/// Controller command definitions
pub mod command;
/// Panel capabilities and builder
pub mod config;
/// Controller state machine
pub mod controller;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Rectangle clipping
pub mod geometry;
/// Hardware interface abstraction
pub mod interface;
/// Refresh waveforms
pub mod lut;
/// Memory plane writes
pub mod plane;
/// Coordinate rotation utilities
pub mod rotation;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::Color;
pub use command::Controller;
pub use config::{AutoPowerOff, Builder, BusyTimeouts, Dimensions, Level, PanelCapabilities};
pub use controller::{Diagnostics, DriverState, HardwareTimeout, PanelController, UpdateMode};
pub use display::{Display, RefreshMode};
pub use error::{BuilderError, Error};
pub use geometry::{ClippedRect, Rect, Window};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface};
pub use lut::Waveform;
pub use plane::{Image, Plane, WriteOutcome};
pub use rotation::Rotation;

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
