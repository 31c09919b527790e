//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait, the transport the
//! driver talks through, and the [`Interface`] struct implementing it over
//! embedded-hal SPI and GPIO.
//!
//! ## Hardware Requirements
//!
//! - SPI bus (MOSI + SCK, chip select handled by the [`SpiDevice`])
//! - 3 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, polarity per panel)
//!   - **BUSY**: Busy status (input, polarity per panel)
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use monoepd::{DisplayInterface, Interface, PanelCapabilities};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! let caps = PanelCapabilities::LCMEN2R13EFC1;
//! let mut interface = Interface::for_panel(MockSpi, MockPin, MockPin, MockPin, &caps);
//!
//! let _ = interface.send_command(0x04); // Power on
//! let _ = interface.wait_until_ready(&mut delay, 200);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::config::{Level, PanelCapabilities};

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Transport port between the driver and the controller
///
/// Ordered command/data writes, reset line control and a bounded busy wait.
/// Implement this on your own type for non-standard wiring; otherwise use
/// [`Interface`].
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send a command byte (DC low)
    #[allow(clippy::type_complexity)]
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes (DC high)
    #[allow(clippy::type_complexity)]
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Drive the reset line to `level`
    #[allow(clippy::type_complexity)]
    fn set_reset_line(&mut self, level: Level) -> InterfaceResult<(), Self::Error>;

    /// Poll BUSY until the controller is idle or `timeout_ms` elapses
    ///
    /// Returns `Ok(true)` once ready and `Ok(false)` on timeout. A timeout
    /// is not an error: the hardware offers no other completion signal, so
    /// the caller decides how to carry on.
    #[allow(clippy::type_complexity)]
    fn wait_until_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Poll interval while waiting on BUSY, in milliseconds
pub const BUSY_POLL_INTERVAL_MS: u32 = 1;

/// Hardware interface over embedded-hal v1.0
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin
    rst: RST,
    /// Busy pin
    busy: BUSY,
    /// Level of BUSY while the controller is working
    busy_active_level: Level,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface with an active-high BUSY line
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            busy_active_level: Level::High,
        }
    }

    /// Create a new Interface with the BUSY polarity of `caps`
    pub fn for_panel(spi: SPI, dc: DC, rst: RST, busy: BUSY, caps: &PanelCapabilities) -> Self {
        let mut interface = Self::new(spi, dc, rst, busy);
        interface.busy_active_level = caps.busy_active_level;
        interface
    }

    /// Set busy pin polarity
    pub fn set_busy_active_level(&mut self, level: Level) -> &mut Self {
        self.busy_active_level = level;
        self
    }

    /// Get busy pin polarity
    pub fn busy_active_level(&self) -> Level {
        self.busy_active_level
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn set_reset_line(&mut self, level: Level) -> InterfaceResult<(), Self::Error> {
        match level {
            Level::Low => self.rst.set_low(),
            Level::High => self.rst.set_high(),
        }
        .map_err(InterfaceError::Pin)
    }

    fn wait_until_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error> {
        let mut waited_ms = 0u32;

        loop {
            let is_busy = match self.busy_active_level {
                Level::High => self.busy.is_high(),
                Level::Low => self.busy.is_low(),
            }
            .map_err(InterfaceError::Pin)?;

            if !is_busy {
                return Ok(true);
            }
            if waited_ms >= timeout_ms {
                return Ok(false);
            }

            delay.delay_ms(BUSY_POLL_INTERVAL_MS);
            waited_ms = waited_ms.saturating_add(BUSY_POLL_INTERVAL_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;
    use embedded_hal::spi::ErrorType as SpiErrorType;

    #[derive(Debug)]
    struct MockSpi {
        written: alloc::vec::Vec<u8>,
    }

    #[derive(Debug)]
    struct MockPin {
        high: bool,
        busy_polls_left: u32,
    }

    #[derive(Debug, Clone, Copy)]
    struct MockError;

    impl embedded_hal::digital::Error for MockError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::Error for MockError {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    impl SpiErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(
            &mut self,
            operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let embedded_hal::spi::Operation::Write(bytes) = op {
                    self.written.extend_from_slice(bytes);
                }
            }
            Ok(())
        }
    }

    impl ErrorType for MockPin {
        type Error = MockError;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    // Reports busy (high) for `busy_polls_left` polls, then idle (low).
    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.busy_polls_left > 0 {
                self.busy_polls_left -= 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn pin(busy_polls_left: u32) -> MockPin {
        MockPin {
            high: false,
            busy_polls_left,
        }
    }

    fn interface(busy_polls: u32) -> Interface<MockSpi, MockPin, MockPin, MockPin> {
        Interface::new(
            MockSpi {
                written: alloc::vec::Vec::new(),
            },
            pin(0),
            pin(0),
            pin(busy_polls),
        )
    }

    #[test]
    fn test_wait_until_ready_returns_true_once_idle() {
        let mut interface = interface(3);
        let mut delay = CountingDelay { total_ns: 0 };
        assert!(interface.wait_until_ready(&mut delay, 100).unwrap());
        assert_eq!(delay.total_ns, 3_000_000);
    }

    #[test]
    fn test_wait_until_ready_times_out_without_error() {
        let mut interface = interface(u32::MAX);
        let mut delay = CountingDelay { total_ns: 0 };
        assert!(!interface.wait_until_ready(&mut delay, 5).unwrap());
        assert_eq!(delay.total_ns, 5_000_000);
    }

    #[test]
    fn test_active_low_busy_polarity() {
        // BUSY reads high (idle for an active-low panel) for a few polls.
        let mut interface = interface(2);
        interface.set_busy_active_level(Level::Low);
        let mut delay = CountingDelay { total_ns: 0 };
        assert!(interface.wait_until_ready(&mut delay, 100).unwrap());
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn test_for_panel_takes_busy_level() {
        let caps = PanelCapabilities::LCMEN2R13EFC1;
        let interface = Interface::for_panel(
            MockSpi {
                written: alloc::vec::Vec::new(),
            },
            pin(0),
            pin(0),
            pin(0),
            &caps,
        );
        assert_eq!(interface.busy_active_level(), Level::Low);
    }

    #[test]
    fn test_command_and_data_reach_the_bus() {
        let mut interface = interface(0);
        interface.send_command(0x12).unwrap();
        interface.send_data(&[0xAA, 0x55]).unwrap();
        interface.set_reset_line(Level::Low).unwrap();
        let (spi, dc, rst, _) = interface.release();
        assert_eq!(spi.written, alloc::vec![0x12, 0xAA, 0x55]);
        assert!(dc.high);
        assert!(!rst.high);
    }
}
