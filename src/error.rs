//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! Two outcomes are deliberately not errors:
//!
//! - a write whose rectangle lies entirely off the panel returns
//!   [`WriteOutcome::EmptyRegion`](crate::plane::WriteOutcome::EmptyRegion)
//! - a busy wait that runs out is recorded in
//!   [`Diagnostics`](crate::controller::Diagnostics) and the driver proceeds
//!
//! ## Example
//!
//! ```
//! use monoepd::{Builder, BuilderError, Controller, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new(Controller::Ssd1680).build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Width must be byte aligned
//! let result = Dimensions::new(122, 250, 122);
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;

/// Errors that can occur when driving the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// A windowed write was requested on a controller that only accepts
    /// full-panel images
    ///
    /// Carries the clipped rectangle that was rejected.
    UnsupportedPartialWrite {
        /// X coordinate in pixels
        x: u16,
        /// Y coordinate in pixels
        y: u16,
        /// Width in pixels
        w: u16,
        /// Height in pixels
        h: u16,
    },
    /// The controller cannot do what was asked
    ///
    /// Returned by `hibernate()` on panels whose fast refresh needs the
    /// memory planes that deep sleep would wipe. The panel is powered off
    /// instead.
    NotSupported,
    /// Source bitmap is shorter than the rectangle it claims to cover
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::UnsupportedPartialWrite { x, y, w, h } => write!(
                f,
                "Controller only accepts full-panel writes: x={x}, y={y}, w={w}, h={h}"
            ),
            Self::NotSupported => write!(f, "Operation not supported by this controller"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building panel capabilities
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Addressable width requested
        width: u16,
        /// Height requested
        height: u16,
    },
    /// Visible width is zero or exceeds the addressable width
    InvalidVisibleWidth {
        /// Addressable width
        width: u16,
        /// Visible width requested
        visible_width: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (width must be a non-zero multiple of 8)"
            ),
            Self::InvalidVisibleWidth {
                width,
                visible_width,
            } => write!(
                f,
                "Invalid visible width {visible_width} for addressable width {width}"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
