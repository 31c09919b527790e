//! Core display operations
//!
//! [`Display`] is the driver's public surface. It starts out knowing
//! nothing about the panel: the first image write clears the screen with a
//! full refresh, and fast refreshes are upgraded to full ones until that has
//! happened.

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::command::Controller;
use crate::config::{Dimensions, PanelCapabilities};
use crate::controller::{Diagnostics, DriverState, PanelController, UpdateMode};
use crate::error::Error;
use crate::geometry::{Rect, cover};
use crate::interface::DisplayInterface;
use crate::plane::{Image, Plane, WHITE, WriteOutcome};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Refresh mode for display updates
///
/// Different refresh modes trade off speed vs quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full refresh using the controller's stored waveform
    ///
    /// Flashes the whole panel. Best for: first image, periodic ghost cleanup.
    #[default]
    Full,
    /// Fast refresh using the driver's differential waveform
    ///
    /// Only pixels that differ from the previous plane are driven. May leave
    /// faint ghosting.
    Fast,
}

/// Display driver for one panel
///
/// Operations are synchronous and return once the panel is idle again.
/// For embedded-graphics support, use `GraphicDisplay` (requires `graphics`
/// feature).
pub struct Display<I>
where
    I: DisplayInterface,
{
    controller: PanelController<I>,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display; the panel is not touched until the first operation
    pub fn new(interface: I, caps: PanelCapabilities) -> Self {
        Self {
            controller: PanelController::new(interface, caps),
        }
    }

    /// Fill both memory planes with `fill` and run a full refresh
    ///
    /// The panel is powered off afterwards.
    pub fn clear_screen<D: DelayNs>(&mut self, fill: u8, delay: &mut D) -> DisplayResult<I> {
        debug!("clearing screen to {fill:#04x}");
        self.controller.state_mut().initial_refresh_done = false;
        self.fill_planes(fill, delay)?;
        self.full_refresh(delay)?;
        self.controller.power_off(delay)
    }

    /// Fill both memory planes with `fill` without refreshing
    pub fn write_screen_buffer<D: DelayNs>(&mut self, fill: u8, delay: &mut D) -> DisplayResult<I> {
        self.fill_planes(fill, delay)
    }

    /// Write an image into the current plane
    ///
    /// The first write after construction clears the screen with a full
    /// refresh first, since the panel content is unknown until then. A
    /// rejected image is rejected before that clear.
    ///
    /// # Errors
    ///
    /// See [`PanelController::write_plane`].
    pub fn write_image<D: DelayNs>(
        &mut self,
        image: &Image<'_>,
        delay: &mut D,
    ) -> core::result::Result<WriteOutcome, Error<I>> {
        self.controller.check_image(image)?;
        if !self.controller.state().initial_refresh_done {
            debug!("screen content unknown, clearing first");
            self.clear_screen(WHITE, delay)?;
        }
        self.controller.ensure_awake(delay)?;
        self.controller.write_plane(Plane::Current, image, delay)
    }

    /// Write an image into the previous plane
    ///
    /// Use this with what is on the glass right now before a fast refresh,
    /// so only changed pixels are driven.
    ///
    /// # Errors
    ///
    /// See [`PanelController::write_plane`].
    pub fn write_image_again<D: DelayNs>(
        &mut self,
        image: &Image<'_>,
        delay: &mut D,
    ) -> core::result::Result<WriteOutcome, Error<I>> {
        self.controller.ensure_awake(delay)?;
        self.controller.write_plane(Plane::Previous, image, delay)
    }

    /// Show the current plane on the whole panel
    ///
    /// A fast refresh runs as a full one until a full refresh has completed.
    pub fn refresh<D: DelayNs>(&mut self, mode: RefreshMode, delay: &mut D) -> DisplayResult<I> {
        match mode {
            RefreshMode::Full => self.full_refresh(delay),
            RefreshMode::Fast => {
                let full = Rect::full(self.dimensions());
                self.refresh_region(full, delay)
            }
        }
    }

    /// Fast refresh of the part of the panel under `rect`
    ///
    /// The region is widened to byte boundaries. On controllers that cannot
    /// address a refresh window, the whole panel is refreshed with the fast
    /// waveform, which only moves pixels that changed anyway.
    pub fn refresh_region<D: DelayNs>(&mut self, rect: Rect, delay: &mut D) -> DisplayResult<I> {
        let caps = *self.controller.capabilities();
        if !self.controller.state().initial_refresh_done {
            warn!("fast refresh requested before the first full refresh, running a full one");
            return self.full_refresh(delay);
        }
        if !caps.supports_fast_partial_update {
            warn!("fast refresh not supported by this panel, running a full one");
            return self.full_refresh(delay);
        }
        let Some(window) = cover(rect, &caps.dimensions) else {
            trace!("{rect:?} is off the panel, nothing to refresh");
            return Ok(());
        };

        let windowed = caps.controller == Controller::Jd79656
            && caps.supports_partial_update
            && !window.is_full_panel(&caps.dimensions);

        self.controller.ensure_awake(delay)?;
        self.controller.ensure_configured(UpdateMode::Partial, delay)?;
        if windowed {
            self.controller.address_window(window)?;
        }
        self.controller.trigger_update(UpdateMode::Partial, delay)?;
        if windowed {
            self.controller.leave_window()?;
        }
        Ok(())
    }

    /// Switch off the panel driving voltages
    ///
    /// Keeps the image from fading over time. Image memory is kept.
    pub fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.controller.power_off(delay)
    }

    /// Put the controller into deep sleep
    ///
    /// The next operation wakes it with a hardware reset.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotSupported` on panels whose fast refresh needs image
    /// memory that deep sleep would lose (the JD79656). Those are powered
    /// off instead and can keep using fast refresh.
    pub fn hibernate<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.controller.hibernate(delay)
    }

    /// Panel description
    pub fn capabilities(&self) -> &PanelCapabilities {
        self.controller.capabilities()
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.controller.capabilities().dimensions
    }

    /// Driver state
    pub fn state(&self) -> &DriverState {
        self.controller.state()
    }

    /// Busy timeouts and other recovered-from conditions
    pub fn diagnostics(&self) -> &Diagnostics {
        self.controller.diagnostics()
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.controller.release()
    }

    #[cfg(test)]
    pub(crate) fn controller_interface(&self) -> &I {
        self.controller.interface()
    }

    fn fill_planes<D: DelayNs>(&mut self, fill: u8, delay: &mut D) -> DisplayResult<I> {
        self.controller.ensure_awake(delay)?;
        self.controller.fill_plane(Plane::Current, fill, delay)?;
        self.controller.fill_plane(Plane::Previous, fill, delay)?;
        self.controller.state_mut().initial_write_done = true;
        Ok(())
    }

    fn full_refresh<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.controller.ensure_awake(delay)?;
        self.controller.ensure_configured(UpdateMode::Full, delay)?;
        self.controller.trigger_update(UpdateMode::Full, delay)?;
        self.controller.state_mut().initial_refresh_done = true;
        Ok(())
    }
}
