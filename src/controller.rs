//! Refresh state machine
//!
//! [`PanelController`] owns the transport and tracks what the controller
//! currently holds: whether driving voltages are up, which waveform is
//! loaded, whether it sleeps, and whether its memory planes hold anything
//! meaningful. Every transition is idempotent, so callers ask for the state
//! they need and the controller only talks to the panel when something has
//! to change.
//!
//! Busy waits never fail. A wait that runs out is logged, counted in
//! [`Diagnostics`] and the sequence carries on.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::command::{
    Controller, PanelSetting, UpdateSequence, VcomDataInterval, jd79656, ssd1680,
};
use crate::config::{AutoPowerOff, Level, PanelCapabilities};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::lut::{Transition, Waveform};

type ControllerResult<I> = core::result::Result<(), Error<I>>;

/// Settle time after releasing the reset line
const RESET_SETTLE_MS: u32 = 10;

/// Waveform program a refresh runs with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Complete waveform cycle
    Full,
    /// Short differential waveform
    Partial,
}

/// What the driver knows about the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DriverState {
    /// Panel driving voltages are generated
    pub power_on: bool,
    /// Controller is in deep sleep
    pub hibernating: bool,
    /// Waveform configuration currently loaded, if any
    pub configured_for: Option<UpdateMode>,
    /// Controller is addressed through a partial window
    pub using_partial_mode: bool,
    /// Memory planes were initialized since power-up or a memory loss
    pub initial_write_done: bool,
    /// A full refresh ran since the screen content became unknown
    pub initial_refresh_done: bool,
}

/// A busy wait that ran out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwareTimeout {
    /// Step that was waiting
    pub operation: &'static str,
    /// Bound that was exceeded
    pub timeout_ms: u32,
}

/// Counters for conditions the driver recovers from on its own
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Busy waits that ran out
    pub busy_timeouts: u32,
    /// Most recent busy timeout
    pub last_timeout: Option<HardwareTimeout>,
}

/// Refresh state machine over one panel
pub struct PanelController<I>
where
    I: DisplayInterface,
{
    interface: I,
    caps: PanelCapabilities,
    state: DriverState,
    diagnostics: Diagnostics,
    /// A hardware reset ran since construction
    reset_done: bool,
}

impl<I> PanelController<I>
where
    I: DisplayInterface,
{
    /// Create a controller; nothing is sent until the first transition
    pub fn new(interface: I, caps: PanelCapabilities) -> Self {
        Self {
            interface,
            caps,
            state: DriverState::default(),
            diagnostics: Diagnostics::default(),
            reset_done: false,
        }
    }

    /// Panel description
    pub fn capabilities(&self) -> &PanelCapabilities {
        &self.caps
    }

    /// Current state
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut DriverState {
        &mut self.state
    }

    /// Recovered-from conditions
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }

    #[cfg(test)]
    pub(crate) fn interface(&self) -> &I {
        &self.interface
    }

    #[cfg(test)]
    pub(crate) fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Send a command byte
    pub fn send_command(&mut self, command: u8) -> ControllerResult<I> {
        self.interface.send_command(command).map_err(Error::Interface)
    }

    /// Send data bytes
    pub fn send_data(&mut self, data: &[u8]) -> ControllerResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }

    /// Send a command followed by its parameters
    pub fn command(&mut self, command: u8, data: &[u8]) -> ControllerResult<I> {
        self.send_command(command)?;
        self.send_data(data)
    }

    /// Wait for BUSY to clear, recording a timeout instead of failing
    pub fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        operation: &'static str,
        timeout_ms: u32,
    ) -> ControllerResult<I> {
        let ready = self
            .interface
            .wait_until_ready(delay, timeout_ms)
            .map_err(Error::Interface)?;
        if !ready {
            warn!("busy timeout after {timeout_ms} ms during {operation}");
            self.diagnostics.busy_timeouts = self.diagnostics.busy_timeouts.saturating_add(1);
            self.diagnostics.last_timeout = Some(HardwareTimeout {
                operation,
                timeout_ms,
            });
        }
        Ok(())
    }

    /// Bring the controller out of reset or deep sleep
    ///
    /// Runs a hardware reset on the first call after construction and after
    /// every [`hibernate`](Self::hibernate). Any loaded waveform is forgotten.
    pub fn ensure_awake<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        if self.reset_done && !self.state.hibernating {
            return Ok(());
        }
        debug!("hardware reset (hibernating: {})", self.state.hibernating);

        let active = self.caps.reset_active_level;
        let inactive = match active {
            Level::Low => Level::High,
            Level::High => Level::Low,
        };
        self.interface.set_reset_line(active).map_err(Error::Interface)?;
        delay.delay_ms(self.caps.reset_duration_ms);
        self.interface
            .set_reset_line(inactive)
            .map_err(Error::Interface)?;
        delay.delay_ms(RESET_SETTLE_MS);
        self.wait_ready(delay, "reset", self.caps.busy_timeouts.reset)?;

        if self.caps.controller == Controller::Ssd1680 {
            self.send_command(ssd1680::SOFT_RESET)?;
            self.wait_ready(delay, "soft reset", self.caps.busy_timeouts.reset)?;
            self.command(ssd1680::DATA_ENTRY_MODE, &[ssd1680::DATA_ENTRY_XY_INC])?;
        }

        self.reset_done = true;
        self.state.hibernating = false;
        self.state.power_on = false;
        self.state.using_partial_mode = false;
        self.state.configured_for = None;
        Ok(())
    }

    /// Load the configuration for `mode` unless it is already loaded
    ///
    /// The controller holds one waveform configuration at a time, so loading
    /// one replaces the other.
    pub fn ensure_configured<D: DelayNs>(
        &mut self,
        mode: UpdateMode,
        delay: &mut D,
    ) -> ControllerResult<I> {
        if self.state.configured_for == Some(mode) {
            return Ok(());
        }
        debug!("configuring for {mode:?} refresh");

        match self.caps.controller {
            Controller::Jd79656 => self.configure_jd79656(mode, delay)?,
            Controller::Ssd1680 => self.configure_ssd1680(mode, delay)?,
        }

        self.state.configured_for = Some(mode);
        Ok(())
    }

    fn configure_jd79656<D: DelayNs>(
        &mut self,
        mode: UpdateMode,
        delay: &mut D,
    ) -> ControllerResult<I> {
        let configure_timeout = self.caps.busy_timeouts.configure;
        self.command(jd79656::PANEL_SETTING, &[PanelSetting::SOFT_RESET.encode()])?;
        self.wait_ready(delay, "soft reset", configure_timeout)?;

        let (panel_setting, vcom_interval, waveform) = match mode {
            UpdateMode::Full => (
                PanelSetting::FULL,
                VcomDataInterval::FULL,
                self.caps.full_waveform,
            ),
            UpdateMode::Partial => (
                PanelSetting::PARTIAL,
                VcomDataInterval::PARTIAL,
                self.caps.fast_waveform,
            ),
        };
        self.command(jd79656::PANEL_SETTING, &[panel_setting.encode()])?;
        self.command(jd79656::VCOM_DATA_INTERVAL, &[vcom_interval.encode()])?;
        self.upload_waveform(waveform)
    }

    fn configure_ssd1680<D: DelayNs>(
        &mut self,
        mode: UpdateMode,
        delay: &mut D,
    ) -> ControllerResult<I> {
        let waveform = match mode {
            // OTP waveform, loaded by the update sequence itself
            UpdateMode::Full => self.caps.full_waveform,
            UpdateMode::Partial => {
                self.command(ssd1680::BORDER_WAVEFORM, &[ssd1680::BORDER_HOLD_WHITE])?;
                self.command(ssd1680::SOURCE_VOLTAGE, &ssd1680::PARTIAL_SOURCE_VOLTAGE)?;
                self.caps.fast_waveform
            }
        };
        if waveform.is_uploaded() {
            self.upload_waveform(waveform)?;
            self.wait_ready(delay, "waveform upload", self.caps.busy_timeouts.configure)?;
        }
        Ok(())
    }

    fn upload_waveform(&mut self, waveform: Waveform) -> ControllerResult<I> {
        match waveform {
            Waveform::Otp => Ok(()),
            Waveform::Combined(table) => self.command(ssd1680::WRITE_LUT, table),
            Waveform::PerTransition(tables) => {
                for table in tables {
                    let command = match table.transition {
                        Transition::Vcom => jd79656::LUT_VCOM,
                        Transition::WhiteToWhite => jd79656::LUT_WW,
                        Transition::BlackToWhite => jd79656::LUT_BW,
                        Transition::WhiteToBlack => jd79656::LUT_WB,
                        Transition::BlackToBlack => jd79656::LUT_BB,
                    };
                    self.command(command, table.data)?;
                }
                Ok(())
            }
        }
    }

    /// Switch the panel driving voltages on
    pub fn power_on<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        if self.state.power_on {
            return Ok(());
        }
        debug!("power on");
        match self.caps.controller {
            Controller::Jd79656 => self.send_command(jd79656::POWER_ON)?,
            Controller::Ssd1680 => self.activate(UpdateSequence::POWER_ON)?,
        }
        self.wait_ready(delay, "power on", self.caps.busy_timeouts.power_on)?;
        self.state.power_on = true;
        Ok(())
    }

    /// Switch the panel driving voltages off
    ///
    /// Also leaves partial window addressing, which some controllers forget
    /// when power drops.
    pub fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        if self.state.power_on {
            debug!("power off");
            match self.caps.controller {
                Controller::Jd79656 => self.send_command(jd79656::POWER_OFF)?,
                Controller::Ssd1680 => self.activate(UpdateSequence::POWER_OFF)?,
            }
            self.wait_ready(delay, "power off", self.caps.busy_timeouts.power_off)?;
        }
        self.state.power_on = false;
        self.state.using_partial_mode = false;
        Ok(())
    }

    /// Run a refresh with the loaded configuration and wait for it to finish
    ///
    /// Powers the panel up first if needed. On the SSD1680 the power stages
    /// are folded into the same update sequence.
    pub fn trigger_update<D: DelayNs>(
        &mut self,
        mode: UpdateMode,
        delay: &mut D,
    ) -> ControllerResult<I> {
        let power_off_after = match self.caps.auto_power_off {
            AutoPowerOff::Never => false,
            AutoPowerOff::AfterFullRefresh => mode == UpdateMode::Full,
            AutoPowerOff::AfterEveryRefresh => true,
        };
        let timeout = self.caps.refresh_timeout(mode == UpdateMode::Partial);

        match self.caps.controller {
            Controller::Jd79656 => {
                self.power_on(delay)?;
                debug!("{mode:?} refresh");
                self.send_command(jd79656::DISPLAY_REFRESH)?;
                self.wait_ready(delay, "refresh", timeout)?;
                if power_off_after {
                    self.power_off(delay)?;
                }
            }
            Controller::Ssd1680 => {
                let mut sequence = match mode {
                    UpdateMode::Full => UpdateSequence::FULL,
                    UpdateMode::Partial => UpdateSequence::PARTIAL,
                };
                if !self.state.power_on {
                    sequence = sequence.with(UpdateSequence::POWER_ON);
                }
                if power_off_after {
                    sequence = sequence.with(UpdateSequence::POWER_OFF);
                }
                debug!("{mode:?} refresh, update sequence {:#04x}", sequence.encode());
                self.activate(sequence)?;
                self.wait_ready(delay, "refresh", timeout)?;
                self.state.power_on = !power_off_after;
                if power_off_after {
                    self.state.using_partial_mode = false;
                }
            }
        }
        Ok(())
    }

    /// Enter deep sleep
    ///
    /// # Errors
    ///
    /// Returns `Error::NotSupported` when the fast waveform needs memory that
    /// deep sleep would wipe. The panel is powered off instead.
    pub fn hibernate<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        self.power_off(delay)?;
        if self.caps.differential_refresh_requires_memory {
            debug!("deep sleep would lose image memory, powered off instead");
            return Err(Error::NotSupported);
        }

        debug!("deep sleep");
        match self.caps.controller {
            Controller::Jd79656 => {
                self.command(jd79656::DEEP_SLEEP, &[jd79656::DEEP_SLEEP_CHECK])?;
            }
            Controller::Ssd1680 => {
                self.command(ssd1680::DEEP_SLEEP, &[ssd1680::DEEP_SLEEP_RETAIN_RAM])?;
            }
        }

        self.state.hibernating = true;
        self.state.configured_for = None;
        if !self.caps.deep_sleep_retains_ram {
            // Both planes come back undefined, so the glass is unknown again
            self.state.initial_write_done = false;
            self.state.initial_refresh_done = false;
        }
        Ok(())
    }

    /// Load an SSD1680 update sequence and start it
    fn activate(&mut self, sequence: UpdateSequence) -> ControllerResult<I> {
        self.command(ssd1680::DISPLAY_UPDATE_CTRL2, &[sequence.encode()])?;
        self.send_command(ssd1680::MASTER_ACTIVATION)
    }
}
