//! Panel capabilities and builder
//!
//! A [`PanelCapabilities`] value describes one physical panel type: its
//! geometry, which refresh modes the controller supports, pin polarities,
//! busy timeouts and waveform tables. It is fixed when the driver is built.
//!
//! Two presets are provided, [`PanelCapabilities::LCMEN2R13EFC1`] and
//! [`PanelCapabilities::DEPG0290BNS800`]; anything else goes through
//! [`Builder`].

pub use crate::command::Controller;
pub use crate::error::BuilderError;
use crate::lut::{JD79656_FAST, SSD1680_FAST, Waveform};

/// Widest panel the JD79656 partial window can address
pub const JD79656_MAX_WIDTH: u16 = 256;

/// Highest byte column the SSD1680 RAM X address register holds
pub const SSD1680_MAX_RAM_X: u16 = 0xFF;

/// Logic level of a control line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Level {
    /// Low
    #[default]
    Low,
    /// High
    High,
}

/// Panel geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Addressable columns in controller memory (multiple of 8)
    pub width: u16,
    /// Rows
    pub height: u16,
    /// Columns actually wired to the glass (`<= width`)
    pub visible_width: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if the width is zero or not a
    /// multiple of 8, or the height is zero, and
    /// `BuilderError::InvalidVisibleWidth` if `visible_width` is zero or wider
    /// than `width`.
    pub fn new(width: u16, height: u16, visible_width: u16) -> Result<Self, BuilderError> {
        if width == 0 || width % 8 != 0 || height == 0 {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if visible_width == 0 || visible_width > width {
            return Err(BuilderError::InvalidVisibleWidth {
                width,
                visible_width,
            });
        }
        Ok(Self {
            width,
            height,
            visible_width,
        })
    }

    /// Size of one full memory plane in bytes
    pub fn buffer_size(&self) -> usize {
        (self.width as usize / 8) * self.height as usize
    }

    /// Bytes per addressable row
    pub fn width_bytes(&self) -> u16 {
        self.width / 8
    }

    /// Whether the last byte column of a row is partly off-glass
    pub fn has_padding_column(&self) -> bool {
        self.visible_width < self.width
    }
}

/// Busy-wait bounds per operation, in milliseconds
///
/// A wait that runs out is logged and counted, then the driver carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusyTimeouts {
    /// After releasing the reset line
    pub reset: u32,
    /// After the power-on command
    pub power_on: u32,
    /// After the power-off command
    pub power_off: u32,
    /// After a soft reset or waveform upload
    pub configure: u32,
    /// Full refresh waveform
    pub full_refresh: u32,
    /// Fast refresh waveform
    pub partial_refresh: u32,
}

impl Default for BusyTimeouts {
    fn default() -> Self {
        Self {
            reset: 1_000,
            power_on: 1_000,
            power_off: 1_000,
            configure: 1_000,
            full_refresh: 6_000,
            partial_refresh: 3_000,
        }
    }
}

/// When the driver drops the panel driving voltages on its own
///
/// Leaving them on speeds up the next refresh; switching them off avoids the
/// image slowly fading and saves power.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoPowerOff {
    /// Only on `power_off()`, `hibernate()` and `clear_screen()`
    #[default]
    Never,
    /// After every full refresh
    AfterFullRefresh,
    /// After every refresh
    AfterEveryRefresh,
}

/// Static facts about one panel type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelCapabilities {
    /// Command set
    pub controller: Controller,
    /// Geometry
    pub dimensions: Dimensions,
    /// Controller accepts windowed writes and refreshes
    pub supports_partial_update: bool,
    /// Controller can run the fast waveform
    pub supports_fast_partial_update: bool,
    /// Level that holds the controller in reset
    pub reset_active_level: Level,
    /// Level of the BUSY line while the controller is working
    pub busy_active_level: Level,
    /// Maximum SPI clock
    pub bus_clock_hz: u32,
    /// How long the reset line is held
    pub reset_duration_ms: u32,
    /// Byte offset of column 0 in the RAM X address space
    pub ram_x_offset_bytes: u8,
    /// The fast waveform diffs against the previous plane, which deep sleep
    /// would wipe
    pub differential_refresh_requires_memory: bool,
    /// Deep sleep keeps the memory planes
    pub deep_sleep_retains_ram: bool,
    /// Busy-wait bounds
    pub busy_timeouts: BusyTimeouts,
    /// Automatic power-off policy
    pub auto_power_off: AutoPowerOff,
    /// Waveform for full refreshes
    pub full_waveform: Waveform,
    /// Waveform for fast refreshes
    pub fast_waveform: Waveform,
}

impl PanelCapabilities {
    /// LCMEN2R13EFC1, 2.13" 122x250 on a JD79656 (Heltec Wireless Paper V1.1)
    pub const LCMEN2R13EFC1: Self = Self {
        controller: Controller::Jd79656,
        dimensions: Dimensions {
            width: 128,
            height: 250,
            visible_width: 122,
        },
        supports_partial_update: true,
        supports_fast_partial_update: true,
        reset_active_level: Level::Low,
        busy_active_level: Level::Low,
        bus_clock_hz: 6_000_000,
        reset_duration_ms: 10,
        ram_x_offset_bytes: 0,
        differential_refresh_requires_memory: true,
        deep_sleep_retains_ram: false,
        busy_timeouts: BusyTimeouts {
            reset: 200,
            power_on: 1_000,
            power_off: 1_000,
            configure: 1_000,
            full_refresh: 6_000,
            partial_refresh: 3_000,
        },
        auto_power_off: AutoPowerOff::Never,
        full_waveform: Waveform::Otp,
        fast_waveform: Waveform::PerTransition(&JD79656_FAST),
    };

    /// DEPG0290BNS800, 2.9" 128x296 on an SSD1680 (Heltec Vision Master E290)
    pub const DEPG0290BNS800: Self = Self {
        controller: Controller::Ssd1680,
        dimensions: Dimensions {
            width: 128,
            height: 296,
            visible_width: 128,
        },
        supports_partial_update: true,
        supports_fast_partial_update: true,
        reset_active_level: Level::Low,
        busy_active_level: Level::High,
        bus_clock_hz: 6_000_000,
        reset_duration_ms: 1_000,
        ram_x_offset_bytes: 1,
        differential_refresh_requires_memory: false,
        deep_sleep_retains_ram: true,
        busy_timeouts: BusyTimeouts {
            reset: 200,
            power_on: 1_000,
            power_off: 1_000,
            configure: 6_000,
            full_refresh: 6_000,
            partial_refresh: 3_000,
        },
        auto_power_off: AutoPowerOff::AfterEveryRefresh,
        full_waveform: Waveform::Otp,
        fast_waveform: Waveform::Combined(&SSD1680_FAST),
    };

    /// Busy timeout for an update with the given waveform
    pub fn refresh_timeout(&self, fast: bool) -> u32 {
        if fast {
            self.busy_timeouts.partial_refresh
        } else {
            self.busy_timeouts.full_refresh
        }
    }
}

/// Builder for [`PanelCapabilities`]
///
/// # Example
///
/// ```
/// use monoepd::{AutoPowerOff, Builder, Controller, Dimensions};
///
/// let dims = match Dimensions::new(128, 250, 122) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let caps = match Builder::new(Controller::Jd79656)
///     .dimensions(dims)
///     .auto_power_off(AutoPowerOff::AfterFullRefresh)
///     .build()
/// {
///     Ok(caps) => caps,
///     Err(_) => return,
/// };
/// assert_eq!(caps.dimensions.visible_width, 122);
/// ```
#[must_use]
pub struct Builder {
    controller: Controller,
    dimensions: Option<Dimensions>,
    supports_partial_update: bool,
    supports_fast_partial_update: bool,
    reset_active_level: Level,
    busy_active_level: Level,
    bus_clock_hz: u32,
    reset_duration_ms: u32,
    ram_x_offset_bytes: u8,
    differential_refresh_requires_memory: bool,
    deep_sleep_retains_ram: bool,
    busy_timeouts: BusyTimeouts,
    auto_power_off: AutoPowerOff,
    full_waveform: Waveform,
    fast_waveform: Waveform,
}

impl Builder {
    /// Start from the defaults of a controller family
    pub fn new(controller: Controller) -> Self {
        let preset = match controller {
            Controller::Jd79656 => PanelCapabilities::LCMEN2R13EFC1,
            Controller::Ssd1680 => PanelCapabilities::DEPG0290BNS800,
        };
        Self {
            controller,
            dimensions: None,
            supports_partial_update: preset.supports_partial_update,
            supports_fast_partial_update: preset.supports_fast_partial_update,
            reset_active_level: preset.reset_active_level,
            busy_active_level: preset.busy_active_level,
            bus_clock_hz: preset.bus_clock_hz,
            reset_duration_ms: preset.reset_duration_ms,
            ram_x_offset_bytes: 0,
            differential_refresh_requires_memory: preset.differential_refresh_requires_memory,
            deep_sleep_retains_ram: preset.deep_sleep_retains_ram,
            busy_timeouts: BusyTimeouts::default(),
            auto_power_off: AutoPowerOff::default(),
            full_waveform: preset.full_waveform,
            fast_waveform: preset.fast_waveform,
        }
    }

    /// Set panel geometry (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Whether windowed writes and refreshes are allowed
    pub fn supports_partial_update(mut self, value: bool) -> Self {
        self.supports_partial_update = value;
        self
    }

    /// Whether the fast waveform may be used
    pub fn supports_fast_partial_update(mut self, value: bool) -> Self {
        self.supports_fast_partial_update = value;
        self
    }

    /// Set the level that holds the controller in reset
    pub fn reset_active_level(mut self, level: Level) -> Self {
        self.reset_active_level = level;
        self
    }

    /// Set the BUSY line level that means "working"
    pub fn busy_active_level(mut self, level: Level) -> Self {
        self.busy_active_level = level;
        self
    }

    /// Set the maximum bus clock
    pub fn bus_clock_hz(mut self, hz: u32) -> Self {
        self.bus_clock_hz = hz;
        self
    }

    /// Set how long reset is held
    pub fn reset_duration_ms(mut self, ms: u32) -> Self {
        self.reset_duration_ms = ms;
        self
    }

    /// Set the RAM X byte offset (SSD1680 family)
    pub fn ram_x_offset_bytes(mut self, offset: u8) -> Self {
        self.ram_x_offset_bytes = offset;
        self
    }

    /// Mark the fast waveform as depending on memory that deep sleep wipes
    pub fn differential_refresh_requires_memory(mut self, value: bool) -> Self {
        self.differential_refresh_requires_memory = value;
        self
    }

    /// Whether deep sleep keeps the memory planes
    pub fn deep_sleep_retains_ram(mut self, value: bool) -> Self {
        self.deep_sleep_retains_ram = value;
        self
    }

    /// Set busy-wait bounds
    pub fn busy_timeouts(mut self, timeouts: BusyTimeouts) -> Self {
        self.busy_timeouts = timeouts;
        self
    }

    /// Set the automatic power-off policy
    pub fn auto_power_off(mut self, policy: AutoPowerOff) -> Self {
        self.auto_power_off = policy;
        self
    }

    /// Set the full refresh waveform
    pub fn full_waveform(mut self, waveform: Waveform) -> Self {
        self.full_waveform = waveform;
        self
    }

    /// Set the fast refresh waveform
    pub fn fast_waveform(mut self, waveform: Waveform) -> Self {
        self.fast_waveform = waveform;
        self
    }

    /// Build the capabilities
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set,
    /// and `BuilderError::InvalidDimensions` if the panel is wider than the
    /// controller can address (for the SSD1680, including the RAM x offset).
    pub fn build(self) -> Result<PanelCapabilities, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        let addressable = match self.controller {
            Controller::Jd79656 => dimensions.width <= JD79656_MAX_WIDTH,
            Controller::Ssd1680 => {
                dimensions.width_bytes() - 1 + u16::from(self.ram_x_offset_bytes)
                    <= SSD1680_MAX_RAM_X
            }
        };
        if !addressable {
            return Err(BuilderError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        Ok(PanelCapabilities {
            controller: self.controller,
            dimensions,
            supports_partial_update: self.supports_partial_update,
            supports_fast_partial_update: self.supports_fast_partial_update,
            reset_active_level: self.reset_active_level,
            busy_active_level: self.busy_active_level,
            bus_clock_hz: self.bus_clock_hz,
            reset_duration_ms: self.reset_duration_ms,
            ram_x_offset_bytes: self.ram_x_offset_bytes,
            differential_refresh_requires_memory: self.differential_refresh_requires_memory,
            deep_sleep_retains_ram: self.deep_sleep_retains_ram,
            busy_timeouts: self.busy_timeouts,
            auto_power_off: self.auto_power_off,
            full_waveform: self.full_waveform,
            fast_waveform: self.fast_waveform,
        })
    }
}
