//! Controller command definitions
//!
//! Opcodes for the two supported controller families, plus the register
//! layouts that carry packed bit fields. Commands are sent over SPI with the
//! DC pin low; their parameters follow with DC high.
//!
//! ## Controller families
//!
//! - [`jd79656`] - UC81xx-style command set (two planes written with 0x13/0x10,
//!   waveform loaded as five separate tables, dedicated partial window command)
//! - [`ssd1680`] - Solomon-style command set (planes written with 0x24/0x26,
//!   RAM window registers, update sequence selected through a bit field)
//!
//! ## Example
//!
//! ```
//! use monoepd::command::{PanelSetting, UpdateSequence};
//!
//! assert_eq!(PanelSetting::FULL.encode(), 0xDF);
//! assert_eq!(UpdateSequence::FULL_ONE_SHOT.encode(), 0xF7);
//! ```

/// Controller family, selects the command set used by the driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Controller {
    /// JD79656 and other UC81xx-style controllers
    Jd79656,
    /// SSD1680 and compatible Solomon controllers
    Ssd1680,
}

/// JD79656 (UC81xx-style) opcodes
pub mod jd79656 {
    /// Panel setting register (0x00)
    ///
    /// Writing 0x00 doubles as a soft reset; see [`super::PanelSetting`].
    pub const PANEL_SETTING: u8 = 0x00;
    /// Power off (0x02). BUSY is asserted until the charge pumps are down.
    pub const POWER_OFF: u8 = 0x02;
    /// Power on (0x04). BUSY is asserted until driving voltages are stable.
    pub const POWER_ON: u8 = 0x04;
    /// Deep sleep (0x07), requires the check code [`DEEP_SLEEP_CHECK`]
    pub const DEEP_SLEEP: u8 = 0x07;
    /// Check code that must accompany [`DEEP_SLEEP`]
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;
    /// Write "old" image memory (0x10)
    pub const WRITE_OLD_DATA: u8 = 0x10;
    /// Display refresh (0x12)
    pub const DISPLAY_REFRESH: u8 = 0x12;
    /// Write "new" image memory (0x13)
    pub const WRITE_NEW_DATA: u8 = 0x13;
    /// VCOM waveform table (0x20)
    pub const LUT_VCOM: u8 = 0x20;
    /// White to white waveform table (0x21)
    pub const LUT_WW: u8 = 0x21;
    /// Black to white waveform table (0x22)
    pub const LUT_BW: u8 = 0x22;
    /// White to black waveform table (0x23)
    pub const LUT_WB: u8 = 0x23;
    /// Black to black waveform table (0x24)
    pub const LUT_BB: u8 = 0x24;
    /// VCOM and data interval setting (0x50); see [`super::VcomDataInterval`]
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    /// Partial window (0x90); see [`super::PartialWindow`]
    pub const PARTIAL_WINDOW: u8 = 0x90;
    /// Enter partial window mode (0x91)
    pub const PARTIAL_IN: u8 = 0x91;
    /// Leave partial window mode (0x92)
    pub const PARTIAL_OUT: u8 = 0x92;
}

/// SSD1680 opcodes
pub mod ssd1680 {
    /// Source driving voltage (0x04), 3 bytes: VSH1, VSH2, VSL
    pub const SOURCE_VOLTAGE: u8 = 0x04;
    /// Deep sleep (0x10). 0x01 retains RAM, 0x03 discards it.
    pub const DEEP_SLEEP: u8 = 0x10;
    /// Deep sleep mode 1, RAM content retained
    pub const DEEP_SLEEP_RETAIN_RAM: u8 = 0x01;
    /// Data entry mode (0x11)
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    /// X increment, Y increment, X is the fast axis
    pub const DATA_ENTRY_XY_INC: u8 = 0x03;
    /// Software reset (0x12). Wait for BUSY low afterwards.
    pub const SOFT_RESET: u8 = 0x12;
    /// Master activation (0x20)
    pub const MASTER_ACTIVATION: u8 = 0x20;
    /// Display update control 2 (0x22); see [`super::UpdateSequence`]
    pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;
    /// Write BW RAM (0x24), the "new" image
    pub const WRITE_RAM_BW: u8 = 0x24;
    /// Write RED RAM (0x26), used as the "old" image for differential refresh
    pub const WRITE_RAM_RED: u8 = 0x26;
    /// Write LUT register (0x32), 153 bytes
    pub const WRITE_LUT: u8 = 0x32;
    /// Border waveform control (0x3C)
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    /// Border actively held white during the update
    pub const BORDER_HOLD_WHITE: u8 = 0x60;
    /// RAM X start/end, in bytes (0x44)
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    /// RAM Y start/end, in rows (0x45)
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    /// RAM X address counter (0x4E)
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    /// RAM Y address counter (0x4F)
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
    /// No operation (0x7F), terminates a RAM write
    pub const NOP: u8 = 0x7F;
    /// Source voltages used while the partial waveform is loaded
    pub const PARTIAL_SOURCE_VOLTAGE: [u8; 3] = [0x41, 0x00, 0x32];
}

/// JD79656 panel setting register (0x00)
///
/// | Bits  | Field                  |
/// |-------|------------------------|
/// | [7:6] | display resolution     |
/// | 5     | LUT from register      |
/// | 4     | black/white mode       |
/// | 3     | gate scan up           |
/// | 2     | source shift right     |
/// | 1     | booster on             |
/// | 0     | not in soft reset      |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelSetting {
    /// Resolution select, 2 bits
    pub resolution: u8,
    /// Take the waveform from registers 0x20..0x24 instead of OTP
    pub lut_from_register: bool,
    /// Black/white only (no red plane)
    pub black_white: bool,
    /// Gate scan direction up
    pub scan_up: bool,
    /// Source shift direction right
    pub shift_right: bool,
    /// Booster switched on
    pub booster_on: bool,
    /// Clear to hold the controller in soft reset
    pub not_reset: bool,
}

impl PanelSetting {
    /// Soft reset: every bit cleared
    pub const SOFT_RESET: Self = Self {
        resolution: 0,
        lut_from_register: false,
        black_white: false,
        scan_up: false,
        shift_right: false,
        booster_on: false,
        not_reset: false,
    };

    /// Full refresh, waveform from OTP
    pub const FULL: Self = Self {
        resolution: 0b11,
        lut_from_register: false,
        black_white: true,
        scan_up: true,
        shift_right: true,
        booster_on: true,
        not_reset: true,
    };

    /// Fast refresh, waveform from registers
    pub const PARTIAL: Self = Self {
        lut_from_register: true,
        ..Self::FULL
    };

    /// Pack into the register byte
    pub const fn encode(self) -> u8 {
        ((self.resolution & 0b11) << 6)
            | ((self.lut_from_register as u8) << 5)
            | ((self.black_white as u8) << 4)
            | ((self.scan_up as u8) << 3)
            | ((self.shift_right as u8) << 2)
            | ((self.booster_on as u8) << 1)
            | (self.not_reset as u8)
    }
}

/// JD79656 VCOM and data interval register (0x50)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VcomDataInterval {
    /// Border output, bits [7:6]
    pub border: u8,
    /// Data polarity, bits [5:4]
    pub data_polarity: u8,
    /// VCOM and data interval, bits [3:0]
    pub interval: u8,
}

impl VcomDataInterval {
    /// Setting used with the OTP (full) waveform
    pub const FULL: Self = Self {
        border: 0b10,
        data_polarity: 0b11,
        interval: 0b0111,
    };

    /// Setting used with the register (fast) waveform
    pub const PARTIAL: Self = Self {
        border: 0b11,
        data_polarity: 0b01,
        interval: 0b0111,
    };

    /// Pack into the register byte
    pub const fn encode(self) -> u8 {
        ((self.border & 0b11) << 6) | ((self.data_polarity & 0b11) << 4) | (self.interval & 0x0F)
    }
}

/// JD79656 partial window (0x90)
///
/// X is in bytes (8 pixel units), Y in rows. End coordinates are inclusive.
/// The horizontal fields are 5 bits wide, so windows are limited to panels
/// up to 256 columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialWindow {
    /// First byte column
    pub x_start: u16,
    /// Last byte column (inclusive)
    pub x_end: u16,
    /// First row
    pub y_start: u16,
    /// Last row (inclusive)
    pub y_end: u16,
    /// Only scan gates inside the window
    pub scan_inside: bool,
}

impl PartialWindow {
    /// Pack into the 7 parameter bytes
    pub const fn encode(self) -> [u8; 7] {
        [
            (self.x_start << 3) as u8,
            ((self.x_end << 3) as u8) | 0x07,
            (self.y_start >> 8) as u8,
            (self.y_start & 0xFF) as u8,
            (self.y_end >> 8) as u8,
            (self.y_end & 0xFF) as u8,
            self.scan_inside as u8,
        ]
    }
}

/// SSD1680 RAM window (0x44/0x45 ranges, 0x4E/0x4F counters)
///
/// X is in bytes and already includes any panel offset, Y is in rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RamWindow {
    /// First byte column
    pub x_start: u8,
    /// Last byte column (inclusive)
    pub x_end: u8,
    /// First row
    pub y_start: u16,
    /// Last row (inclusive)
    pub y_end: u16,
}

impl RamWindow {
    /// Parameters for [`ssd1680::SET_RAM_X_RANGE`]
    pub const fn encode_x_range(self) -> [u8; 2] {
        [self.x_start, self.x_end]
    }

    /// Parameters for [`ssd1680::SET_RAM_Y_RANGE`]
    pub const fn encode_y_range(self) -> [u8; 4] {
        [
            (self.y_start & 0xFF) as u8,
            (self.y_start >> 8) as u8,
            (self.y_end & 0xFF) as u8,
            (self.y_end >> 8) as u8,
        ]
    }

    /// Parameters for [`ssd1680::SET_RAM_X_COUNTER`]
    pub const fn encode_x_counter(self) -> [u8; 1] {
        [self.x_start]
    }

    /// Parameters for [`ssd1680::SET_RAM_Y_COUNTER`]
    pub const fn encode_y_counter(self) -> [u8; 2] {
        [(self.y_start & 0xFF) as u8, (self.y_start >> 8) as u8]
    }
}

/// SSD1680 display update control 2 (0x22)
///
/// Each flag is one stage of the sequence run by master activation (0x20).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct UpdateSequence {
    /// 0x80
    pub enable_clock: bool,
    /// 0x40
    pub enable_analog: bool,
    /// 0x20
    pub load_temperature: bool,
    /// 0x10
    pub load_lut: bool,
    /// 0x08, selects display mode 2 (used with the register waveform)
    pub display_mode_2: bool,
    /// 0x04
    pub display: bool,
    /// 0x02
    pub disable_analog: bool,
    /// 0x01
    pub disable_oscillator: bool,
}

impl UpdateSequence {
    /// Clock and analog on
    pub const POWER_ON: Self = Self {
        enable_clock: true,
        enable_analog: true,
        load_temperature: false,
        load_lut: false,
        display_mode_2: false,
        display: false,
        disable_analog: false,
        disable_oscillator: false,
    };

    /// Analog and oscillator off
    pub const POWER_OFF: Self = Self {
        enable_clock: false,
        enable_analog: false,
        load_temperature: false,
        load_lut: false,
        display_mode_2: false,
        display: false,
        disable_analog: true,
        disable_oscillator: true,
    };

    /// Full refresh with the OTP waveform
    pub const FULL: Self = Self {
        enable_clock: false,
        enable_analog: false,
        load_temperature: true,
        load_lut: true,
        display_mode_2: false,
        display: true,
        disable_analog: false,
        disable_oscillator: false,
    };

    /// Fast refresh with the register waveform
    pub const PARTIAL: Self = Self {
        enable_clock: false,
        enable_analog: false,
        load_temperature: false,
        load_lut: false,
        display_mode_2: true,
        display: true,
        disable_analog: false,
        disable_oscillator: false,
    };

    /// Power on, full refresh, power off in one activation (0xF7)
    pub const FULL_ONE_SHOT: Self = Self::FULL.with(Self::POWER_ON).with(Self::POWER_OFF);

    /// Union of two sequences
    pub const fn with(self, other: Self) -> Self {
        Self {
            enable_clock: self.enable_clock || other.enable_clock,
            enable_analog: self.enable_analog || other.enable_analog,
            load_temperature: self.load_temperature || other.load_temperature,
            load_lut: self.load_lut || other.load_lut,
            display_mode_2: self.display_mode_2 || other.display_mode_2,
            display: self.display || other.display,
            disable_analog: self.disable_analog || other.disable_analog,
            disable_oscillator: self.disable_oscillator || other.disable_oscillator,
        }
    }

    /// Pack into the register byte
    pub const fn encode(self) -> u8 {
        ((self.enable_clock as u8) << 7)
            | ((self.enable_analog as u8) << 6)
            | ((self.load_temperature as u8) << 5)
            | ((self.load_lut as u8) << 4)
            | ((self.display_mode_2 as u8) << 3)
            | ((self.display as u8) << 2)
            | ((self.disable_analog as u8) << 1)
            | (self.disable_oscillator as u8)
    }
}
