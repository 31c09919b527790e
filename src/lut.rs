//! Waveform Look-Up Tables
//!
//! A waveform tells the controller which voltage to apply to a pixel, and for
//! how long, for each transition class (white to white, black to white, ...).
//! Full refreshes normally use the table stored in the controller's OTP memory;
//! fast refreshes load an explicit table owned by the driver.
//!
//! The fast tables here are community-derived, not vendor-issued. They trade
//! some ghosting for speed.

/// Pixel transition class driven by one waveform table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Common electrode voltage
    Vcom,
    /// White stays white
    WhiteToWhite,
    /// Black becomes white
    BlackToWhite,
    /// White becomes black
    WhiteToBlack,
    /// Black stays black
    BlackToBlack,
}

/// Waveform program for a single transition class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformTable {
    /// Transition class this table drives
    pub transition: Transition,
    /// Voltage/duration codes
    pub data: &'static [u8],
}

/// Where the controller takes its waveform from for one refresh mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    /// Table stored on-chip, nothing to upload
    Otp,
    /// One table per transition class, uploaded with separate commands
    PerTransition(&'static [WaveformTable]),
    /// A single table covering every transition class
    Combined(&'static [u8]),
}

impl Waveform {
    /// Whether the driver uploads anything for this waveform
    pub fn is_uploaded(&self) -> bool {
        !matches!(self, Self::Otp)
    }
}

/// Length of one JD79656 transition table
pub const JD79656_TABLE_SIZE: usize = 56;

/// Length of the SSD1680 waveform register block
pub const SSD1680_LUT_SIZE: usize = 153;

#[rustfmt::skip]
const JD79656_VCOM_FAST: [u8; JD79656_TABLE_SIZE] = [
    0x01, 0x06, 0x03, 0x02, 0x01, 0x01, 0x01,
    0x01, 0x06, 0x02, 0x01, 0x01, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const JD79656_WW_FAST: [u8; JD79656_TABLE_SIZE] = [
    0x01, 0x06, 0x03, 0x02, 0x81, 0x01, 0x01,
    0x01, 0x06, 0x02, 0x01, 0x01, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const JD79656_BW_FAST: [u8; JD79656_TABLE_SIZE] = [
    0x01, 0x86, 0x83, 0x82, 0x01, 0x01, 0x01,
    0x01, 0x86, 0x82, 0x01, 0x01, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const JD79656_WB_FAST: [u8; JD79656_TABLE_SIZE] = [
    0x01, 0x46, 0x43, 0x02, 0x01, 0x01, 0x01,
    0x01, 0x46, 0x42, 0x01, 0x01, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const JD79656_BB_FAST: [u8; JD79656_TABLE_SIZE] = [
    0x01, 0x06, 0x03, 0x42, 0x41, 0x01, 0x01,
    0x01, 0x06, 0x02, 0x01, 0x01, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Fast waveform for the JD79656 (LCMEN2R13EFC1 panel), in upload order
pub const JD79656_FAST: [WaveformTable; 5] = [
    WaveformTable {
        transition: Transition::Vcom,
        data: &JD79656_VCOM_FAST,
    },
    WaveformTable {
        transition: Transition::WhiteToWhite,
        data: &JD79656_WW_FAST,
    },
    WaveformTable {
        transition: Transition::BlackToWhite,
        data: &JD79656_BW_FAST,
    },
    WaveformTable {
        transition: Transition::WhiteToBlack,
        data: &JD79656_WB_FAST,
    },
    WaveformTable {
        transition: Transition::BlackToBlack,
        data: &JD79656_BB_FAST,
    },
];

/// Fast waveform for the SSD1680 (DEPG0290BNS800 panel)
///
/// Rows 0-4 hold the voltage selection per phase for B2B, B2W, W2B, W2W and
/// VCOM. The timing rows that follow: tap existing black pixels, move new
/// pixels, settle new and black pixels, then a short pass over everything.
#[rustfmt::skip]
pub const SSD1680_FAST: [u8; SSD1680_LUT_SIZE] = [
    0x40, 0x00, 0x40, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x80, 0x80, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x40, 0x40, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,

    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x00, 0x00, 0x00,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jd79656_tables_cover_every_transition_once() {
        let order: alloc::vec::Vec<Transition> =
            JD79656_FAST.iter().map(|table| table.transition).collect();
        assert_eq!(
            order,
            alloc::vec![
                Transition::Vcom,
                Transition::WhiteToWhite,
                Transition::BlackToWhite,
                Transition::WhiteToBlack,
                Transition::BlackToBlack,
            ]
        );
        assert!(
            JD79656_FAST
                .iter()
                .all(|table| table.data.len() == JD79656_TABLE_SIZE)
        );
    }

    #[test]
    fn test_otp_waveform_is_not_uploaded() {
        assert!(!Waveform::Otp.is_uploaded());
        assert!(Waveform::Combined(&SSD1680_FAST).is_uploaded());
        assert!(Waveform::PerTransition(&JD79656_FAST).is_uploaded());
    }
}
