//! Status codes reported on the diagnostic status pin
//!
//! A code is shown on the oscilloscope as a burst of `code` pulses.

/// Application status shared between an ISR and the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    #[default]
    Unknown = 0,
    Ok = 1,
    RxBufferFull = 2,
    TxBufferEmpty = 3,
    Overflow = 4,
    CrcError = 5,
    CsFallingEdge = 6,
    CsRisingEdge = 7,
}

impl StatusCode {
    /// Number of pulses emitted for this code
    pub const fn pulses(self) -> u8 {
        self as u8
    }

    /// True for codes that indicate a failed transfer
    pub const fn is_error(self) -> bool {
        matches!(self, StatusCode::Overflow | StatusCode::CrcError)
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> u8 {
        code.pulses()
    }
}
