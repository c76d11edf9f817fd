//! Board-agnostic logic for the peripheral demos
//!
//! Everything that can run without the silicon lives here so it can be
//! tested on the host:
//!
//! - Interrupt-driven byte protocols (buffered SPI slave, GoBus 1.0 module,
//!   I2C adding slave, TMP102 I2C master)
//! - Fixed-capacity transfer buffers shared between an ISR and a main loop
//! - Diagnostic bit-bangers and the 74HC595 shift register chain
//! - Register arithmetic: timer prescalers, capture frequency, watchdog
//!   windows, RTC wakeup, beep dividers
//! - The pulse record written to and verified against non-volatile storage

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod beep;
pub mod bitbang;
pub mod buffer;
pub mod capture;
pub mod gobus;
pub mod i2c_master;
pub mod i2c_slave;
pub mod record;
pub mod spi_slave;
pub mod status;
pub mod timing;
pub mod wakeup;
pub mod watchdog;

pub use bitbang::{DiagnosticPort, ShiftRegisterChain, StatusPin};
pub use buffer::{Fill, RxBuffer, TxBuffer};
pub use status::StatusCode;
pub use timing::{TimerSetup, TimingError};

use embedded_hal::digital::PinState;

/// Edge seen on a chip select or interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
}

/// Pin level that means "on", "pressed" or "asserted"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Pin state that makes the signal `active`
    pub const fn state(self, active: bool) -> PinState {
        match (self, active) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => PinState::High,
            _ => PinState::Low,
        }
    }

    /// Whether a pin reading `high` has the signal asserted
    pub const fn is_active(self, high: bool) -> bool {
        match self {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_level_states() {
        assert_eq!(ActiveLevel::High.state(true), PinState::High);
        assert_eq!(ActiveLevel::High.state(false), PinState::Low);
        assert_eq!(ActiveLevel::Low.state(true), PinState::Low);
        assert_eq!(ActiveLevel::Low.state(false), PinState::High);
    }

    #[test]
    fn test_active_level_readback() {
        for level in [ActiveLevel::High, ActiveLevel::Low] {
            for active in [false, true] {
                let high = level.state(active) == PinState::High;
                assert_eq!(level.is_active(high), active);
            }
        }
    }
}
