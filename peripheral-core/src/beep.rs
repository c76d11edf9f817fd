//! Beeper frequency selection
//!
//! The beeper divides the low speed clock by `8 * divider` for a nominal
//! 1 kHz tone, optionally doubled or quadrupled.

pub const MIN_DIVIDER: u8 = 2;
pub const MAX_DIVIDER: u8 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeepSelect {
    OneKhz,
    TwoKhz,
    FourKhz,
}

impl BeepSelect {
    pub const fn frequency_hz(self) -> u32 {
        1_000 * self.multiplier()
    }

    pub const fn multiplier(self) -> u32 {
        match self {
            BeepSelect::OneKhz => 1,
            BeepSelect::TwoKhz => 2,
            BeepSelect::FourKhz => 4,
        }
    }

    /// BEEPSEL field
    pub const fn bits(self) -> u8 {
        match self {
            BeepSelect::OneKhz => 0,
            BeepSelect::TwoKhz => 1,
            BeepSelect::FourKhz => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeepError {
    /// BEEPDIV only covers dividers 2..=33
    DividerOutOfRange(u8),
}

impl core::fmt::Display for BeepError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BeepError::DividerOutOfRange(d) => {
                write!(f, "beep divider {} outside {}..={}", d, MIN_DIVIDER, MAX_DIVIDER)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeepSetup {
    lsi_hz: u32,
    divider: u8,
    select: BeepSelect,
}

impl BeepSetup {
    pub fn from_lsi(lsi_hz: u32, divider: u8, select: BeepSelect) -> Result<Self, BeepError> {
        if !(MIN_DIVIDER..=MAX_DIVIDER).contains(&divider) {
            return Err(BeepError::DividerOutOfRange(divider));
        }
        Ok(Self {
            lsi_hz,
            divider,
            select,
        })
    }

    /// Divider bringing the base tone closest to 1 kHz
    pub fn nominal(lsi_hz: u32, select: BeepSelect) -> Self {
        let divider = (lsi_hz.saturating_add(4_000) / 8_000)
            .clamp(u32::from(MIN_DIVIDER), u32::from(MAX_DIVIDER));
        Self {
            lsi_hz,
            divider: divider as u8,
            select,
        }
    }

    pub fn frequency_hz(&self) -> u32 {
        self.lsi_hz / (8 * u32::from(self.divider)) * self.select.multiplier()
    }

    pub fn divider(&self) -> u8 {
        self.divider
    }

    /// BEEPDIV field
    pub fn beepdiv(&self) -> u8 {
        self.divider - MIN_DIVIDER
    }

    pub fn select(&self) -> BeepSelect {
        self.select
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_range() {
        assert_eq!(
            BeepSetup::from_lsi(128_000, 1, BeepSelect::OneKhz),
            Err(BeepError::DividerOutOfRange(1))
        );
        assert_eq!(
            BeepSetup::from_lsi(128_000, 34, BeepSelect::OneKhz),
            Err(BeepError::DividerOutOfRange(34))
        );
        let setup = BeepSetup::from_lsi(128_000, 2, BeepSelect::FourKhz).unwrap();
        assert_eq!(setup.beepdiv(), 0);
        assert_eq!(setup.frequency_hz(), 32_000);
    }

    #[test]
    fn test_nominal_tones() {
        let one = BeepSetup::nominal(128_000, BeepSelect::OneKhz);
        assert_eq!(one.divider(), 16);
        assert_eq!(one.frequency_hz(), 1_000);

        let two = BeepSetup::nominal(32_000, BeepSelect::TwoKhz);
        assert_eq!(two.divider(), 4);
        assert_eq!(two.frequency_hz(), 2_000);
        assert_eq!(BeepSelect::FourKhz.bits(), 2);
    }

    #[test]
    fn test_extreme_lsi() {
        let fast = BeepSetup::nominal(u32::MAX, BeepSelect::FourKhz);
        assert_eq!(fast.divider(), MAX_DIVIDER);
        assert!(fast.frequency_hz() > 0);

        let stopped = BeepSetup::nominal(0, BeepSelect::OneKhz);
        assert_eq!(stopped.divider(), MIN_DIVIDER);
        assert_eq!(stopped.frequency_hz(), 0);
    }
}
