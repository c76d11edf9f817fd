//! RTC periodic wakeup timer
//!
//! The wakeup counter runs from the RTC clock divided by 16, 8, 4 or 2 and
//! fires after `reload + 1` ticks.

const MAX_RELOAD: u64 = u16::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeupError {
    /// No divider gives the period with a 16-bit reload
    OutOfRange,
}

impl core::fmt::Display for WakeupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WakeupError::OutOfRange => write!(f, "wakeup period out of range"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeupSetup {
    rtc_clock_hz: u32,
    pub divider: u8,
    pub reload: u16,
}

impl WakeupSetup {
    /// Finest divider whose reload reaches `period_us`
    pub fn for_period(rtc_clock_hz: u32, period_us: u32) -> Result<Self, WakeupError> {
        for divider in [2u8, 4, 8, 16] {
            let ticks =
                u64::from(rtc_clock_hz) * u64::from(period_us) / (u64::from(divider) * 1_000_000);
            if ticks == 0 {
                return Err(WakeupError::OutOfRange);
            }
            if ticks - 1 <= MAX_RELOAD {
                return Ok(Self {
                    rtc_clock_hz,
                    divider,
                    reload: (ticks - 1) as u16,
                });
            }
        }
        Err(WakeupError::OutOfRange)
    }

    /// WUCKSEL field
    pub fn wucksel(&self) -> u8 {
        match self.divider {
            16 => 0b000,
            8 => 0b001,
            4 => 0b010,
            _ => 0b011,
        }
    }

    pub fn period_us(&self) -> u32 {
        let ticks = u64::from(self.reload) + 1;
        (ticks * u64::from(self.divider) * 1_000_000 / u64::from(self.rtc_clock_hz)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSI: u32 = 32_000;

    #[test]
    fn test_short_period_uses_divider_two() {
        let setup = WakeupSetup::for_period(LSI, 500_000).unwrap();
        assert_eq!(setup.divider, 2);
        assert_eq!(setup.wucksel(), 0b011);
        assert_eq!(setup.reload, 7_999);
        assert_eq!(setup.period_us(), 500_000);
    }

    #[test]
    fn test_long_period_moves_to_larger_divider() {
        let setup = WakeupSetup::for_period(LSI, 10_000_000).unwrap();
        assert_eq!(setup.divider, 8);
        assert_eq!(setup.wucksel(), 0b001);
        assert_eq!(setup.period_us(), 10_000_000);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(WakeupSetup::for_period(LSI, 40_000_000), Err(WakeupError::OutOfRange));
        assert_eq!(WakeupSetup::for_period(LSI, 10), Err(WakeupError::OutOfRange));
    }
}
