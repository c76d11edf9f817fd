//! Independent and window watchdog register values

/// Nominal LSI frequency on the STM32F4
pub const LSI_HZ: u32 = 32_000;

const IWDG_MAX_RELOAD: u32 = 0xFFF;
const IWDG_DIVIDERS: [u32; 7] = [4, 8, 16, 32, 64, 128, 256];

/// WWDG counter ticks once per 4096 PCLK1 cycles before the WDGTB divider
const WWDG_CLOCK_DIVIDER: u64 = 4096;
const WWDG_MIN: u8 = 0x40;
const WWDG_MAX: u8 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogError {
    TimeoutTooLong,
    TimeoutTooShort,
    /// WWDG divider must be 1, 2, 4 or 8
    InvalidDivider(u8),
    /// Counter or window outside 0x40..=0x7F
    OutOfRange(u8),
    /// Window above the counter, the first refresh would always reset
    WindowAboveCounter,
}

impl core::fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WatchdogError::TimeoutTooLong => write!(f, "timeout too long for the watchdog"),
            WatchdogError::TimeoutTooShort => write!(f, "timeout shorter than one watchdog tick"),
            WatchdogError::InvalidDivider(d) => write!(f, "invalid window watchdog divider {}", d),
            WatchdogError::OutOfRange(v) => write!(f, "value 0x{:02x} outside 0x40..=0x7f", v),
            WatchdogError::WindowAboveCounter => write!(f, "window above counter"),
        }
    }
}

/// IWDG prescaler and reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IwdgSetup {
    lsi_hz: u32,
    pub divider: u32,
    pub reload: u16,
}

impl IwdgSetup {
    /// Finest resolution giving at least part of `timeout_us`
    pub fn for_timeout(lsi_hz: u32, timeout_us: u32) -> Result<Self, WatchdogError> {
        for divider in IWDG_DIVIDERS {
            let ticks = u64::from(timeout_us) * u64::from(lsi_hz) / (u64::from(divider) * 1_000_000);
            if ticks == 0 {
                return Err(WatchdogError::TimeoutTooShort);
            }
            if ticks - 1 <= u64::from(IWDG_MAX_RELOAD) {
                return Ok(Self {
                    lsi_hz,
                    divider,
                    reload: (ticks - 1) as u16,
                });
            }
        }
        Err(WatchdogError::TimeoutTooLong)
    }

    /// PR register value
    pub fn pr(&self) -> u8 {
        (self.divider.trailing_zeros() - 2) as u8
    }

    pub fn timeout_us(&self) -> u32 {
        let ticks = u64::from(self.reload) + 1;
        (ticks * u64::from(self.divider) * 1_000_000)
            .checked_div(u64::from(self.lsi_hz))
            .and_then(|us| u32::try_from(us).ok())
            .unwrap_or(u32::MAX)
    }
}

/// WWDG divider, counter and window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WwdgSetup {
    divider: u8,
    counter: u8,
    window: u8,
}

impl WwdgSetup {
    /// Counter 0x5B and window 0x4C; refreshed every 12.5 ms at 16 MHz
    pub const DEMO: Self = Self {
        divider: 2,
        counter: 0x5B,
        window: 0x4C,
    };

    pub fn new(divider: u8, counter: u8, window: u8) -> Result<Self, WatchdogError> {
        if !matches!(divider, 1 | 2 | 4 | 8) {
            return Err(WatchdogError::InvalidDivider(divider));
        }
        for value in [counter, window] {
            if !(WWDG_MIN..=WWDG_MAX).contains(&value) {
                return Err(WatchdogError::OutOfRange(value));
            }
        }
        if window > counter {
            return Err(WatchdogError::WindowAboveCounter);
        }
        Ok(Self {
            divider,
            counter,
            window,
        })
    }

    pub fn divider(&self) -> u8 {
        self.divider
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn window(&self) -> u8 {
        self.window
    }

    /// WDGTB field
    pub fn wdgtb(&self) -> u8 {
        self.divider.trailing_zeros() as u8
    }

    /// Saturates at `u32::MAX`, which is also what a stopped PCLK1 gives
    fn tick_us(&self, pclk_hz: u32, ticks: u8) -> u32 {
        let cycles = WWDG_CLOCK_DIVIDER * u64::from(self.divider) * u64::from(ticks);
        (cycles * 1_000_000)
            .checked_div(u64::from(pclk_hz))
            .and_then(|us| u32::try_from(us).ok())
            .unwrap_or(u32::MAX)
    }

    /// Time from a refresh until the counter passes 0x40 and resets the MCU
    pub fn timeout_us(&self, pclk_hz: u32) -> u32 {
        self.tick_us(pclk_hz, self.counter - (WWDG_MIN - 1))
    }

    /// Time after a refresh during which another refresh resets the MCU
    pub fn closed_window_us(&self, pclk_hz: u32) -> u32 {
        self.tick_us(pclk_hz, self.counter - self.window)
    }

    /// A refresh is accepted once the counter is no longer above the window
    pub fn may_refresh(&self, current_counter: u8) -> bool {
        let current = current_counter & WWDG_MAX;
        (WWDG_MIN..=self.window).contains(&current)
    }

    /// True when refreshing every `interval_us` lands in the open window
    pub fn accepts_interval(&self, pclk_hz: u32, interval_us: u32) -> bool {
        interval_us > self.closed_window_us(pclk_hz) && interval_us < self.timeout_us(pclk_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iwdg_short_timeout_uses_smallest_divider() {
        let setup = IwdgSetup::for_timeout(LSI_HZ, 100_000).unwrap();
        assert_eq!(setup.divider, 4);
        assert_eq!(setup.pr(), 0);
        assert_eq!(setup.reload, 799);
        assert_eq!(setup.timeout_us(), 100_000);
    }

    #[test]
    fn test_iwdg_long_timeout() {
        let setup = IwdgSetup::for_timeout(LSI_HZ, 2_000_000).unwrap();
        assert_eq!(setup.divider, 16);
        assert_eq!(setup.pr(), 2);
        assert_eq!(setup.reload, 3999);
        assert_eq!(setup.timeout_us(), 2_000_000);
    }

    #[test]
    fn test_iwdg_limits() {
        assert_eq!(
            IwdgSetup::for_timeout(LSI_HZ, 60_000_000),
            Err(WatchdogError::TimeoutTooLong)
        );
        assert_eq!(IwdgSetup::for_timeout(LSI_HZ, 10), Err(WatchdogError::TimeoutTooShort));
        // 256 * 4096 / 32 kHz
        assert!(IwdgSetup::for_timeout(LSI_HZ, 32_768_000).is_ok());
    }

    #[test]
    fn test_wwdg_validation() {
        assert_eq!(WwdgSetup::new(3, 0x5B, 0x4C), Err(WatchdogError::InvalidDivider(3)));
        assert_eq!(WwdgSetup::new(1, 0x80, 0x4C), Err(WatchdogError::OutOfRange(0x80)));
        assert_eq!(WwdgSetup::new(1, 0x5B, 0x3F), Err(WatchdogError::OutOfRange(0x3F)));
        assert_eq!(WwdgSetup::new(1, 0x4C, 0x5B), Err(WatchdogError::WindowAboveCounter));
        assert_eq!(WwdgSetup::new(2, 0x5B, 0x4C), Ok(WwdgSetup::DEMO));
    }

    #[test]
    fn test_wwdg_window_at_16mhz() {
        let setup = WwdgSetup::DEMO;
        assert_eq!(setup.wdgtb(), 1);
        // 512 us per tick
        assert_eq!(setup.timeout_us(16_000_000), 28 * 512);
        assert_eq!(setup.closed_window_us(16_000_000), 15 * 512);
        assert!(setup.accepts_interval(16_000_000, 12_500));
        assert!(!setup.accepts_interval(16_000_000, 5_000));
        assert!(!setup.accepts_interval(16_000_000, 20_000));
    }

    #[test]
    fn test_stopped_clocks() {
        let setup = WwdgSetup::DEMO;
        assert_eq!(setup.timeout_us(0), u32::MAX);
        assert_eq!(setup.closed_window_us(0), u32::MAX);
        assert!(!setup.accepts_interval(0, 12_500));
        assert_eq!(IwdgSetup::for_timeout(0, 1_000_000), Err(WatchdogError::TimeoutTooShort));
    }

    #[test]
    fn test_wwdg_may_refresh() {
        let setup = WwdgSetup::DEMO;
        assert!(!setup.may_refresh(0x5B));
        assert!(!setup.may_refresh(0x4D));
        assert!(setup.may_refresh(0x4C));
        assert!(setup.may_refresh(0x40));
        // T6 clear, the reset is already under way
        assert!(!setup.may_refresh(0x3F));
        // WDGA bit is ignored
        assert!(setup.may_refresh(0xC4));
    }
}
