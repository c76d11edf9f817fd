//! Timer prescaler and auto-reload arithmetic
//!
//! A general purpose timer counts at `clock / (prescaler + 1)` and
//! overflows every `reload + 1` ticks.

/// Clock the named timer setups are worked out for
pub const HSI_HZ: u32 = 16_000_000;

const MAX_DIVIDER: u64 = u16::MAX as u64 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    ZeroPeriod,
    /// Needs a longer prescaler than the 16-bit register holds
    OutOfRange,
}

impl core::fmt::Display for TimingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimingError::ZeroPeriod => write!(f, "period is zero"),
            TimingError::OutOfRange => write!(f, "period out of range for the timer"),
        }
    }
}

/// Register values for one timer period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSetup {
    /// PSC register
    pub prescaler: u16,
    /// ARR register
    pub reload: u32,
}

impl TimerSetup {
    /// 30 µs update interrupt with no prescaling
    pub const SINGLE_PULSE_30US: Self = Self::new(0, 479);

    /// ~2 s pulse, 62501 prescaling and 513 ticks
    pub const COUNTING_PULSE_2S: Self = Self::new(62500, 512);

    /// ADC trigger every 100 ms
    pub const ADC_TRIGGER_100MS: Self = Self::new(31, 49_999);

    /// Window watchdog refresh tick, 12.5 ms
    pub const WATCHDOG_TICK_12_5MS: Self = Self::new(3, 49_999);

    pub const fn new(prescaler: u16, reload: u32) -> Self {
        Self { prescaler, reload }
    }

    /// Smallest prescaler giving `period_us` with a reload no larger than
    /// `max_reload`.
    pub fn for_period(clock_hz: u32, period_us: u32, max_reload: u32) -> Result<Self, TimingError> {
        let ticks = u64::from(clock_hz) * u64::from(period_us) / 1_000_000;
        Self::for_ticks(ticks, max_reload)
    }

    pub fn for_frequency(clock_hz: u32, hz: u32, max_reload: u32) -> Result<Self, TimingError> {
        if hz == 0 {
            return Err(TimingError::ZeroPeriod);
        }
        Self::for_ticks(u64::from(clock_hz / hz), max_reload)
    }

    fn for_ticks(ticks: u64, max_reload: u32) -> Result<Self, TimingError> {
        if ticks == 0 {
            return Err(TimingError::ZeroPeriod);
        }
        let counts = u64::from(max_reload) + 1;
        let divider = ticks.div_ceil(counts);
        if divider > MAX_DIVIDER {
            return Err(TimingError::OutOfRange);
        }
        let reload = (ticks / divider).saturating_sub(1);
        Ok(Self {
            prescaler: (divider - 1) as u16,
            reload: reload as u32,
        })
    }

    /// Ticks between two update events, counted at the timer clock
    pub fn clocks(&self) -> u64 {
        (u64::from(self.prescaler) + 1) * (u64::from(self.reload) + 1)
    }

    /// `u64::MAX` for a stopped clock, the update never comes
    pub fn period_us(&self, clock_hz: u32) -> u64 {
        (self.clocks() * 1_000_000)
            .checked_div(u64::from(clock_hz))
            .unwrap_or(u64::MAX)
    }

    pub fn frequency_hz(&self, clock_hz: u32) -> u32 {
        (u64::from(clock_hz) / self.clocks()) as u32
    }

    /// Counter frequency after the prescaler
    pub fn tick_hz(&self, clock_hz: u32) -> u32 {
        clock_hz / (u32::from(self.prescaler) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_setups() {
        assert_eq!(TimerSetup::SINGLE_PULSE_30US.period_us(HSI_HZ), 30);
        assert_eq!(TimerSetup::ADC_TRIGGER_100MS.period_us(HSI_HZ), 100_000);
        assert_eq!(TimerSetup::WATCHDOG_TICK_12_5MS.period_us(HSI_HZ), 12_500);

        let pulse = TimerSetup::COUNTING_PULSE_2S.period_us(HSI_HZ);
        assert!((2_000_000..2_010_000).contains(&pulse));
    }

    #[test]
    fn test_for_period_without_prescaler() {
        let setup = TimerSetup::for_period(HSI_HZ, 30, 0xFFFF).unwrap();
        assert_eq!(setup, TimerSetup::SINGLE_PULSE_30US);
    }

    #[test]
    fn test_for_period_picks_smallest_prescaler() {
        let setup = TimerSetup::for_period(HSI_HZ, 100_000, 0xFFFF).unwrap();
        assert_eq!(setup.prescaler, 24);
        assert_eq!(setup.reload, 63_999);
        assert_eq!(setup.period_us(HSI_HZ), 100_000);
    }

    #[test]
    fn test_32_bit_timer_needs_no_prescaler() {
        let setup = TimerSetup::for_period(HSI_HZ, 2_000_000, u32::MAX).unwrap();
        assert_eq!(setup.prescaler, 0);
        assert_eq!(setup.reload, 31_999_999);
    }

    #[test]
    fn test_errors() {
        assert_eq!(TimerSetup::for_period(HSI_HZ, 0, 0xFFFF), Err(TimingError::ZeroPeriod));
        assert_eq!(TimerSetup::for_frequency(HSI_HZ, 0, 0xFFFF), Err(TimingError::ZeroPeriod));
        // 16 MHz, 16-bit prescaler and reload tops out near 268 s
        assert_eq!(
            TimerSetup::for_period(HSI_HZ, 300_000_000, 0xFFFF),
            Err(TimingError::OutOfRange)
        );
    }

    #[test]
    fn test_stopped_clock() {
        let setup = TimerSetup::SINGLE_PULSE_30US;
        assert_eq!(setup.period_us(0), u64::MAX);
        assert_eq!(setup.frequency_hz(0), 0);
        assert_eq!(setup.tick_hz(0), 0);
        assert_eq!(TimerSetup::for_period(0, 1_000, 0xFFFF), Err(TimingError::ZeroPeriod));
    }

    #[test]
    fn test_for_frequency() {
        let setup = TimerSetup::for_frequency(HSI_HZ, 2_000, 0xFFFF).unwrap();
        assert_eq!(setup.frequency_hz(HSI_HZ), 2_000);
        assert_eq!(setup.tick_hz(HSI_HZ), HSI_HZ);
    }
}
