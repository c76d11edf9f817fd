//! Input capture frequency measurement
//!
//! The capture channel latches the free running counter on every rising
//! edge. Two consecutive captures give the period of the input signal in
//! timer ticks, taking one counter wraparound into account.

/// Frequency of a signal whose rising edges were captured at `first` and
/// `second`.
///
/// `counter_bits` is the width of the counter (16 or 32). Returns `None` when
/// the captures are equal, which means no full period was seen.
pub fn frequency_hz(
    timer_clock_hz: u32,
    prescaler: u16,
    first: u32,
    second: u32,
    counter_bits: u32,
) -> Option<u32> {
    let ticks = elapsed_ticks(first, second, counter_bits);
    if ticks == 0 {
        return None;
    }
    let tick_hz = u64::from(timer_clock_hz) / (u64::from(prescaler) + 1);
    Some((tick_hz / u64::from(ticks)) as u32)
}

/// Ticks from `first` to `second` on a counter `counter_bits` wide
pub fn elapsed_ticks(first: u32, second: u32, counter_bits: u32) -> u32 {
    let mask = if counter_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << counter_bits) - 1
    };
    second.wrapping_sub(first) & mask
}

/// Low 16 bits of a measured frequency as sent on the diagnostic port,
/// least significant byte first
pub fn diagnostic_bytes(frequency_hz: u32) -> [u8; 2] {
    [frequency_hz as u8, (frequency_hz >> 8) as u8]
}

/// Turns a stream of captures into frequencies.
///
/// The first capture after [`restart`](FrequencyMeter::restart) may belong to
/// an edge that arrived while the channel was being configured, so it is
/// dropped.
#[derive(Debug, Clone)]
pub struct FrequencyMeter {
    timer_clock_hz: u32,
    prescaler: u16,
    counter_bits: u32,
    discarded: bool,
    previous: Option<u32>,
}

impl FrequencyMeter {
    pub const fn new(timer_clock_hz: u32, prescaler: u16, counter_bits: u32) -> Self {
        Self {
            timer_clock_hz,
            prescaler,
            counter_bits,
            discarded: false,
            previous: None,
        }
    }

    pub fn restart(&mut self) {
        self.discarded = false;
        self.previous = None;
    }

    /// Feed a capture, returns a frequency once two usable captures are in
    pub fn capture(&mut self, value: u32) -> Option<u32> {
        if !self.discarded {
            self.discarded = true;
            return None;
        }
        let frequency = self.previous.and_then(|first| {
            frequency_hz(
                self.timer_clock_hz,
                self.prescaler,
                first,
                value,
                self.counter_bits,
            )
        });
        self.previous = Some(value);
        frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_without_wrap() {
        assert_eq!(frequency_hz(16_000_000, 0, 1_000, 9_000, 16), Some(2_000));
    }

    #[test]
    fn test_frequency_across_wrap() {
        // 0xFFF0 -> 0x1F30 is 8000 ticks on a 16-bit counter
        assert_eq!(frequency_hz(16_000_000, 0, 0xFFF0, 0x1F30, 16), Some(2_000));
        assert_eq!(elapsed_ticks(0xFFFF_FFF0, 0x10, 32), 0x20);
    }

    #[test]
    fn test_equal_captures() {
        assert_eq!(frequency_hz(16_000_000, 0, 42, 42, 16), None);
    }

    #[test]
    fn test_prescaler_scales_tick() {
        assert_eq!(frequency_hz(16_000_000, 15, 0, 1_000, 16), Some(1_000));
    }

    #[test]
    fn test_diagnostic_byte_order() {
        assert_eq!(diagnostic_bytes(1_000), [0xE8, 0x03]);
        assert_eq!(diagnostic_bytes(0x0001_2345), [0x45, 0x23]);
    }

    #[test]
    fn test_meter_discards_first_capture() {
        let mut meter = FrequencyMeter::new(16_000_000, 0, 16);
        assert_eq!(meter.capture(5), None);
        assert_eq!(meter.capture(100), None);
        assert_eq!(meter.capture(8_100), Some(2_000));
        assert_eq!(meter.capture(16_100), Some(2_000));

        meter.restart();
        assert_eq!(meter.capture(16_200), None);
        assert_eq!(meter.capture(16_300), None);
        assert_eq!(meter.capture(24_300), Some(2_000));
    }
}
