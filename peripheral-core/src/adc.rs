//! ADC reading to PWM duty

/// Full scale of a 10-bit conversion
pub const MAX_10_BIT: u16 = 1023;

/// Full scale of a 12-bit conversion
pub const MAX_12_BIT: u16 = 4095;

/// Duty cycle that falls as the reading rises.
///
/// The reading is scaled from `0..=max_reading` onto `0..=max_duty` and
/// subtracted from `max_duty`. Readings above `max_reading` saturate.
pub fn inverted_duty(reading: u16, max_reading: u16, max_duty: u32) -> u32 {
    if max_reading == 0 {
        return max_duty;
    }
    let reading = reading.min(max_reading);
    let scaled = u64::from(reading) * u64::from(max_duty) / u64::from(max_reading);
    max_duty - scaled as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_scale_mirrors_reading() {
        assert_eq!(inverted_duty(0, MAX_10_BIT, 1023), 1023);
        assert_eq!(inverted_duty(23, MAX_10_BIT, 1023), 1000);
        assert_eq!(inverted_duty(1023, MAX_10_BIT, 1023), 0);
    }

    #[test]
    fn test_rescales_and_saturates() {
        assert_eq!(inverted_duty(2048, MAX_12_BIT, 1000), 500);
        assert_eq!(inverted_duty(u16::MAX, MAX_12_BIT, 1000), 0);
        assert_eq!(inverted_duty(7, 0, 1000), 1000);
    }
}
