//! Property checks for the serializers and the timer arithmetic

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use peripheral_core::DiagnosticPort;
use peripheral_core::capture::{elapsed_ticks, frequency_hz};
use peripheral_core::record::{self, Pulse};
use peripheral_core::timing::{HSI_HZ, TimerSetup};
use proptest::prelude::*;

struct Pin<'a> {
    id: u8,
    log: &'a RefCell<Vec<(u8, bool)>>,
}

impl ErrorType for Pin<'_> {
    type Error = Infallible;
}

impl OutputPin for Pin<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, true));
        Ok(())
    }
}

/// Rebuild the byte a logic analyser would decode on the rising clock edges
fn decode_clocked(log: &[(u8, bool)]) -> u8 {
    let mut data = false;
    let mut byte = 0u8;
    for &(id, level) in log {
        match (id, level) {
            (1, level) => data = level,
            (0, true) => byte = (byte << 1) | u8::from(data),
            _ => {}
        }
    }
    byte
}

fn pulses() -> impl Strategy<Value = Vec<Pulse>> {
    prop::collection::vec(
        (any::<u16>(), any::<bool>()).prop_map(|(length, on)| Pulse::new(length, on)),
        0..20,
    )
}

proptest! {
    #[test]
    fn bang_byte_is_msb_first(byte in any::<u8>()) {
        let log = RefCell::new(Vec::new());
        let mut port = DiagnosticPort::new(Pin { id: 0, log: &log }, Pin { id: 1, log: &log });
        port.bang_byte(byte).unwrap();
        prop_assert_eq!(decode_clocked(&log.borrow()), byte);
    }

    #[test]
    fn capture_wraps_inside_counter(first in 0u32..=0xFFFF, delta in 1u32..=0xFFFF) {
        let second = (first + delta) & 0xFFFF;
        prop_assert_eq!(elapsed_ticks(first, second, 16), delta);
        prop_assert_eq!(
            frequency_hz(HSI_HZ, 0, first, second, 16),
            Some(HSI_HZ / delta)
        );
    }

    #[test]
    fn timer_period_never_overshoots(period_us in 1u32..=250_000_000) {
        let setup = TimerSetup::for_period(HSI_HZ, period_us, 0xFFFF).unwrap();
        prop_assert!(setup.reload <= 0xFFFF);

        let actual = setup.period_us(HSI_HZ);
        let tick_us = (u64::from(setup.prescaler) + 2) * 1_000_000 / u64::from(HSI_HZ) + 1;
        prop_assert!(actual <= u64::from(period_us));
        prop_assert!(u64::from(period_us) - actual <= tick_us);
    }

    #[test]
    fn any_corrupted_record_byte_is_detected(
        pulses in pulses(),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=0xFF,
    ) {
        let mut stored = vec![0u8; record::encoded_len(pulses.len())];
        record::encode(&pulses, &mut stored).unwrap();
        prop_assert!(record::verify(&pulses, &stored).is_ok());

        let at = index.index(stored.len());
        stored[at] ^= mask;
        prop_assert!(record::verify(&pulses, &stored).is_err());
    }
}
