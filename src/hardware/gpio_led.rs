use super::board::LED_ACTIVE;
use super::traits::Led;
use embassy_stm32::gpio::{Level, Output};
use embedded_hal::digital::PinState;

pub struct GpioLed<'d> {
    pin: Output<'d>,
}

impl<'d> GpioLed<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> Led for GpioLed<'d> {
    fn set(&mut self, on: bool) {
        let high = LED_ACTIVE.state(on) == PinState::High;
        self.pin.set_level(Level::from(high));
    }

    fn is_on(&self) -> bool {
        LED_ACTIVE.is_active(self.pin.is_set_high())
    }
}
