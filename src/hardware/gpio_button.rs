use super::board::BUTTON_ACTIVE;
use super::traits::Button;
use embassy_stm32::gpio::Input;

/// Blue user button on PA0
pub struct GpioButton<'d> {
    pin: Input<'d>,
}

impl<'d> GpioButton<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> Button for GpioButton<'d> {
    fn is_pressed(&self) -> bool {
        BUTTON_ACTIVE.is_active(self.pin.is_high())
    }
}
