//! Beeper Example
//! A 2 kHz tone on PD12 derived from the LSI the way a beeper divider would,
//! produced by TIM4 channel 1 at 50 % duty.
//!
//! Hardware Connection:
//!   - Piezo buzzer between PD12 and GND
//!
//! Expected Behavior:
//!   - A continuous ~2 kHz tone

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::OutputType;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use peripheral_core::beep::{BeepSelect, BeepSetup};
use peripheral_core::watchdog::LSI_HZ;
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());

    let setup = BeepSetup::nominal(LSI_HZ, BeepSelect::TwoKhz);
    info!(
        "Beep {} Hz (divider {}, select {})",
        setup.frequency_hz(),
        setup.divider(),
        setup.select()
    );

    let mut pwm = SimplePwm::new(
        p.TIM4,
        Some(PwmPin::new_ch1(p.PD12, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz(setup.frequency_hz()),
        CountingMode::EdgeAlignedUp,
    );
    let mut ch1 = pwm.ch1();
    ch1.set_duty_cycle_percent(50);
    ch1.enable();

    loop {
        embassy_time::Timer::after_secs(10).await;
    }
}
