//! PWM Output Example
//! A 50 % duty cycle on TIM4 channel 1 (PD12, green LED) with a 4096 tick
//! period at 16 MHz.
//!
//! Expected Behavior:
//!   - ~3.9 kHz square wave on PD12, LED at half brightness

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::OutputType;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use peripheral_core::TimerSetup;
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());

    let setup = TimerSetup::new(0, 4095);
    let frequency = setup.frequency_hz(board::HSI_HZ);
    info!("PWM at {} Hz", frequency);

    let ch1 = PwmPin::new_ch1(p.PD12, OutputType::PushPull);
    let mut pwm = SimplePwm::new(
        p.TIM4,
        Some(ch1),
        None,
        None,
        None,
        Hertz(frequency),
        CountingMode::EdgeAlignedUp,
    );
    let mut ch1 = pwm.ch1();
    ch1.set_duty_cycle_percent(50);
    ch1.enable();

    loop {
        embassy_time::Timer::after_secs(10).await;
        debug!("still running");
    }
}
