//! One Pulse Mode Example
//! Each press of the user button starts TIM3 once. Channel 1 runs in PWM
//! mode 2 with one pulse mode set, so PA6 stays low for the first 30 us and
//! is high for the next 30 us before the counter stops.
//!
//! Hardware Connection:
//!   - Scope on PA6, user button on PA0
//!
//! Expected Behavior:
//!   - One delayed 30 us pulse per button press

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{OutputType, Pull};
use embassy_stm32::pac;
use embassy_stm32::timer::Channel;
use embassy_stm32::timer::low_level::{OutputCompareMode, Timer};
use embassy_stm32::timer::simple_pwm::PwmPin;
use peripheral_core::TimerSetup;
use peripheral_demos::hardware::{board, timer};
use {defmt_rtt as _, panic_probe as _};

/// 60 us at 16 MHz
const PULSE: TimerSetup = TimerSetup::new(0, 959);

/// Delay before the output goes high
const COMPARE: u32 = 480;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("One pulse mode, {} us period", PULSE.period_us(board::HSI_HZ));

    let _output: PwmPin<'_, embassy_stm32::peripherals::TIM3, _> = PwmPin::new_ch1(p.PA6, OutputType::PushPull);
    let tim3 = Timer::new(p.TIM3);
    tim3.set_output_compare_mode(Channel::Ch1, OutputCompareMode::PwmMode2);
    tim3.enable_channel(Channel::Ch1, true);

    let regs = pac::TIM3;
    timer::load(regs, &PULSE);
    timer::set_compare(regs, 0, COMPARE);
    timer::set_one_pulse(regs, true);

    let mut button = ExtiInput::new(p.PA0, p.EXTI0, Pull::Down);
    let mut presses: u32 = 0;
    loop {
        button.wait_for_rising_edge().await;
        timer::start(regs);
        presses = presses.wrapping_add(1);
        info!("Pulse {}", presses);
        // debounce
        embassy_time::Timer::after_millis(50).await;
    }
}

// Notes:
// 1. OPM clears CEN at the update event, so setting CEN again is the only
//    trigger needed
