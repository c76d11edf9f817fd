//! STM32F4 Discovery GPIO Toggle Example
//! Toggles the orange LED (PD13) with busy-wait delays. It demonstrates:
//! 1. Basic no_std/no_main setup
//! 2. GPIO output configuration through the `Led` trait
//! 3. Counting cycles instead of using a timer
//!
//! Hardware Connection:
//!   - No external connections needed - uses the onboard LED at PD13
//!
//! Expected Behavior:
//!   - PD13 toggles every 50 ms; a scope on the pin shows a 10 Hz square wave

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use peripheral_demos::hardware::{board, gpio_led::GpioLed, traits::Led};
use {defmt_rtt as _, panic_probe as _};

/// Half period of the square wave
const HALF_PERIOD_US: u32 = 50_000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("GPIO toggle");

    let mut led = GpioLed::new(Output::new(p.PD13, Level::Low, Speed::Low));

    loop {
        led.on();
        board::delay_us(board::HSI_HZ, HALF_PERIOD_US);
        led.off();
        board::delay_us(board::HSI_HZ, HALF_PERIOD_US);
        trace!("LED on: {}", led.is_on());
    }
}

// Notes:
// 1. The executor never gets control back; the loop blocks on purpose
// 2. Discovery LEDs are active high
