//! Independent Watchdog Example
//! The IWDG is started with a 1 s timeout and fed every 250 ms while the
//! user button is released. Holding the button stops the feeding.
//!
//! Expected Behavior:
//!   - PD14 (red) flashes once after every reset
//!   - Holding PA0 for more than a second resets the board

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::Timer;
use peripheral_core::watchdog::{IwdgSetup, LSI_HZ};
use peripheral_demos::hardware::{
    board,
    gpio_button::GpioButton,
    gpio_led::GpioLed,
    traits::{Button, Led},
};
use {defmt_rtt as _, panic_probe as _};

const TIMEOUT_US: u32 = 1_000_000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());

    let mut reset_led = GpioLed::new(Output::new(p.PD14, Level::Low, Speed::Low));
    reset_led.on();
    Timer::after_millis(200).await;
    reset_led.off();

    let setup = unwrap!(IwdgSetup::for_timeout(LSI_HZ, TIMEOUT_US));
    info!(
        "IWDG LSI/{} reload {}: {} us",
        setup.divider,
        setup.reload,
        setup.timeout_us()
    );

    let button = GpioButton::new(Input::new(p.PA0, Pull::Down));
    let mut watchdog = IndependentWatchdog::new(p.IWDG, setup.timeout_us());
    watchdog.unleash();

    loop {
        if button.is_pressed() {
            warn!("Button held, not feeding");
        } else {
            watchdog.pet();
        }
        Timer::after_millis(250).await;
    }
}
