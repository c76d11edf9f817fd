//! System Clock Selection Example
//! Runs the core from the 16 MHz HSI or from the PLL at 168 MHz and toggles
//! PD12 as fast as the loop allows, so the clock can be measured with a scope.
//!
//! Hardware Connection:
//!   - Scope on PD12 (green LED)
//!
//! Expected Behavior:
//!   - The toggle frequency scales with the selected clock

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

/// Switch to false for the PLL profile
const USE_HSI: bool = true;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let (config, sysclk) = if USE_HSI {
        (board::hsi_16mhz(), board::HSI_HZ)
    } else {
        (board::pll_168mhz(), board::PLL_SYSCLK_HZ)
    };
    let p = embassy_stm32::init(config);
    info!("SYSCLK {} Hz", sysclk);

    let mut pin = Output::new(p.PD12, Level::Low, Speed::VeryHigh);
    loop {
        pin.set_high();
        pin.set_low();
    }
}

// Notes:
// 1. With the PLL profile the flash wait states are raised by embassy
//    before the switch
