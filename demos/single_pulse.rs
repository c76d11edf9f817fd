//! Single Timer Pulse Example
//! PD14 is driven high, TIM3 counts 30 us and its update interrupt drives
//! the pin low again and stops the timer.
//!
//! Hardware Connection:
//!   - Scope on PD14 (red LED)
//!
//! Expected Behavior:
//!   - One 30 us high pulse right after reset, nothing afterwards

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::{interrupt, pac};
use embassy_sync::blocking_mutex::CriticalSectionMutex;
use peripheral_core::TimerSetup;
use peripheral_demos::hardware::{board, timer};
use {defmt_rtt as _, panic_probe as _};

static PULSE_PIN: CriticalSectionMutex<RefCell<Option<Output<'static>>>> =
    CriticalSectionMutex::new(RefCell::new(None));

#[interrupt]
fn TIM3() {
    let regs = pac::TIM3;
    timer::clear_update(regs);
    timer::stop(regs);
    timer::listen_update(regs, false);
    PULSE_PIN.lock(|pin| {
        if let Some(pin) = pin.borrow_mut().as_mut() {
            pin.toggle();
        }
    });
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    let setup = TimerSetup::SINGLE_PULSE_30US;
    info!("Single pulse of {} us", setup.period_us(board::HSI_HZ));

    // enables the TIM3 clock
    let _tim3 = Timer::new(p.TIM3);
    let regs = pac::TIM3;
    timer::load(regs, &setup);
    timer::listen_update(regs, true);

    PULSE_PIN.lock(|pin| {
        pin.replace(Some(Output::new(p.PD14, Level::High, Speed::VeryHigh)));
    });
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::TIM3);
    }
    timer::start(regs);

    loop {
        embassy_time::Timer::after_secs(5).await;
    }
}

// Notes:
// 1. Loading the prescaler needs an update event, its flag is cleared
//    before the interrupt is unmasked
