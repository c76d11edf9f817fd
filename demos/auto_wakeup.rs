//! Periodic Wakeup Example
//! The RTC wakeup timer, clocked from the LSI, fires every 500 ms. The
//! interrupt toggles the orange LED.
//!
//! Expected Behavior:
//!   - PD13 blinks at 1 Hz
//!   - Each wakeup is counted in the log

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_sync::blocking_mutex::{CriticalSectionMutex, raw::CriticalSectionRawMutex};
use embassy_sync::signal::Signal;
use peripheral_core::wakeup::WakeupSetup;
use peripheral_core::watchdog::LSI_HZ;
use peripheral_demos::hardware::{board, gpio_led::GpioLed, traits::Led, wakeup};
use {defmt_rtt as _, panic_probe as _};

const PERIOD_US: u32 = 500_000;

static LED: CriticalSectionMutex<RefCell<Option<GpioLed<'static>>>> =
    CriticalSectionMutex::new(RefCell::new(None));

static WOKEN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[interrupt]
fn RTC_WKUP() {
    wakeup::clear();
    LED.lock(|led| {
        if let Some(led) = led.borrow_mut().as_mut() {
            led.toggle();
        }
    });
    WOKEN.signal(());
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz_with_lsi_rtc());

    let setup = unwrap!(WakeupSetup::for_period(LSI_HZ, PERIOD_US));
    info!(
        "Wakeup every {} us (RTC/{}, reload {})",
        setup.period_us(),
        setup.divider,
        setup.reload
    );

    LED.lock(|led| {
        led.replace(Some(GpioLed::new(Output::new(p.PD13, Level::Low, Speed::Low))));
    });

    wakeup::start(&setup);
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::RTC_WKUP);
    }

    let mut wakeups: u32 = 0;
    loop {
        WOKEN.wait().await;
        wakeups = wakeups.wrapping_add(1);
        debug!("wakeup {}", wakeups);
    }
}

// Notes:
// 1. The LSI is only specified to within a few kHz, the period drifts with it
