//! Window Watchdog Example
//! TIM3 interrupts every 12.5 ms. The first tick starts the WWDG, every
//! later tick refreshes it once the counter has left the closed window.
//! Counter and window are bit-banged before each refresh.
//!
//! Hardware Connection:
//!   - Logic analyser on PE0 (clock) and PE1 (data), PE3 for errors
//!
//! Expected Behavior:
//!   - A two byte frame (counter, window) every 12.5 ms, no resets
//!   - PE3 pulses if a tick arrives while refreshing would reset the MCU

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::{interrupt, pac};
use embassy_sync::blocking_mutex::CriticalSectionMutex;
use peripheral_core::watchdog::WwdgSetup;
use peripheral_core::{DiagnosticPort, StatusPin, TimerSetup};
use peripheral_demos::hardware::{board, timer, window_watchdog::WindowWatchdog};
use {defmt_rtt as _, panic_probe as _};

struct Refresher {
    watchdog: Option<WindowWatchdog>,
    port: DiagnosticPort<Output<'static>, Output<'static>>,
    error: StatusPin<Output<'static>>,
}

static REFRESHER: CriticalSectionMutex<RefCell<Option<Refresher>>> =
    CriticalSectionMutex::new(RefCell::new(None));

#[interrupt]
fn TIM3() {
    timer::clear_update(pac::TIM3);
    REFRESHER.lock(|refresher| {
        let mut refresher = refresher.borrow_mut();
        let Some(refresher) = refresher.as_mut() else {
            return;
        };
        match refresher.watchdog.as_mut() {
            None => refresher.watchdog = Some(WindowWatchdog::start(WwdgSetup::DEMO)),
            Some(watchdog) => {
                let _ = refresher.port.bang_buffer(&[watchdog.counter(), watchdog.window()]);
                if watchdog.may_refresh() {
                    watchdog.refresh();
                } else {
                    let _ = refresher.error.pulse(1);
                }
            }
        }
    });
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());

    let tick = TimerSetup::WATCHDOG_TICK_12_5MS;
    let tick_us = tick.period_us(board::HSI_HZ) as u32;
    let setup = WwdgSetup::DEMO;
    info!(
        "WWDG timeout {} us, closed for {} us, refresh every {} us",
        setup.timeout_us(board::HSI_HZ),
        setup.closed_window_us(board::HSI_HZ),
        tick_us
    );
    defmt::assert!(setup.accepts_interval(board::HSI_HZ, tick_us));

    REFRESHER.lock(|refresher| {
        refresher.replace(Some(Refresher {
            watchdog: None,
            port: DiagnosticPort::new(
                Output::new(p.PE0, Level::Low, Speed::VeryHigh),
                Output::new(p.PE1, Level::Low, Speed::VeryHigh),
            ),
            error: StatusPin::new(Output::new(p.PE3, Level::Low, Speed::VeryHigh)),
        }));
    });

    let _tim3 = Timer::new(p.TIM3);
    let regs = pac::TIM3;
    timer::load(regs, &tick);
    timer::listen_update(regs, true);
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::TIM3);
    }
    timer::start(regs);

    loop {
        embassy_time::Timer::after_secs(10).await;
        info!("still alive");
    }
}

// Notes:
// 1. Bit-banging the two bytes happens before the refresh, it has to finish
//    well inside the open window
