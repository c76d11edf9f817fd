//! Timer Counting Example
//! The blue LED (PD15) is switched on and TIM3 counts about two seconds;
//! the update interrupt switches it off and stops the timer.
//!
//! Expected Behavior:
//!   - PD15 lights for ~2 s after reset
//!   - The measured on-time is logged

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::{interrupt, pac};
use embassy_sync::blocking_mutex::{CriticalSectionMutex, raw::CriticalSectionRawMutex};
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use peripheral_core::TimerSetup;
use peripheral_demos::hardware::{board, gpio_led::GpioLed, timer, traits::Led};
use {defmt_rtt as _, panic_probe as _};

static LED: CriticalSectionMutex<RefCell<Option<GpioLed<'static>>>> =
    CriticalSectionMutex::new(RefCell::new(None));

static ELAPSED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[interrupt]
fn TIM3() {
    let regs = pac::TIM3;
    timer::clear_update(regs);
    timer::stop(regs);
    LED.lock(|led| {
        if let Some(led) = led.borrow_mut().as_mut() {
            led.off();
        }
    });
    ELAPSED.signal(());
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    let setup = TimerSetup::COUNTING_PULSE_2S;
    info!(
        "Counting {} ticks at {} Hz",
        setup.reload + 1,
        setup.tick_hz(board::HSI_HZ)
    );

    let _tim3 = Timer::new(p.TIM3);
    let regs = pac::TIM3;
    timer::load(regs, &setup);
    timer::listen_update(regs, true);

    let mut led = GpioLed::new(Output::new(p.PD15, Level::Low, Speed::Low));
    led.on();
    LED.lock(|slot| slot.replace(Some(led)));

    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::TIM3);
    }
    let started = Instant::now();
    timer::start(regs);

    ELAPSED.wait().await;
    info!(
        "LED off after {} ms, expected {} ms",
        started.elapsed().as_millis(),
        setup.period_us(board::HSI_HZ) / 1000
    );

    loop {
        embassy_time::Timer::after_secs(10).await;
    }
}
