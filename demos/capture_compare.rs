//! Input Capture Example
//! TIM4 drives a 1 kHz square wave on PD12; TIM3 channel 1 captures rising
//! edges on PA6 and the period between two captures gives the frequency.
//!
//! Hardware Connection:
//!   - Jumper PD12 to PA6 (or any 3.3 V signal source on PA6)
//!   - Logic analyser on PE0/PE1
//!
//! Expected Behavior:
//!   - "1000 Hz" logged once a second
//!   - The low 16 bits of the measured frequency bit-banged on PE0/PE1,
//!     least significant byte first

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, OutputType, Pull, Speed};
use embassy_stm32::pac;
use embassy_stm32::time::khz;
use embassy_stm32::timer::input_capture::CapturePin;
use embassy_stm32::timer::low_level::{CountingMode, InputCaptureMode, InputTISelection, Timer};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::Channel;
use embassy_time::Duration;
use peripheral_core::capture::{self, FrequencyMeter};
use peripheral_core::{DiagnosticPort, TimerSetup};
use peripheral_demos::hardware::{board, timer};
use {defmt_rtt as _, panic_probe as _};

/// Free running 16 bit counter at the full timer clock
const FREE_RUNNING: TimerSetup = TimerSetup::new(0, 0xFFFF);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("Input capture on TIM3 CH1");

    let mut source = SimplePwm::new(
        p.TIM4,
        Some(PwmPin::new_ch1(p.PD12, OutputType::PushPull)),
        None,
        None,
        None,
        khz(1),
        CountingMode::EdgeAlignedUp,
    );
    let mut ch1 = source.ch1();
    ch1.set_duty_cycle_percent(50);
    ch1.enable();

    let _input: CapturePin<'_, embassy_stm32::peripherals::TIM3, _> = CapturePin::new_ch1(p.PA6, Pull::None);
    let tim3 = Timer::new(p.TIM3);
    tim3.set_input_ti_selection(Channel::Ch1, InputTISelection::Normal);
    tim3.set_input_capture_mode(Channel::Ch1, InputCaptureMode::Rising);
    tim3.enable_channel(Channel::Ch1, true);

    let regs = pac::TIM3;
    timer::load(regs, &FREE_RUNNING);
    timer::start(regs);

    let mut diagnostics = DiagnosticPort::new(
        Output::new(p.PE0, Level::Low, Speed::VeryHigh),
        Output::new(p.PE1, Level::Low, Speed::VeryHigh),
    );
    let mut meter = FrequencyMeter::new(board::HSI_HZ, FREE_RUNNING.prescaler, 16);

    loop {
        meter.restart();
        let frequency = loop {
            if let Some(value) = timer::take_capture(regs, 0) {
                if let Some(frequency) = meter.capture(value) {
                    break frequency;
                }
            }
            embassy_futures::yield_now().await;
        };
        info!("{} Hz", frequency);
        unwrap!(diagnostics.bang_buffer(&capture::diagnostic_bytes(frequency)));
        embassy_time::Timer::after(Duration::from_secs(1)).await;
    }
}

// Notes:
// 1. The channel is polled, so inputs above a few kHz overwrite captures
//    before they are read and the result comes out too low
// 2. The first capture after the pause is stale and gets dropped
