//! ADC to PWM Example
//! Every 100 ms ADC1 samples PA1 and the green LED (PD12) is dimmed in the
//! opposite direction: full input gives the LED off, zero input full on.
//!
//! Hardware Connection:
//!   - Potentiometer wiper on PA1, ends on 3V and GND
//!
//! Expected Behavior:
//!   - Turning the pot changes PD12 brightness
//!   - PD13 toggles on every conversion

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Level, Output, OutputType, Speed};
use embassy_stm32::time::khz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_time::{Duration, Ticker};
use peripheral_core::TimerSetup;
use peripheral_core::adc::{MAX_12_BIT, inverted_duty};
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    let period_us = TimerSetup::ADC_TRIGGER_100MS.period_us(board::HSI_HZ);
    info!("ADC every {} us", period_us);

    let mut adc = Adc::new(p.ADC1);
    let mut input = p.PA1;
    let mut activity = Output::new(p.PD13, Level::Low, Speed::Low);

    let mut pwm = SimplePwm::new(
        p.TIM4,
        Some(PwmPin::new_ch1(p.PD12, OutputType::PushPull)),
        None,
        None,
        None,
        khz(1),
        CountingMode::EdgeAlignedUp,
    );
    let max_duty = pwm.max_duty_cycle();
    pwm.ch1().enable();

    let mut ticker = Ticker::every(Duration::from_micros(period_us));
    loop {
        ticker.next().await;
        let reading = adc.blocking_read(&mut input);
        let duty = inverted_duty(reading, MAX_12_BIT, max_duty.into());
        pwm.ch1().set_duty_cycle(duty as _);
        activity.toggle();
        debug!("ADC {} -> duty {}/{}", reading, duty, max_duty);
    }
}

// Notes:
// 1. The conversion is software-started on the ticker instead of a TRGO
//    event, the period is still derived from the trigger timer setup
