//! Interrupt-Driven I2C Master (TMP102)
//!
//! I2C1 reads the two temperature bytes from a TMP102 at 0x48 once a second.
//! The whole transaction after START runs from the event interrupt.
//!
//! Hardware Connection:
//!   - SCL PB6, SDA PB9 to the TMP102 breakout (ADD0 to ground)
//!   - Diagnostic clock/data on PE0/PE1, error pin on PE3
//!
//! Expected Behavior:
//!   - Both raw bytes are bit-banged on PE0/PE1 as soon as they arrive
//!   - The temperature is logged in hundredths of a degree

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    i2c::{self, I2c},
    interrupt,
    time::Hertz,
};
use embassy_sync::{
    blocking_mutex::{CriticalSectionMutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use embassy_time::{Duration, Ticker, with_timeout};
use peripheral_core::i2c_master::{MasterAction, Reading, Tmp102Reader};
use peripheral_core::{DiagnosticPort, StatusPin};
use peripheral_demos::hardware::{
    board,
    i2c::{I2cStatus, InterruptPort},
};
use {defmt_rtt as _, panic_probe as _};

struct Diagnostics {
    port: DiagnosticPort<Output<'static>, Output<'static>>,
    error: StatusPin<Output<'static>>,
}

static READER: CriticalSectionMutex<RefCell<Tmp102Reader>> =
    CriticalSectionMutex::new(RefCell::new(Tmp102Reader::new()));

static DIAGNOSTICS: CriticalSectionMutex<RefCell<Option<Diagnostics>>> =
    CriticalSectionMutex::new(RefCell::new(None));

static READINGS: Signal<CriticalSectionRawMutex, Result<Reading, I2cStatus>> = Signal::new();

fn on_i2c_interrupt() {
    let port = InterruptPort::i2c1();
    let (event, status) = port.master_event();

    match READER.lock(|reader| reader.borrow_mut().on_event(event)) {
        MasterAction::None => {}
        MasterAction::Send(byte) => port.write(byte),
        MasterAction::NackAndStop => port.nack_and_stop(),
        MasterAction::Complete(reading) => {
            DIAGNOSTICS.lock(|diagnostics| {
                if let Some(diagnostics) = diagnostics.borrow_mut().as_mut() {
                    let _ = diagnostics.port.bang_buffer(&reading.as_bytes());
                }
            });
            READINGS.signal(Ok(reading));
        }
        MasterAction::ReportError => {
            port.nack_and_stop();
            DIAGNOSTICS.lock(|diagnostics| {
                if let Some(diagnostics) = diagnostics.borrow_mut().as_mut() {
                    let _ = diagnostics.error.pulse(1);
                }
            });
            READINGS.signal(Err(status));
        }
    }
}

#[interrupt]
fn I2C1_EV() {
    on_i2c_interrupt();
}

#[interrupt]
fn I2C1_ER() {
    on_i2c_interrupt();
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("TMP102 reader, address byte 0x{:02x}", Tmp102Reader::address_byte());

    DIAGNOSTICS.lock(|diagnostics| {
        diagnostics.replace(Some(Diagnostics {
            port: DiagnosticPort::new(
                Output::new(p.PE0, Level::Low, Speed::VeryHigh),
                Output::new(p.PE1, Level::Low, Speed::VeryHigh),
            ),
            error: StatusPin::new(Output::new(p.PE3, Level::Low, Speed::VeryHigh)),
        }));
    });

    // 50 kHz standard mode
    let _i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB9, Hertz(50_000), i2c::Config::default());
    let port = InterruptPort::i2c1();
    port.enable_interrupts();

    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::I2C1_EV);
        cortex_m::peripheral::NVIC::unmask(interrupt::I2C1_ER);
    }

    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        READINGS.reset();
        READER.lock(|reader| reader.borrow_mut().restart());
        port.start();

        match with_timeout(Duration::from_millis(100), READINGS.wait()).await {
            Ok(Ok(reading)) => info!(
                "Raw {=[u8]:02x}, {} centi-degrees C",
                &reading.as_bytes()[..],
                reading.centi_celsius()
            ),
            Ok(Err(status)) => warn!("Transaction failed, SR1/SR2 {}", status),
            Err(_) => {
                warn!("No answer, releasing the bus");
                port.nack_and_stop();
            }
        }
        ticker.next().await;
    }
}

// Notes:
// 1. ACK is cleared and STOP requested as soon as the first byte is in, so
//    the second byte is NACKed and the bus released
// 2. A NACK or bus error clears the error flags, sends STOP and pulses the
//    error pin; the next tick starts a fresh transaction
