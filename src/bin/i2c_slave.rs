//! I2C Adding Slave
//!
//! I2C1 answers at address 0x48. The master writes any number of bytes and
//! reads back their 16-bit sum, most significant byte first.
//!
//! Hardware Connection:
//!   - SCL PB6, SDA PB9 (external pull-ups)
//!   - Diagnostic clock/data on PE0/PE1, error pin on PE3
//!
//! Expected Behavior:
//!   - Every bus event is logged with the state it leads to
//!   - An interrupt that matches no event pulses PE3 and bit-bangs SR1/SR2
//!     as they were on entry; bus error flags are cleared

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
    channel::Channel,
};
use peripheral_core::i2c_slave::{AddingSlave, DEVICE_ADDRESS, SlaveAction, SlaveEvent, State};
use peripheral_core::{DiagnosticPort, StatusPin};
use peripheral_demos::hardware::{board, i2c::InterruptPort};
use {defmt_rtt as _, panic_probe as _};

struct Diagnostics {
    port: DiagnosticPort<Output<'static>, Output<'static>>,
    error: StatusPin<Output<'static>>,
}

static SLAVE: CriticalSectionMutex<RefCell<AddingSlave>> =
    CriticalSectionMutex::new(RefCell::new(AddingSlave::new()));

static DIAGNOSTICS: CriticalSectionMutex<RefCell<Option<Diagnostics>>> =
    CriticalSectionMutex::new(RefCell::new(None));

static EVENTS: Channel<CriticalSectionRawMutex, (SlaveEvent, State, u16), 8> = Channel::new();

fn on_i2c_interrupt() {
    let port = InterruptPort::i2c1();
    let (event, status) = port.slave_event();

    let (action, state, total) = SLAVE.lock(|slave| {
        let mut slave = slave.borrow_mut();
        let action = slave.on_event(event);
        (action, slave.state(), slave.total())
    });

    match action {
        SlaveAction::None => {}
        SlaveAction::Send(byte) => port.write(byte),
        SlaveAction::ReportError => {
            DIAGNOSTICS.lock(|diagnostics| {
                if let Some(diagnostics) = diagnostics.borrow_mut().as_mut() {
                    let _ = diagnostics.error.pulse(1);
                    let _ = diagnostics.port.bang_buffer(&status.bytes());
                }
            });
        }
    }
    let _ = EVENTS.try_send((event, state, total));
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
    info!("I2C adding slave at 0x{:02x}", DEVICE_ADDRESS);

    DIAGNOSTICS.lock(|diagnostics| {
        diagnostics.replace(Some(Diagnostics {
            port: DiagnosticPort::new(
                Output::new(p.PE0, Level::Low, Speed::VeryHigh),
                Output::new(p.PE1, Level::Low, Speed::VeryHigh),
            ),
            error: StatusPin::new(Output::new(p.PE3, Level::Low, Speed::VeryHigh)),
        }));
    });

    // Pins, clock and bus timing; slave addressing is set up below
    let _i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB9, Hertz(100_000), i2c::Config::default());
    InterruptPort::i2c1().listen_as_slave(DEVICE_ADDRESS);

    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::I2C1_EV);
        cortex_m::peripheral::NVIC::unmask(interrupt::I2C1_ER);
    }

    loop {
        let (event, state, total) = EVENTS.receive().await;
        match event {
            SlaveEvent::Unknown => warn!("Unexpected I2C interrupt"),
            _ => info!("{} -> {} (total {})", event, state, total),
        }
    }
}

// Notes:
// 1. A read following a write keeps the running total; only an address match
//    from Waiting starts a new sum
// 2. The STOP condition is acknowledged but leaves the state alone
