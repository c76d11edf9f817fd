//! Buffered SPI Slave
//!
//! SPI1 runs as a slave with software NSS. Every received byte is stored in a
//! 17 byte buffer and every transmit request is answered from a 17 byte
//! pattern (`100, 101, ...`). Releasing chip select drops partial frames.
//!
//! Hardware Connection:
//!   - SCK PA5, MISO PA6, MOSI PA7, chip select PA4 (active low)
//!   - Diagnostic clock/data on PE0/PE1, status pin on PE2
//!
//! Expected Behavior:
//!   - Each complete frame is logged and bit-banged on PE0/PE1
//!   - The status pin pulses once per event (2 = frame in, 3 = reply out,
//!     4 = overrun, 6/7 = chip select edges)

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    interrupt,
    spi::{self, Spi},
};
use embassy_sync::{
    blocking_mutex::{CriticalSectionMutex, raw::CriticalSectionRawMutex},
    channel::Channel,
};
use peripheral_core::spi_slave::{BufferedSlave, Event};
use peripheral_core::{DiagnosticPort, Edge, StatusCode, StatusPin};
use peripheral_demos::hardware::{board, spi_slave::SlavePort};
use {defmt_rtt as _, panic_probe as _};

static SLAVE: CriticalSectionMutex<RefCell<BufferedSlave>> =
    CriticalSectionMutex::new(RefCell::new(BufferedSlave::new()));

// a frame boundary raises RX full and TX empty from the same interrupt
static EVENTS: Channel<CriticalSectionRawMutex, Event, 4> = Channel::new();

#[interrupt]
fn SPI1() {
    let port = SlavePort::spi1();
    let status = port.status();

    SLAVE.lock(|slave| {
        let mut slave = slave.borrow_mut();
        if status.overrun {
            port.clear_overrun();
            let _ = EVENTS.try_send(slave.on_overrun());
            return;
        }
        if status.rx_not_empty {
            if let Some(event) = slave.on_receive(port.read()) {
                let _ = EVENTS.try_send(event);
            }
        }
        if status.tx_empty {
            let (byte, event) = slave.on_transmit();
            port.write(byte);
            if let Some(event) = event {
                let _ = EVENTS.try_send(event);
            }
        }
    });
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("Buffered SPI slave");

    let mut diagnostics = DiagnosticPort::new(
        Output::new(p.PE0, Level::Low, Speed::VeryHigh),
        Output::new(p.PE1, Level::Low, Speed::VeryHigh),
    );
    let mut status_pin = StatusPin::new(Output::new(p.PE2, Level::Low, Speed::VeryHigh));

    // Pins and peripheral clock only, the registers are reprogrammed below
    let _spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi::Config::default());
    let port = SlavePort::spi1();
    port.configure(false);
    port.write(SLAVE.lock(|slave| slave.borrow_mut().reset()));

    let mut chip_select = ExtiInput::new(p.PA4, p.EXTI4, Pull::Up);
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::SPI1);
    }

    loop {
        let code = match select(chip_select.wait_for_any_edge(), EVENTS.receive()).await {
            Either::First(()) => {
                let edge = if chip_select.is_low() {
                    Edge::Falling
                } else {
                    Edge::Rising
                };
                port.apply(SLAVE.lock(|slave| slave.borrow_mut().on_chip_select(edge)));
                match edge {
                    Edge::Falling => StatusCode::CsFallingEdge,
                    Edge::Rising => StatusCode::CsRisingEdge,
                }
            }
            Either::Second(event) => {
                match &event {
                    Event::RxBufferFull(frame) => {
                        info!("Frame: {=[u8]:02x}", frame.as_slice());
                        unwrap!(diagnostics.bang_buffer(frame));
                    }
                    Event::TxBufferEmpty => debug!("Reply sent"),
                    Event::Overflow => warn!("Receive overrun"),
                }
                event.status()
            }
        };
        unwrap!(status_pin.emit(code));
    }
}

// Notes:
// 1. SSM/SSI replace the NSS pin so PA4 can be watched through EXTI
// 2. The data register is preloaded with 0xFF before every frame, the
//    pattern starts with the second byte on the wire
