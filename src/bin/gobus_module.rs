//! Basic GoBus 1.0 Module
//!
//! SPI1 slave speaking the GoBus 1.0 framing with the hardware CRC. The main
//! board either asks for the module GUID (first byte 0xFE) or sends a command
//! frame (first byte 0x80); commands are run from the main loop and the
//! module pulses its interrupt line when the reply is ready.
//!
//! Hardware Connection:
//!   - SCK PA5, MISO PA6, MOSI PA7, chip select PA4 (active low)
//!   - GoBus interrupt line to the main board on PB0 (idles high)
//!   - Status pin on PE2: one burst per status, held high while a command
//!     runs
//!
//! Expected Behavior:
//!   - Command 0x01 answers with the third request byte plus five
//!   - Command 0x02 returns the reply buffer unchanged

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
use peripheral_core::gobus::{self, BusError, COMMANDS, GoBusModule};
use peripheral_core::{Edge, StatusCode, StatusPin};
use peripheral_demos::hardware::{board, spi_slave::SlavePort};
use {defmt_rtt as _, panic_probe as _};

static MODULE: CriticalSectionMutex<RefCell<GoBusModule>> =
    CriticalSectionMutex::new(RefCell::new(GoBusModule::new(gobus::MODULE_ID)));

static STATUS: Channel<CriticalSectionRawMutex, StatusCode, 4> = Channel::new();

#[interrupt]
fn SPI1() {
    let port = SlavePort::spi1();
    let status = port.status();

    MODULE.lock(|module| {
        let mut module = module.borrow_mut();
        if status.overrun || status.crc_error {
            port.disable();
            let error = if status.overrun {
                port.clear_overrun();
                BusError::Overflow
            } else {
                port.clear_crc_error();
                BusError::Crc
            };
            let _ = STATUS.try_send(module.on_error(error));
            return;
        }
        if status.rx_not_empty {
            if let Some(code) = module.on_receive(port.read()) {
                let _ = STATUS.try_send(code);
            }
        }
        if status.tx_empty {
            match module.on_transmit() {
                Some(action) => {
                    port.write(action.byte);
                    if action.crc_next {
                        port.crc_next();
                    }
                }
                // the CRC is on its way, nothing more to queue
                None => port.listen_transmit(false),
            }
        }
    });
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("GoBus 1.0 module");

    let mut irq_line = Output::new(p.PB0, Level::High, Speed::Low);
    let mut status_pin = StatusPin::new(Output::new(p.PE2, Level::Low, Speed::VeryHigh));

    let _spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi::Config::default());
    let port = SlavePort::spi1();
    port.configure(true);
    port.reset_crc();
    let preload = MODULE.lock(|module| module.borrow_mut().reset_frame(port.is_enabled()));
    port.write(unwrap!(preload));

    let mut chip_select = ExtiInput::new(p.PA4, p.EXTI4, Pull::Up);
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::SPI1);
    }

    loop {
        match select(chip_select.wait_for_any_edge(), STATUS.receive()).await {
            Either::First(()) => {
                let edge = if chip_select.is_low() {
                    Edge::Falling
                } else {
                    Edge::Rising
                };
                if edge == Edge::Rising {
                    port.disable();
                }
                let action = MODULE.lock(|module| {
                    module
                        .borrow_mut()
                        .on_chip_select(edge, port.is_enabled())
                });
                let Some(action) = action else {
                    warn!("SPI still enabled, frame not reset");
                    continue;
                };
                port.apply(action);
                if edge == Edge::Rising {
                    port.reset_crc();
                    port.listen_transmit(true);
                }
            }
            Either::Second(code) => {
                unwrap!(status_pin.emit(code));
                if code.is_error() {
                    warn!("Transfer failed: {}", code);
                    continue;
                }
                let ran = unwrap!(status_pin.mark(|| {
                    MODULE.lock(|module| {
                        let mut module = module.borrow_mut();
                        let request = module.take_request()?;
                        module.dispatch(&request, &COMMANDS)
                    })
                }));
                if let Some(command) = ran {
                    info!("Command 0x{:02x} done", command);
                    unwrap!(gobus::notify_main_board(&mut irq_line));
                }
            }
        }
    }
}

// Notes:
// 1. The CRC byte follows the 16th reply byte automatically once CRCNEXT is
//    set; the peripheral checks the master's CRC the same way
// 2. A failed transfer leaves SPI disabled until the next chip select cycle
