//! GoBus Main Board Example
//! SPI2 plays the main board against a GoBus 1.0 module (the `gobus_module`
//! binary on a second Discovery). It reads the module GUID, sends AddFive
//! with 41, waits for the module interrupt and fetches the result.
//!
//! Hardware Connection:
//!   - PB13 SCK, PB14 MISO, PB15 MOSI, PB12 chip select to the module's
//!     PA5/PA6/PA7/PA4
//!   - PB0 to the module's PB0 (interrupt line), common ground
//!
//! Expected Behavior:
//!   - The module GUID is logged
//!   - "41 + 5 = 46" every two seconds

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::khz;
use embassy_time::{Duration, Timer, with_timeout};
use peripheral_core::gobus::{self, command};
use peripheral_demos::hardware::{board, gobus_master::exchange};
use {defmt_rtt as _, panic_probe as _};

const OPERAND: u8 = 41;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("GoBus main board");

    let mut config = spi::Config::default();
    config.frequency = khz(250);
    let mut spi = Spi::new(p.SPI2, p.PB13, p.PB15, p.PB14, p.DMA1_CH4, p.DMA1_CH3, config);
    let mut cs = Output::new(p.PB12, Level::High, Speed::VeryHigh);
    let mut module_irq = ExtiInput::new(p.PB0, p.EXTI0, Pull::Up);

    match exchange(&mut spi, &mut cs, &gobus::module_id_request()).await {
        Ok(frame) => info!("Module GUID {=[u8]:02x}", &frame[1..17]),
        Err(error) => error!("GUID request failed: {}", error),
    }

    loop {
        Timer::after_secs(2).await;

        let add = unwrap!(gobus::request_frame(command::ADD_FIVE, &[OPERAND]));
        if let Err(error) = exchange(&mut spi, &mut cs, &add).await {
            warn!("AddFive failed: {}", error);
            continue;
        }
        if with_timeout(Duration::from_millis(100), module_irq.wait_for_falling_edge())
            .await
            .is_err()
        {
            warn!("No interrupt from the module");
            continue;
        }

        let get = unwrap!(gobus::request_frame(command::GET_VALUE, &[]));
        match exchange(&mut spi, &mut cs, &get).await {
            Ok(frame) if frame[2] == OPERAND + 5 => info!("{} + 5 = {}", OPERAND, frame[2]),
            Ok(frame) => warn!("Unexpected reply {=[u8]:02x}", &frame[..]),
            Err(error) => warn!("GetValue failed: {}", error),
        }
    }
}

// Notes:
// 1. A reply always belongs to the previous request; the GetValue exchange
//    clocks out what AddFive left in the module's buffer
