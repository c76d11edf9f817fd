//! UART Transmit Example
//! Sends a greeting on USART2 roughly once a second.
//!
//! Hardware Connection:
//!   - PA2 (TX) to the RX line of a 3.3 V USB serial adapter, common ground
//!
//! Expected Behavior:
//!   - A terminal at 115200 8N1 prints the message every second

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::usart::{self, Uart};
use embassy_time::Timer;
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

const MESSAGE: &[u8] = b"Hello from my microcontroller....\n\r";

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("UART transmit");

    let mut config = usart::Config::default();
    config.baudrate = 115_200;
    let mut uart = unwrap!(Uart::new_blocking(p.USART2, p.PA3, p.PA2, config));

    loop {
        unwrap!(uart.blocking_write(MESSAGE));
        unwrap!(uart.blocking_flush());
        Timer::after_millis(1000).await;
    }
}
