//! 74HC595 Shift Register Example
//! Two daisy-chained 74HC595s are driven by bit-banging. A single lit
//! output walks across all sixteen outputs.
//!
//! Hardware Connection:
//!   - PE7 SRCLK, PE8 SER, PE9 RCLK, PE10 SRCLR, PE11 OE
//!   - QH' of the first register to SER of the second, LEDs on the outputs
//!
//! Expected Behavior:
//!   - One LED lit at a time, moving every 100 ms and wrapping after 16

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_time::Timer;
use peripheral_core::ShiftRegisterChain;
use peripheral_core::bitbang::walking_bit;
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

const REGISTERS: usize = 2;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("{} chained shift registers", REGISTERS);

    let mut chain = ShiftRegisterChain::new(
        Output::new(p.PE7, Level::Low, Speed::VeryHigh),
        Output::new(p.PE8, Level::Low, Speed::VeryHigh),
        Output::new(p.PE9, Level::Low, Speed::VeryHigh),
        Output::new(p.PE10, Level::High, Speed::VeryHigh),
        Output::new(p.PE11, Level::High, Speed::VeryHigh),
    );

    let mut registers = [0u8; REGISTERS];
    loop {
        for step in 0..REGISTERS * 8 {
            walking_bit(step, &mut registers);
            unwrap!(chain.write(&registers));
            trace!("step {}: {=[u8]:08b}", step, &registers[..]);
            Timer::after_millis(100).await;
        }
    }
}
