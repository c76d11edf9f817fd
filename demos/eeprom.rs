//! Non-volatile Record Example
//! A table of pulse lengths is written to the last flash sector and read
//! back for verification.
//!
//! Expected Behavior:
//!   - PD12 (green) is lit while the record is checked
//!   - PD14 (red) lights if the stored record does not match
//!   - The decoded pulses are logged

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Level, Output, Speed};
use peripheral_core::record::{self, DEFAULT_PULSES, Pulse};
use peripheral_demos::hardware::board;
use {defmt_rtt as _, panic_probe as _};

/// Sector 11, 128 KiB
const SECTOR_START: u32 = 0xE0000;
const SECTOR_END: u32 = 0x100000;

/// Flash is programmed in 8 byte units
const WRITE_UNIT: usize = 8;
const RECORD_LEN: usize = record::encoded_len(DEFAULT_PULSES.len()).next_multiple_of(WRITE_UNIT);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(board::hsi_16mhz());
    info!("Pulse record, {} bytes at 0x{:x}", RECORD_LEN, SECTOR_START);

    let mut checking = Output::new(p.PD12, Level::Low, Speed::Low);
    let mut failed = Output::new(p.PD14, Level::Low, Speed::Low);
    let mut flash = Flash::new_blocking(p.FLASH);

    let mut image = [0xFFu8; RECORD_LEN];
    unwrap!(record::encode(&DEFAULT_PULSES, &mut image));

    unwrap!(flash.blocking_erase(SECTOR_START, SECTOR_END));
    unwrap!(flash.blocking_write(SECTOR_START, &image));

    checking.set_high();
    let mut stored = [0u8; RECORD_LEN];
    unwrap!(flash.blocking_read(SECTOR_START, &mut stored));
    let result = record::verify(&DEFAULT_PULSES, &stored);
    checking.set_low();

    match result {
        Ok(()) => {
            let mut pulses = [Pulse::new(0, false); DEFAULT_PULSES.len()];
            let count = unwrap!(record::decode(&stored, &mut pulses));
            for pulse in &pulses[..count] {
                info!("{} us {}", pulse.length, if pulse.on { "on" } else { "off" });
            }
        }
        Err(error) => {
            failed.set_high();
            error!("Record check failed: {}", error);
        }
    }

    loop {
        embassy_time::Timer::after_secs(10).await;
    }
}

// Notes:
// 1. Erasing sector 11 takes around a second; the core stalls on flash
//    reads meanwhile
