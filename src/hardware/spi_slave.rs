//! SPI peripheral driven as an interrupt-fed slave
//!
//! embassy only drives SPI as a master, so the pins and clock are set up with
//! a blocking `Spi` and the registers are then switched to slave mode with
//! software NSS. The chip select line arrives on a GPIO with EXTI and is fed
//! to the peripheral through SSI.

use core::ptr;

use embassy_stm32::pac;
use embassy_stm32::pac::spi::vals;
use peripheral_core::spi_slave::ChipSelect;

/// Flags read from SR in one go
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct SpiStatus {
    pub rx_not_empty: bool,
    pub tx_empty: bool,
    pub overrun: bool,
    pub crc_error: bool,
}

#[derive(Clone, Copy)]
pub struct SlavePort {
    regs: pac::spi::Spi,
}

impl SlavePort {
    pub const fn new(regs: pac::spi::Spi) -> Self {
        Self { regs }
    }

    pub const fn spi1() -> Self {
        Self::new(pac::SPI1)
    }

    /// Switch the already clocked peripheral to slave mode, SPI disabled and
    /// deselected.
    pub fn configure(&self, hardware_crc: bool) {
        self.regs.cr1().modify(|w| {
            w.set_spe(false);
            w.set_mstr(vals::Mstr::SLAVE);
            w.set_ssm(true);
            w.set_ssi(true);
            w.set_crcen(hardware_crc);
        });
        self.regs.cr2().modify(|w| {
            w.set_rxneie(true);
            w.set_txeie(true);
            w.set_errie(true);
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.regs.cr1().read().spe()
    }

    pub fn enable(&self) {
        self.regs.cr1().modify(|w| {
            w.set_ssi(false);
            w.set_spe(true);
        });
    }

    pub fn disable(&self) {
        self.regs.cr1().modify(|w| {
            w.set_spe(false);
            w.set_ssi(true);
        });
    }

    /// Apply the decision taken for a chip select edge
    pub fn apply(&self, chip_select: ChipSelect) {
        match chip_select {
            ChipSelect::Enable => self.enable(),
            ChipSelect::Disable { preload } => {
                self.disable();
                self.clear_overrun();
                self.write(preload);
            }
        }
    }

    pub fn status(&self) -> SpiStatus {
        let sr = self.regs.sr().read();
        SpiStatus {
            rx_not_empty: sr.rxne(),
            tx_empty: sr.txe(),
            overrun: sr.ovr(),
            crc_error: sr.crcerr(),
        }
    }

    pub fn read(&self) -> u8 {
        // SAFETY: byte access to DR pops one frame in 8-bit mode
        unsafe { ptr::read_volatile(self.regs.dr().as_ptr() as *const u8) }
    }

    pub fn write(&self, byte: u8) {
        // SAFETY: byte access to DR queues one frame in 8-bit mode
        unsafe { ptr::write_volatile(self.regs.dr().as_ptr() as *mut u8, byte) }
    }

    /// Transmit-empty interrupts on or off
    pub fn listen_transmit(&self, enabled: bool) {
        self.regs.cr2().modify(|w| w.set_txeie(enabled));
    }

    /// OVR clears on a DR read followed by an SR read
    pub fn clear_overrun(&self) {
        let _ = self.read();
        let _ = self.regs.sr().read();
    }

    pub fn clear_crc_error(&self) {
        self.regs.sr().modify(|w| w.set_crcerr(false));
    }

    /// Restart the CRC calculation, only while SPI is disabled
    pub fn reset_crc(&self) {
        self.regs.cr1().modify(|w| w.set_crcen(false));
        self.regs.cr1().modify(|w| w.set_crcen(true));
    }

    /// Send the CRC after the byte currently in DR
    pub fn crc_next(&self) {
        self.regs.cr1().modify(|w| w.set_crcnext(vals::Crcnext::CRC));
    }
}
