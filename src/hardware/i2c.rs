//! Interrupt-mode I2C on the v1 peripheral
//!
//! `I2c::new_blocking` sets up the pins, clock and timing; the event and
//! error interrupts are then enabled here and each interrupt is decoded into
//! one protocol event.

use embassy_stm32::pac;
use embassy_stm32::pac::i2c::regs::Sr1;
use peripheral_core::i2c_master::MasterEvent;
use peripheral_core::i2c_slave::SlaveEvent;

/// Raw status registers, bit-banged when an interrupt is not understood
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct I2cStatus {
    pub sr1: u16,
    pub sr2: u16,
}

impl I2cStatus {
    pub fn bytes(&self) -> [u8; 4] {
        let [sr1_hi, sr1_lo] = self.sr1.to_be_bytes();
        let [sr2_hi, sr2_lo] = self.sr2.to_be_bytes();
        [sr1_hi, sr1_lo, sr2_hi, sr2_lo]
    }
}

#[derive(Clone, Copy)]
pub struct InterruptPort {
    regs: pac::i2c::I2c,
}

impl InterruptPort {
    pub const fn i2c1() -> Self {
        Self { regs: pac::I2C1 }
    }

    /// Answer to the 7-bit `address` and acknowledge every byte
    pub fn listen_as_slave(&self, address: u8) {
        self.regs.cr1().modify(|w| w.set_pe(false));
        self.regs.oar1().write(|w| {
            w.set_add(u16::from(address) << 1);
            // reference manual: bit 14 must be kept at 1
            w.0 |= 1 << 14;
        });
        self.enable_interrupts();
        self.regs.cr1().modify(|w| {
            w.set_pe(true);
            w.set_ack(true);
        });
    }

    pub fn enable_interrupts(&self) {
        self.regs.cr2().modify(|w| {
            w.set_itevten(true);
            w.set_itbufen(true);
            w.set_iterren(true);
        });
    }

    /// Begin a master transaction; the rest runs from the interrupt
    pub fn start(&self) {
        self.regs.cr1().modify(|w| {
            w.set_ack(true);
            w.set_start(true);
        });
    }

    pub fn write(&self, byte: u8) {
        self.regs.dr().write(|w| w.set_dr(byte));
    }

    pub fn nack_and_stop(&self) {
        self.regs.cr1().modify(|w| {
            w.set_ack(false);
            w.set_stop(true);
        });
    }

    /// SR1 then SR2, which also clears ADDR
    fn read_status(&self) -> (Sr1, I2cStatus) {
        let sr1 = self.regs.sr1().read();
        let sr2 = self.regs.sr2().read();
        let status = I2cStatus {
            sr1: sr1.0 as u16,
            sr2: sr2.0 as u16,
        };
        (sr1, status)
    }

    /// Decode and acknowledge one slave-side interrupt, with the status
    /// registers as they were on entry.
    ///
    /// A NACK is checked before TXE: the data register stays empty after the
    /// master refuses the last byte.
    pub fn slave_event(&self) -> (SlaveEvent, I2cStatus) {
        let (sr1, status) = self.read_status();
        let event = if bus_error(sr1) {
            self.clear_error_flags();
            SlaveEvent::Unknown
        } else if sr1.addr() {
            SlaveEvent::AddressMatched
        } else if sr1.rxne() {
            SlaveEvent::ByteReceived(self.regs.dr().read().dr())
        } else if sr1.af() {
            self.clear_error_flags();
            SlaveEvent::AcknowledgeFailure
        } else if sr1.txe() {
            SlaveEvent::TransmitRequest
        } else if sr1.stopf() {
            // STOPF clears on SR1 read then a CR1 write
            self.regs.cr1().modify(|_| {});
            SlaveEvent::Stop
        } else {
            SlaveEvent::Unknown
        };
        (event, status)
    }

    /// Decode one master-side interrupt.
    ///
    /// A NACKed address, bus error or lost arbitration comes back as
    /// `Unknown` with its flags cleared; the caller sends STOP to let go of
    /// the bus.
    pub fn master_event(&self) -> (MasterEvent, I2cStatus) {
        let (sr1, status) = self.read_status();
        let event = if bus_error(sr1) || sr1.af() {
            self.clear_error_flags();
            MasterEvent::Unknown
        } else if sr1.start() {
            MasterEvent::StartSent
        } else if sr1.addr() {
            MasterEvent::AddressAcknowledged
        } else if sr1.rxne() {
            MasterEvent::ByteReceived(self.regs.dr().read().dr())
        } else if sr1.txe() {
            MasterEvent::TransmitRequest
        } else {
            MasterEvent::Unknown
        };
        (event, status)
    }

    /// Clear AF, BERR, ARLO, OVR and the SMBus error flags.
    ///
    /// They are rc_w0 and keep the error interrupt pending until cleared,
    /// so ones are written everywhere else.
    pub fn clear_error_flags(&self) {
        self.regs.sr1().write(|w| {
            w.0 = !0;
            w.set_af(false);
            w.set_berr(false);
            w.set_arlo(false);
            w.set_ovr(false);
            w.set_pecerr(false);
            w.set_timeout(false);
            w.set_alert(false);
        });
    }
}

fn bus_error(sr1: Sr1) -> bool {
    sr1.berr() || sr1.arlo() || sr1.ovr() || sr1.timeout() || sr1.pecerr()
}
