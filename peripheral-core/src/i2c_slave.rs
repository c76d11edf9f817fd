//! Adding I2C slave
//!
//! The master writes any number of bytes; the slave adds them up. A
//! following read returns the 16-bit total, most significant byte first.
//!
//! ```text
//!  Waiting --addr--> Adding --TXE--> SendingMsb --TXE--> SendingLsb
//!     ^                ^ |                                   |
//!     |                +-+ byte                              |
//!     +---------------------- NACK --------------------------+
//! ```

/// 7-bit slave address
pub const DEVICE_ADDRESS: u8 = 0x48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    #[default]
    Waiting,
    Adding,
    SendingMsb,
    SendingLsb,
}

/// Event decoded from the I2C status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveEvent {
    AddressMatched,
    ByteReceived(u8),
    TransmitRequest,
    /// Master did not acknowledge, end of a slave transmission
    AcknowledgeFailure,
    Stop,
    Unknown,
}

/// What the interrupt handler does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveAction {
    None,
    /// Write the byte to the data register
    Send(u8),
    /// Pulse the error pin and bit-bang the status registers
    ReportError,
}

#[derive(Debug, Clone, Default)]
pub struct AddingSlave {
    state: State,
    total: u16,
}

impl AddingSlave {
    pub const fn new() -> Self {
        Self {
            state: State::Waiting,
            total: 0,
        }
    }

    pub fn on_event(&mut self, event: SlaveEvent) -> SlaveAction {
        match event {
            SlaveEvent::AddressMatched => {
                // a read following a write keeps the running total
                if self.state == State::Waiting {
                    self.state = State::Adding;
                    self.total = 0;
                }
                SlaveAction::None
            }
            SlaveEvent::ByteReceived(byte) => {
                self.total = self.total.wrapping_add(u16::from(byte));
                self.state = State::Adding;
                SlaveAction::None
            }
            SlaveEvent::TransmitRequest => {
                if self.state == State::Adding {
                    self.state = State::SendingMsb;
                    SlaveAction::Send((self.total >> 8) as u8)
                } else {
                    self.state = State::SendingLsb;
                    SlaveAction::Send(self.total as u8)
                }
            }
            SlaveEvent::AcknowledgeFailure => {
                self.state = State::Waiting;
                SlaveAction::None
            }
            SlaveEvent::Stop => SlaveAction::None,
            SlaveEvent::Unknown => SlaveAction::ReportError,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn total(&self) -> u16 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(slave: &mut AddingSlave, bytes: &[u8]) {
        slave.on_event(SlaveEvent::AddressMatched);
        for &byte in bytes {
            slave.on_event(SlaveEvent::ByteReceived(byte));
        }
    }

    #[test]
    fn test_write_then_read_total() {
        let mut slave = AddingSlave::new();
        write(&mut slave, &[200, 100, 1]);
        assert_eq!(slave.total(), 301);

        // repeated start for the read
        slave.on_event(SlaveEvent::AddressMatched);
        assert_eq!(slave.on_event(SlaveEvent::TransmitRequest), SlaveAction::Send(0x01));
        assert_eq!(slave.state(), State::SendingMsb);
        assert_eq!(slave.on_event(SlaveEvent::TransmitRequest), SlaveAction::Send(0x2D));
        assert_eq!(slave.state(), State::SendingLsb);

        slave.on_event(SlaveEvent::AcknowledgeFailure);
        assert_eq!(slave.state(), State::Waiting);
    }

    #[test]
    fn test_new_transaction_clears_total() {
        let mut slave = AddingSlave::new();
        write(&mut slave, &[7]);
        slave.on_event(SlaveEvent::TransmitRequest);
        slave.on_event(SlaveEvent::AcknowledgeFailure);

        write(&mut slave, &[3]);
        assert_eq!(slave.total(), 3);
    }

    #[test]
    fn test_stop_keeps_state() {
        let mut slave = AddingSlave::new();
        write(&mut slave, &[1]);
        assert_eq!(slave.on_event(SlaveEvent::Stop), SlaveAction::None);
        assert_eq!(slave.state(), State::Adding);
        assert_eq!(slave.total(), 1);
    }

    #[test]
    fn test_total_wraps() {
        let mut slave = AddingSlave::new();
        slave.on_event(SlaveEvent::AddressMatched);
        for _ in 0..258 {
            slave.on_event(SlaveEvent::ByteReceived(0xFF));
        }
        assert_eq!(slave.total(), 258u32.wrapping_mul(255) as u16);
    }

    #[test]
    fn test_unknown_event_reports_error() {
        let mut slave = AddingSlave::new();
        assert_eq!(slave.on_event(SlaveEvent::Unknown), SlaveAction::ReportError);
        assert_eq!(slave.state(), State::Waiting);
    }
}
