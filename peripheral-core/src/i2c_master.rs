//! Interrupt-driven TMP102 reader
//!
//! One read transaction of two bytes: START, address with the read bit, the
//! temperature MSB (ACKed), the LSB (NACKed) and STOP.

/// 7-bit TMP102 address with ADD0 tied to ground
pub const DEVICE_ADDRESS: u8 = 0x48;

pub const READ: u8 = 1;
pub const WRITE: u8 = 0;

/// Written when the peripheral asks for data on a read transaction
pub const DUMMY_BYTE: u8 = 0xAA;

/// Event decoded from the I2C status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterEvent {
    StartSent,
    AddressAcknowledged,
    ByteReceived(u8),
    TransmitRequest,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterAction {
    None,
    /// Write the byte to the data register
    Send(u8),
    /// Clear ACK and request STOP before the last byte arrives
    NackAndStop,
    /// Both bytes are in
    Complete(Reading),
    /// Transaction abandoned: release the bus with STOP and pulse the
    /// error pin
    ReportError,
}

/// Raw register value read from the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub msb: u8,
    pub lsb: u8,
}

impl Reading {
    /// 12-bit two's complement temperature in 1/16 °C
    pub fn celsius_x16(&self) -> i16 {
        let raw = (u16::from(self.msb) << 4) | u16::from(self.lsb >> 4);
        // sign extend from bit 11
        ((raw << 4) as i16) >> 4
    }

    /// Temperature in hundredths of a degree, truncated toward zero
    pub fn centi_celsius(&self) -> i32 {
        i32::from(self.celsius_x16()) * 100 / 16
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        [self.msb, self.lsb]
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tmp102Reader {
    buffer: [u8; 2],
    next_byte: usize,
}

impl Tmp102Reader {
    pub const fn new() -> Self {
        Self {
            buffer: [0; 2],
            next_byte: 0,
        }
    }

    /// Address byte sent after START
    pub const fn address_byte() -> u8 {
        (DEVICE_ADDRESS << 1) | READ
    }

    /// Forget a partial reading before the next START
    pub fn restart(&mut self) {
        self.next_byte = 0;
    }

    pub fn on_event(&mut self, event: MasterEvent) -> MasterAction {
        match event {
            MasterEvent::StartSent => MasterAction::Send(Self::address_byte()),
            MasterEvent::AddressAcknowledged => MasterAction::None,
            MasterEvent::ByteReceived(byte) => {
                if let Some(slot) = self.buffer.get_mut(self.next_byte) {
                    *slot = byte;
                }
                self.next_byte += 1;
                if self.next_byte == 1 {
                    MasterAction::NackAndStop
                } else {
                    let reading = Reading {
                        msb: self.buffer[0],
                        lsb: self.buffer[1],
                    };
                    self.next_byte = 0;
                    MasterAction::Complete(reading)
                }
            }
            MasterEvent::TransmitRequest => MasterAction::Send(DUMMY_BYTE),
            MasterEvent::Unknown => {
                self.restart();
                MasterAction::ReportError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_transaction() {
        let mut reader = Tmp102Reader::new();
        assert_eq!(reader.on_event(MasterEvent::StartSent), MasterAction::Send(0x91));
        assert_eq!(reader.on_event(MasterEvent::AddressAcknowledged), MasterAction::None);
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x19)),
            MasterAction::NackAndStop
        );
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x00)),
            MasterAction::Complete(Reading { msb: 0x19, lsb: 0x00 })
        );
    }

    #[test]
    fn test_transmit_request_sends_dummy() {
        let mut reader = Tmp102Reader::new();
        assert_eq!(
            reader.on_event(MasterEvent::TransmitRequest),
            MasterAction::Send(DUMMY_BYTE)
        );
        assert_eq!(reader.on_event(MasterEvent::Unknown), MasterAction::ReportError);
    }

    #[test]
    fn test_second_reading_starts_fresh() {
        let mut reader = Tmp102Reader::new();
        reader.on_event(MasterEvent::ByteReceived(1));
        reader.on_event(MasterEvent::ByteReceived(2));
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(3)),
            MasterAction::NackAndStop
        );
        reader.restart();
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(4)),
            MasterAction::NackAndStop
        );
    }

    #[test]
    fn test_reading_after_failed_transaction() {
        let mut reader = Tmp102Reader::new();
        // address NACKed
        assert_eq!(reader.on_event(MasterEvent::StartSent), MasterAction::Send(0x91));
        assert_eq!(reader.on_event(MasterEvent::Unknown), MasterAction::ReportError);

        // bus error half way through the next one
        reader.restart();
        reader.on_event(MasterEvent::StartSent);
        reader.on_event(MasterEvent::AddressAcknowledged);
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x7F)),
            MasterAction::NackAndStop
        );
        assert_eq!(reader.on_event(MasterEvent::Unknown), MasterAction::ReportError);

        reader.restart();
        assert_eq!(reader.on_event(MasterEvent::StartSent), MasterAction::Send(0x91));
        assert_eq!(reader.on_event(MasterEvent::AddressAcknowledged), MasterAction::None);
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x19)),
            MasterAction::NackAndStop
        );
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x00)),
            MasterAction::Complete(Reading { msb: 0x19, lsb: 0x00 })
        );
    }

    #[test]
    fn test_error_drops_partial_reading() {
        let mut reader = Tmp102Reader::new();
        reader.on_event(MasterEvent::ByteReceived(0x7F));
        reader.on_event(MasterEvent::Unknown);
        // no restart: the first byte after an error is an MSB again
        assert_eq!(
            reader.on_event(MasterEvent::ByteReceived(0x19)),
            MasterAction::NackAndStop
        );
    }

    #[test]
    fn test_temperature_conversion() {
        // datasheet table 5
        let cases = [
            (0x7F, 0xF0, 2047, 12793),
            (0x19, 0x00, 400, 2500),
            (0x00, 0x40, 4, 25),
            (0x00, 0x00, 0, 0),
            (0xFF, 0xC0, -4, -25),
            (0xE7, 0x00, -400, -2500),
            (0xC9, 0x00, -880, -5500),
        ];
        for (msb, lsb, x16, centi) in cases {
            let reading = Reading { msb, lsb };
            assert_eq!(reading.celsius_x16(), x16);
            assert_eq!(reading.centi_celsius(), centi);
        }
    }
}
