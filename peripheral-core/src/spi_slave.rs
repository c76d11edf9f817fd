//! Buffered SPI slave
//!
//! The master clocks fixed-size frames in and out. Every received byte goes
//! into the receive buffer; every transmit-empty interrupt takes the next byte
//! of the transmit buffer. Both directions wrap after [`BUFFER_SIZE`] bytes.
//!
//! ```text
//!            CS falling                CS rising
//! Deselected ----------> Selected -----------------> Deselected
//!                          |  ^                        (buffers reset,
//!                 RXNE/TXE |  | byte                    DR = 0xFF)
//!                          +--+
//! ```

use heapless::Vec;

use crate::Edge;
use crate::buffer::{Fill, RxBuffer, TxBuffer};
use crate::status::StatusCode;

/// Frame length in both directions
pub const BUFFER_SIZE: usize = 17;

/// Byte loaded into the data register while nothing has been queued
pub const IDLE_BYTE: u8 = 0xFF;

/// First value of the transmit pattern (`100 + index`)
pub const TX_PATTERN_START: u8 = 100;

/// A complete frame received from the master
pub type Frame = Vec<u8, BUFFER_SIZE>;

/// Something the main loop should know about
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    RxBufferFull(Frame),
    TxBufferEmpty,
    Overflow,
}

impl Event {
    pub fn status(&self) -> StatusCode {
        match self {
            Event::RxBufferFull(_) => StatusCode::RxBufferFull,
            Event::TxBufferEmpty => StatusCode::TxBufferEmpty,
            Event::Overflow => StatusCode::Overflow,
        }
    }
}

/// What to do with the SPI peripheral after a chip select edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSelect {
    /// Clear SSI and enable the peripheral
    Enable,
    /// Disable the peripheral, set SSI and preload the data register
    Disable { preload: u8 },
}

#[derive(Debug, Clone)]
pub struct BufferedSlave {
    rx: RxBuffer<BUFFER_SIZE>,
    tx: TxBuffer<BUFFER_SIZE>,
}

impl Default for BufferedSlave {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedSlave {
    /// Slave with the `100, 101, ..` transmit pattern
    pub const fn new() -> Self {
        let mut pattern = [0u8; BUFFER_SIZE];
        let mut index = 0;
        while index < BUFFER_SIZE {
            pattern[index] = TX_PATTERN_START + index as u8;
            index += 1;
        }
        Self::with_reply(pattern)
    }

    pub const fn with_reply(reply: [u8; BUFFER_SIZE]) -> Self {
        Self {
            rx: RxBuffer::new(),
            tx: TxBuffer::from_array(reply),
        }
    }

    /// Drop partial frames in both directions.
    ///
    /// Returns the byte to preload into the data register.
    pub fn reset(&mut self) -> u8 {
        self.rx.clear();
        self.tx.rewind();
        IDLE_BYTE
    }

    pub fn on_chip_select(&mut self, edge: Edge) -> ChipSelect {
        match edge {
            Edge::Falling => ChipSelect::Enable,
            Edge::Rising => ChipSelect::Disable {
                preload: self.reset(),
            },
        }
    }

    /// Byte arrived from the master
    pub fn on_receive(&mut self, byte: u8) -> Option<Event> {
        match self.rx.push(byte) {
            Fill::Stored => None,
            Fill::Full => {
                let frame = self.rx.snapshot();
                self.rx.clear();
                Some(Event::RxBufferFull(frame))
            }
            // unreachable while full frames are cleared above
            Fill::Rejected => {
                self.rx.clear();
                Some(Event::Overflow)
            }
        }
    }

    /// Master is ready for the next byte
    pub fn on_transmit(&mut self) -> (u8, Option<Event>) {
        let (byte, wrapped) = self.tx.next();
        (byte, wrapped.then_some(Event::TxBufferEmpty))
    }

    /// Receive overrun flagged by the peripheral
    pub fn on_overrun(&mut self) -> Event {
        Event::Overflow
    }

    pub fn received(&self) -> &[u8] {
        self.rx.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_pattern() {
        let mut slave = BufferedSlave::new();
        let (first, _) = slave.on_transmit();
        let (second, _) = slave.on_transmit();
        assert_eq!(first, 100);
        assert_eq!(second, 101);
    }

    #[test]
    fn test_rx_frame_completes_after_buffer_size() {
        let mut slave = BufferedSlave::new();
        for byte in 0..(BUFFER_SIZE as u8 - 1) {
            assert_eq!(slave.on_receive(byte), None);
        }
        let event = slave.on_receive(0xAB).unwrap();
        match event {
            Event::RxBufferFull(frame) => {
                assert_eq!(frame.len(), BUFFER_SIZE);
                assert_eq!(frame[0], 0);
                assert_eq!(frame[BUFFER_SIZE - 1], 0xAB);
            }
            other => panic!("unexpected event {:?}", other),
        }
        // buffer starts over
        assert!(slave.received().is_empty());
        assert_eq!(slave.on_receive(1), None);
        assert_eq!(slave.received(), &[1]);
    }

    #[test]
    fn test_tx_buffer_empty_after_full_pass() {
        let mut slave = BufferedSlave::new();
        for _ in 0..BUFFER_SIZE - 1 {
            assert_eq!(slave.on_transmit().1, None);
        }
        let (last, event) = slave.on_transmit();
        assert_eq!(last, 100 + BUFFER_SIZE as u8 - 1);
        assert_eq!(event, Some(Event::TxBufferEmpty));
        assert_eq!(slave.on_transmit().0, 100);
    }

    #[test]
    fn test_deselect_resets_partial_frames() {
        let mut slave = BufferedSlave::new();
        assert_eq!(slave.on_chip_select(Edge::Falling), ChipSelect::Enable);
        slave.on_receive(5);
        slave.on_transmit();

        assert_eq!(
            slave.on_chip_select(Edge::Rising),
            ChipSelect::Disable { preload: IDLE_BYTE }
        );
        assert!(slave.received().is_empty());
        assert_eq!(slave.on_transmit().0, 100);
    }

    #[test]
    fn test_event_status_codes() {
        let mut slave = BufferedSlave::new();
        assert_eq!(slave.on_overrun().status(), StatusCode::Overflow);
        assert_eq!(Event::TxBufferEmpty.status(), StatusCode::TxBufferEmpty);
    }

    #[test]
    fn test_custom_reply() {
        let mut reply = [0x55; BUFFER_SIZE];
        reply[0] = 0x11;
        let mut slave = BufferedSlave::with_reply(reply);
        assert_eq!(slave.on_transmit().0, 0x11);
        assert_eq!(slave.on_transmit().0, 0x55);
    }
}
