//! Fixed-capacity transfer buffers
//!
//! One buffer per transfer direction. The ISR fills the receive buffer and
//! drains the transmit buffer one byte at a time; neither wraps silently,
//! the caller is told when a boundary is crossed.

use heapless::Vec;

/// Outcome of pushing a byte into an [`RxBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fill {
    /// Byte stored, buffer still has room
    Stored,
    /// Byte stored and the buffer is now full
    Full,
    /// Buffer was already full, byte dropped
    Rejected,
}

/// Receive buffer written by an ISR
#[derive(Debug, Clone)]
pub struct RxBuffer<const N: usize> {
    data: Vec<u8, N>,
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxBuffer<N> {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Store a received byte
    pub fn push(&mut self, byte: u8) -> Fill {
        if self.data.push(byte).is_err() {
            return Fill::Rejected;
        }
        if self.data.is_full() {
            Fill::Full
        } else {
            Fill::Stored
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.is_full()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Byte at `index`, if it has been received
    pub fn get(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    /// Copy of the received bytes, leaving the buffer untouched
    pub fn snapshot(&self) -> Vec<u8, N> {
        self.data.clone()
    }
}

/// Transmit buffer with a read cursor
#[derive(Debug, Clone)]
pub struct TxBuffer<const N: usize> {
    data: [u8; N],
    cursor: usize,
}

impl<const N: usize> Default for TxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TxBuffer<N> {
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            cursor: 0,
        }
    }

    pub const fn from_array(data: [u8; N]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Next byte to shift out.
    ///
    /// The flag is true when this byte was the last one and the cursor went
    /// back to the start.
    pub fn next(&mut self) -> (u8, bool) {
        let byte = self.data[self.cursor];
        self.cursor += 1;
        if self.cursor == N {
            self.cursor = 0;
            (byte, true)
        } else {
            (byte, false)
        }
    }

    /// Number of bytes sent since the last wrap or rewind
    pub fn sent(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn set(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = byte;
        }
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rx_fills_then_rejects() {
        let mut rx: RxBuffer<3> = RxBuffer::new();
        assert_eq!(rx.push(1), Fill::Stored);
        assert_eq!(rx.push(2), Fill::Stored);
        assert_eq!(rx.push(3), Fill::Full);
        assert_eq!(rx.push(4), Fill::Rejected);
        assert_eq!(rx.as_slice(), &[1, 2, 3]);

        rx.clear();
        assert!(rx.is_empty());
        assert_eq!(rx.get(0), None);
    }

    #[test]
    fn test_rx_snapshot_is_independent() {
        let mut rx: RxBuffer<4> = RxBuffer::new();
        rx.push(9);
        let copy = rx.snapshot();
        rx.clear();
        assert_eq!(copy.as_slice(), &[9]);
    }

    #[test]
    fn test_tx_wraps() {
        let mut tx = TxBuffer::from_array([10, 20, 30]);
        assert_eq!(tx.next(), (10, false));
        assert_eq!(tx.next(), (20, false));
        assert_eq!(tx.sent(), 2);
        assert_eq!(tx.next(), (30, true));
        assert_eq!(tx.sent(), 0);
        assert_eq!(tx.next(), (10, false));
    }

    #[test]
    fn test_tx_set_out_of_range_is_ignored() {
        let mut tx: TxBuffer<2> = TxBuffer::new();
        tx.set(1, 7);
        tx.set(5, 9);
        assert_eq!(tx.as_slice(), &[0, 7]);
        tx.next();
        tx.rewind();
        assert_eq!(tx.sent(), 0);
    }
}
