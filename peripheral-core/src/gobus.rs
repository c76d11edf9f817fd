//! GoBus 1.0 module protocol
//!
//! A GoBus module is an SPI slave driven by a GO! main board. Every exchange
//! is an 18 byte frame in each direction:
//!
//! ```text
//! master -> module:  0x80 | command | payload (15) ...... | CRC
//! module -> master:  0x2A | reply (16) .................. | CRC
//! ```
//!
//! The module answers a `0xFE` first byte with its 16 byte GUID instead of
//! the reply buffer. A recognised command runs from the main loop once
//! 16 bytes have arrived; the handler fills the reply buffer and the module
//! pulses its interrupt line so the main board collects the answer with the
//! next exchange.
//!
//! The CRC is the SPI peripheral's hardware CRC-8 (polynomial 0x07, initial
//! value 0), computed over every byte on the wire before it.

use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::Edge;
use crate::buffer::{Fill, RxBuffer};
use crate::spi_slave::ChipSelect;
use crate::status::StatusCode;

/// First byte of a command frame sent by the main board
pub const COMMAND_RESPONSE: u8 = 0x80;

/// First byte of every frame sent by the module
pub const FRAME_PREFIX: u8 = 0x2A;

/// First byte asking the module for its GUID
pub const MODULE_ID_REQUEST: u8 = 0xFE;

/// Frame length without the CRC byte
pub const BUFFER_SIZE: usize = 17;

/// Receive capacity: a frame plus its CRC
pub const RX_SIZE: usize = BUFFER_SIZE + 1;

/// Bytes the module feeds to the data register before the CRC goes out
pub const REPLY_BYTES: usize = BUFFER_SIZE - 1;

/// Polynomial of the SPI hardware CRC
pub const CRC_POLYNOMIAL: u8 = 0x07;

/// GUID identifying this module type
pub const MODULE_ID: [u8; 16] = [
    0x80, 0x39, 0xe8, 0x2b, 0x55, 0x58, 0xeb, 0x48, 0xab, 0x9e, 0x48, 0xd3, 0xfd, 0xae, 0x8c, 0xee,
];

/// Command codes understood by this module
pub mod command {
    pub const ADD_FIVE: u8 = 0x01;
    pub const GET_VALUE: u8 = 0x02;
}

/// Transfer failure flagged by the SPI peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    Overflow,
    Crc,
}

impl From<BusError> for StatusCode {
    fn from(error: BusError) -> Self {
        match error {
            BusError::Overflow => StatusCode::Overflow,
            BusError::Crc => StatusCode::CrcError,
        }
    }
}

/// Problems found by the main board when checking a module frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte was not [`FRAME_PREFIX`]
    BadPrefix(u8),
    /// CRC byte did not match the frame
    Crc { expected: u8, received: u8 },
    /// Payload longer than a frame can carry
    PayloadTooLarge,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::BadPrefix(byte) => write!(f, "bad frame prefix 0x{:02x}", byte),
            FrameError::Crc { expected, received } => {
                write!(f, "crc mismatch: expected 0x{:02x}, got 0x{:02x}", expected, received)
            }
            FrameError::PayloadTooLarge => write!(f, "payload does not fit in a frame"),
        }
    }
}

/// Failure of one main board exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeError<E, P> {
    /// SPI transfer or flush failed
    Bus(E),
    /// Chip select line could not be driven
    Pin(P),
    Frame(FrameError),
}

impl<E, P> From<FrameError> for ExchangeError<E, P> {
    fn from(error: FrameError) -> Self {
        ExchangeError::Frame(error)
    }
}

impl<E: core::fmt::Debug, P: core::fmt::Debug> core::fmt::Display for ExchangeError<E, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExchangeError::Bus(e) => write!(f, "spi bus error: {:?}", e),
            ExchangeError::Pin(e) => write!(f, "chip select error: {:?}", e),
            ExchangeError::Frame(e) => write!(f, "{}", e),
        }
    }
}

/// Combine the outcome of a finished transfer. A failed chip select release
/// wins over a bus error since the module may still be selected.
pub fn settle_exchange<E, P>(
    transfer: Result<(), E>,
    release: Result<(), P>,
    response: &[u8; RX_SIZE],
) -> Result<(), ExchangeError<E, P>> {
    release.map_err(ExchangeError::Pin)?;
    transfer.map_err(ExchangeError::Bus)?;
    check_response(response)?;
    Ok(())
}

/// Byte for the data register after a transmit-empty interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxAction {
    pub byte: u8,
    /// Set CRCNEXT once this byte is written
    pub crc_next: bool,
}

/// A command frame received from the main board
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    bytes: Vec<u8, RX_SIZE>,
}

impl Request {
    pub fn command(&self) -> u8 {
        self.byte(1)
    }

    /// Byte at `index` of the frame, zero if it never arrived
    pub fn byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// Reply buffer handed to command handlers
pub type Reply = [u8; BUFFER_SIZE];

/// Function table entry
#[derive(Clone, Copy)]
pub struct Command {
    pub id: u8,
    pub handler: fn(&Request, &mut Reply),
}

/// `tx[1] = rx[2] + 5`
pub fn add_five(request: &Request, reply: &mut Reply) {
    reply[1] = request.byte(2).wrapping_add(5);
}

/// Reply buffer goes back unchanged
pub fn get_value(_request: &Request, _reply: &mut Reply) {}

/// Commands implemented by the demo module
pub const COMMANDS: [Command; 2] = [
    Command {
        id: command::ADD_FIVE,
        handler: add_five,
    },
    Command {
        id: command::GET_VALUE,
        handler: get_value,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Reply,
    ModuleId,
}

/// Module side of the protocol, driven from the SPI interrupt
#[derive(Debug, Clone)]
pub struct GoBusModule {
    rx: RxBuffer<RX_SIZE>,
    reply: Reply,
    module_id: [u8; 16],
    source: Source,
    tx_index: usize,
    tx_count: usize,
    status: StatusCode,
}

impl Default for GoBusModule {
    fn default() -> Self {
        Self::new(MODULE_ID)
    }
}

impl GoBusModule {
    pub const fn new(module_id: [u8; 16]) -> Self {
        Self {
            rx: RxBuffer::new(),
            reply: [0; BUFFER_SIZE],
            module_id,
            source: Source::Reply,
            tx_index: 0,
            tx_count: 0,
            status: StatusCode::Unknown,
        }
    }

    /// Prepare for the next frame.
    ///
    /// Only valid while SPI is disabled; returns the byte to preload into the
    /// data register, or `None` when SPI is still running. The caller resets
    /// the hardware CRC and clears any overrun alongside.
    pub fn reset_frame(&mut self, spi_enabled: bool) -> Option<u8> {
        if spi_enabled {
            return None;
        }
        self.reply[0] = self.module_id[0];
        self.rx.clear();
        self.source = Source::Reply;
        self.tx_index = 0;
        self.tx_count = 0;
        Some(FRAME_PREFIX)
    }

    /// Chip select edge.
    ///
    /// A release re-arms the module through [`reset_frame`](Self::reset_frame),
    /// so `spi_enabled` has to be read back after the peripheral was turned
    /// off. `None` leaves the frame untouched.
    pub fn on_chip_select(&mut self, edge: Edge, spi_enabled: bool) -> Option<ChipSelect> {
        match edge {
            Edge::Falling => Some(ChipSelect::Enable),
            Edge::Rising => self
                .reset_frame(spi_enabled)
                .map(|preload| ChipSelect::Disable { preload }),
        }
    }

    /// Transmit-empty interrupt.
    ///
    /// `None` once the reply bytes are out; the peripheral sends the CRC
    /// itself after that.
    pub fn on_transmit(&mut self) -> Option<TxAction> {
        if self.tx_count >= REPLY_BYTES {
            return None;
        }
        let byte = match self.source {
            Source::Reply => self.reply.get(self.tx_index),
            Source::ModuleId => self.module_id.get(self.tx_index),
        }
        .copied()
        .unwrap_or(0);
        self.tx_index += 1;
        self.tx_count += 1;
        Some(TxAction {
            byte,
            crc_next: self.tx_count == REPLY_BYTES,
        })
    }

    /// Receive-not-empty interrupt.
    ///
    /// Returns the new status once the frame is complete enough to act on.
    pub fn on_receive(&mut self, byte: u8) -> Option<StatusCode> {
        if self.rx.is_full() {
            return None;
        }
        if self.rx.is_empty() && byte == MODULE_ID_REQUEST {
            // first GUID byte already went out in place of reply[0]
            self.source = Source::ModuleId;
            self.tx_index = 1;
        }
        if self.rx.push(byte) == Fill::Rejected {
            return None;
        }
        if self.rx.len() == BUFFER_SIZE - 1 {
            self.status = StatusCode::RxBufferFull;
            return Some(self.status);
        }
        None
    }

    /// Overrun or CRC error; the caller disables SPI
    pub fn on_error(&mut self, error: BusError) -> StatusCode {
        self.status = error.into();
        self.status
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Command frame waiting for the main loop, if any.
    ///
    /// The status goes back to `Unknown` either way.
    pub fn take_request(&mut self) -> Option<Request> {
        let ready = self.status == StatusCode::RxBufferFull
            && self.rx.get(0) == Some(COMMAND_RESPONSE);
        self.status = StatusCode::Unknown;
        if !ready {
            return None;
        }
        Some(Request {
            bytes: self.rx.snapshot(),
        })
    }

    /// Run the first handler whose id matches the request's command.
    ///
    /// Returns the command that ran.
    pub fn dispatch(&mut self, request: &Request, table: &[Command]) -> Option<u8> {
        let entry = table.iter().find(|entry| entry.id == request.command())?;
        (entry.handler)(request, &mut self.reply);
        Some(entry.id)
    }

    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    pub fn received(&self) -> &[u8] {
        self.rx.as_slice()
    }
}

/// Pulse the GoBus interrupt line.
///
/// The main board triggers on the falling edge; the line idles high.
pub fn notify_main_board<P: OutputPin>(pin: &mut P) -> Result<(), P::Error> {
    pin.set_low()?;
    pin.set_high()
}

/// CRC-8 as computed by the SPI peripheral in 8-bit frame mode
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in bytes {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Build the frame the main board clocks out for `command`
pub fn request_frame(command: u8, payload: &[u8]) -> Result<[u8; RX_SIZE], FrameError> {
    if payload.len() > BUFFER_SIZE - 2 {
        return Err(FrameError::PayloadTooLarge);
    }
    let mut frame = [0u8; RX_SIZE];
    frame[0] = COMMAND_RESPONSE;
    frame[1] = command;
    frame[2..2 + payload.len()].copy_from_slice(payload);
    frame[BUFFER_SIZE] = crc8(&frame[..BUFFER_SIZE]);
    Ok(frame)
}

/// Frame asking the module for its GUID
pub fn module_id_request() -> [u8; RX_SIZE] {
    let mut frame = [0u8; RX_SIZE];
    frame[0] = MODULE_ID_REQUEST;
    frame[BUFFER_SIZE] = crc8(&frame[..BUFFER_SIZE]);
    frame
}

/// Check a frame received from a module and return its 16 reply bytes
pub fn check_response(frame: &[u8; RX_SIZE]) -> Result<&[u8], FrameError> {
    if frame[0] != FRAME_PREFIX {
        return Err(FrameError::BadPrefix(frame[0]));
    }
    let expected = crc8(&frame[..BUFFER_SIZE]);
    let received = frame[BUFFER_SIZE];
    if expected != received {
        return Err(FrameError::Crc { expected, received });
    }
    Ok(&frame[1..BUFFER_SIZE])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receive_all(module: &mut GoBusModule, bytes: &[u8]) -> Option<StatusCode> {
        let mut status = None;
        for &byte in bytes {
            if let Some(s) = module.on_receive(byte) {
                status = Some(s);
            }
        }
        status
    }

    #[test]
    fn test_reset_frame_only_when_disabled() {
        let mut module = GoBusModule::default();
        assert_eq!(module.reset_frame(true), None);
        assert_eq!(module.reset_frame(false), Some(FRAME_PREFIX));
        assert_eq!(module.reply()[0], MODULE_ID[0]);
    }

    #[test]
    fn test_release_ignored_while_spi_enabled() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        module.on_receive(COMMAND_RESPONSE);
        module.on_transmit();

        assert_eq!(module.on_chip_select(Edge::Rising, true), None);
        assert_eq!(module.received(), &[COMMAND_RESPONSE]);
        assert_eq!(module.on_transmit().map(|a| a.byte), Some(0));

        assert_eq!(
            module.on_chip_select(Edge::Rising, false),
            Some(ChipSelect::Disable {
                preload: FRAME_PREFIX
            })
        );
        assert!(module.received().is_empty());
    }

    #[test]
    fn test_transmit_stops_after_reply_bytes() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        for n in 1..=REPLY_BYTES {
            let action = module.on_transmit().unwrap();
            assert_eq!(action.crc_next, n == REPLY_BYTES);
        }
        assert_eq!(module.on_transmit(), None);
    }

    #[test]
    fn test_module_id_request_switches_source() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);

        // byte 0 is being shifted while reply[0] (= GUID[0]) is queued
        assert_eq!(module.on_transmit().unwrap().byte, MODULE_ID[0]);
        module.on_receive(MODULE_ID_REQUEST);
        for expected in &MODULE_ID[1..] {
            assert_eq!(module.on_transmit().unwrap().byte, *expected);
        }
        assert_eq!(module.on_transmit(), None);
    }

    #[test]
    fn test_module_id_byte_later_in_frame_is_data() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        module.on_receive(COMMAND_RESPONSE);
        module.on_receive(MODULE_ID_REQUEST);
        module.on_transmit();
        assert_eq!(module.on_transmit().unwrap().byte, 0);
    }

    #[test]
    fn test_status_full_at_sixteen_bytes() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        let frame = request_frame(command::ADD_FIVE, &[10]).unwrap();
        assert_eq!(receive_all(&mut module, &frame[..15]), None);
        assert_eq!(module.on_receive(frame[15]), Some(StatusCode::RxBufferFull));
        // remaining bytes are stored, buffer never overruns
        assert_eq!(receive_all(&mut module, &frame[16..]), None);
        assert_eq!(module.received().len(), RX_SIZE);
        assert_eq!(module.on_receive(0x99), None);
        assert_eq!(module.received().len(), RX_SIZE);
    }

    #[test]
    fn test_add_five_dispatch() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        let frame = request_frame(command::ADD_FIVE, &[250]).unwrap();
        receive_all(&mut module, &frame);

        let request = module.take_request().unwrap();
        assert_eq!(module.status(), StatusCode::Unknown);
        assert_eq!(module.dispatch(&request, &COMMANDS), Some(command::ADD_FIVE));
        assert_eq!(module.reply()[1], 255);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        receive_all(&mut module, &request_frame(0x42, &[]).unwrap());
        let request = module.take_request().unwrap();
        assert_eq!(module.dispatch(&request, &COMMANDS), None);
    }

    #[test]
    fn test_non_command_frame_not_taken() {
        let mut module = GoBusModule::default();
        module.reset_frame(false);
        receive_all(&mut module, &module_id_request());
        assert_eq!(module.take_request(), None);
        assert_eq!(module.take_request(), None);
    }

    #[test]
    fn test_errors_set_status() {
        let mut module = GoBusModule::default();
        assert_eq!(module.on_error(BusError::Crc), StatusCode::CrcError);
        assert_eq!(module.on_error(BusError::Overflow), StatusCode::Overflow);
        assert_eq!(module.take_request(), None);
    }

    #[test]
    fn test_crc8_known_values() {
        assert_eq!(crc8(&[]), 0);
        // CRC-8/SMBUS check value
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn test_check_response() {
        let mut frame = [0u8; RX_SIZE];
        frame[0] = FRAME_PREFIX;
        frame[2] = 46;
        frame[BUFFER_SIZE] = crc8(&frame[..BUFFER_SIZE]);
        assert_eq!(check_response(&frame).unwrap()[1], 46);

        frame[BUFFER_SIZE] ^= 1;
        assert!(matches!(check_response(&frame), Err(FrameError::Crc { .. })));

        frame[0] = 0;
        assert_eq!(check_response(&frame), Err(FrameError::BadPrefix(0)));
    }

    #[test]
    fn test_settle_exchange_order() {
        let mut frame = [0u8; RX_SIZE];
        frame[0] = FRAME_PREFIX;
        frame[BUFFER_SIZE] = crc8(&frame[..BUFFER_SIZE]);

        assert_eq!(settle_exchange::<u8, u8>(Ok(()), Ok(()), &frame), Ok(()));
        assert_eq!(
            settle_exchange::<u8, u8>(Err(1), Err(2), &frame),
            Err(ExchangeError::Pin(2))
        );
        assert_eq!(
            settle_exchange::<u8, u8>(Err(1), Ok(()), &frame),
            Err(ExchangeError::Bus(1))
        );

        frame[0] = 0;
        assert_eq!(
            settle_exchange::<u8, u8>(Ok(()), Ok(()), &frame),
            Err(ExchangeError::Frame(FrameError::BadPrefix(0)))
        );
    }

    #[test]
    fn test_request_payload_limit() {
        assert!(request_frame(1, &[0; 15]).is_ok());
        assert_eq!(request_frame(1, &[0; 16]), Err(FrameError::PayloadTooLarge));
    }
}
