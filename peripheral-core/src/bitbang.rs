//! Bit-banged serial output on spare GPIO pins
//!
//! Three users: the two-wire diagnostic port read with an oscilloscope or
//! logic analyser, the single-wire status pin that shows a
//! [`StatusCode`](crate::StatusCode) as a pulse burst, and a chain of
//! 74HC595 shift registers.

use embedded_hal::digital::OutputPin;

use crate::ActiveLevel;
use crate::status::StatusCode;

/// Clock and data lines serializing bytes MSB first
pub struct DiagnosticPort<CLK, DATA> {
    clock: CLK,
    data: DATA,
}

impl<CLK, DATA, E> DiagnosticPort<CLK, DATA>
where
    CLK: OutputPin<Error = E>,
    DATA: OutputPin<Error = E>,
{
    pub fn new(clock: CLK, data: DATA) -> Self {
        Self { clock, data }
    }

    /// Shift one byte out, data valid on the rising clock edge.
    ///
    /// The data line is left low.
    pub fn bang_byte(&mut self, byte: u8) -> Result<(), E> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.clock.set_high()?;
            self.clock.set_low()?;
        }
        self.data.set_low()
    }

    pub fn bang_buffer(&mut self, bytes: &[u8]) -> Result<(), E> {
        for &byte in bytes {
            self.bang_byte(byte)?;
        }
        Ok(())
    }

    pub fn release(self) -> (CLK, DATA) {
        (self.clock, self.data)
    }
}

/// Single pin pulsing out status codes
pub struct StatusPin<P> {
    pin: P,
}

impl<P: OutputPin> StatusPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Pulse the pin once per unit of the code
    pub fn emit(&mut self, code: StatusCode) -> Result<(), P::Error> {
        self.pulse(code.pulses())
    }

    pub fn pulse(&mut self, count: u8) -> Result<(), P::Error> {
        for _ in 0..count {
            self.pin.set_high()?;
            self.pin.set_low()?;
        }
        Ok(())
    }

    /// Hold the pin high while `f` runs
    pub fn mark<R>(&mut self, f: impl FnOnce() -> R) -> Result<R, P::Error> {
        self.pin.set_high()?;
        let result = f();
        self.pin.set_low()?;
        Ok(result)
    }
}

/// SRCLR and OE on the 74HC595
const CONTROL_ACTIVE: ActiveLevel = ActiveLevel::Low;

/// Daisy-chained 74HC595 serial-in/parallel-out registers
pub struct ShiftRegisterChain<CLK, DATA, LATCH, CLEAR, OE> {
    clock: CLK,
    data: DATA,
    latch: LATCH,
    clear: CLEAR,
    output_enable: OE,
}

impl<CLK, DATA, LATCH, CLEAR, OE, E> ShiftRegisterChain<CLK, DATA, LATCH, CLEAR, OE>
where
    CLK: OutputPin<Error = E>,
    DATA: OutputPin<Error = E>,
    LATCH: OutputPin<Error = E>,
    CLEAR: OutputPin<Error = E>,
    OE: OutputPin<Error = E>,
{
    pub fn new(clock: CLK, data: DATA, latch: LATCH, clear: CLEAR, output_enable: OE) -> Self {
        Self {
            clock,
            data,
            latch,
            clear,
            output_enable,
        }
    }

    /// Clear the chain, shift `bytes` in and present them on the outputs.
    ///
    /// The first byte ends up in the register furthest from the MCU.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), E> {
        self.output_enable.set_state(CONTROL_ACTIVE.state(false))?;
        self.latch.set_low()?;
        self.data.set_low()?;
        self.clock.set_low()?;
        self.clear.set_state(CONTROL_ACTIVE.state(true))?;
        self.clear.set_state(CONTROL_ACTIVE.state(false))?;

        for &byte in bytes {
            for bit in (0..8).rev() {
                if (byte >> bit) & 0x01 != 0 {
                    self.data.set_high()?;
                } else {
                    self.data.set_low()?;
                }
                self.clock.set_high()?;
                self.clock.set_low()?;
            }
        }

        self.clock.set_low()?;
        self.latch.set_high()?;
        self.output_enable.set_state(CONTROL_ACTIVE.state(true))
    }
}

/// Fill `registers` with a single set bit at position `step`.
///
/// Positions count from bit 0 of the first register and wrap after the last
/// bit of the last register.
pub fn walking_bit(step: usize, registers: &mut [u8]) {
    registers.fill(0);
    let bits = registers.len() * 8;
    if bits == 0 {
        return;
    }
    let position = step % bits;
    registers[position / 8] = 1 << (position % 8);
}
