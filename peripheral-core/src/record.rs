//! Pulse record kept in non-volatile storage
//!
//! ```text
//! +-------+--------+--------+------+--------+--------+------+----
//! | count | len hi | len lo | flag | len hi | len lo | flag | ...
//! +-------+--------+--------+------+--------+--------+------+----
//! ```

/// A pulse length and whether the output is on during it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub length: u16,
    pub on: bool,
}

impl Pulse {
    pub const fn new(length: u16, on: bool) -> Self {
        Self { length, on }
    }
}

/// Bytes taken by each pulse
pub const PULSE_BYTES: usize = 3;

/// Record written by the storage demo
pub const DEFAULT_PULSES: [Pulse; 7] = [
    Pulse::new(2000, true),
    Pulse::new(27830, false),
    Pulse::new(400, true),
    Pulse::new(1580, false),
    Pulse::new(400, true),
    Pulse::new(3580, false),
    Pulse::new(400, true),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Stored count differs from the expected number of pulses
    CountMismatch { expected: u8, stored: u8 },
    LengthMismatch { index: usize },
    FlagMismatch { index: usize },
    /// Buffer too short for the record
    Truncated,
    /// More pulses than the count byte can hold
    TooManyPulses,
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordError::CountMismatch { expected, stored } => {
                write!(f, "stored count {} differs from {}", stored, expected)
            }
            RecordError::LengthMismatch { index } => write!(f, "pulse {} length differs", index),
            RecordError::FlagMismatch { index } => write!(f, "pulse {} flag differs", index),
            RecordError::Truncated => write!(f, "record truncated"),
            RecordError::TooManyPulses => write!(f, "too many pulses for one record"),
        }
    }
}

/// Bytes needed to store `count` pulses
pub const fn encoded_len(count: usize) -> usize {
    1 + count * PULSE_BYTES
}

/// Write the record for `pulses` into `out`, returning the bytes used
pub fn encode(pulses: &[Pulse], out: &mut [u8]) -> Result<usize, RecordError> {
    let count = u8::try_from(pulses.len()).map_err(|_| RecordError::TooManyPulses)?;
    let len = encoded_len(pulses.len());
    if out.len() < len {
        return Err(RecordError::Truncated);
    }
    out[0] = count;
    for (pulse, slot) in pulses.iter().zip(out[1..len].chunks_exact_mut(PULSE_BYTES)) {
        slot[0] = (pulse.length >> 8) as u8;
        slot[1] = (pulse.length & 0xFF) as u8;
        slot[2] = u8::from(pulse.on);
    }
    Ok(len)
}

/// Compare stored bytes against `pulses`, reporting the first difference
pub fn verify(pulses: &[Pulse], stored: &[u8]) -> Result<(), RecordError> {
    let expected = u8::try_from(pulses.len()).map_err(|_| RecordError::TooManyPulses)?;
    let count = *stored.first().ok_or(RecordError::Truncated)?;
    if count != expected {
        return Err(RecordError::CountMismatch {
            expected,
            stored: count,
        });
    }
    for (index, pulse) in pulses.iter().enumerate() {
        let found = decode_pulse(stored, index)?;
        if found.length != pulse.length {
            return Err(RecordError::LengthMismatch { index });
        }
        if stored[1 + index * PULSE_BYTES + 2] != u8::from(pulse.on) {
            return Err(RecordError::FlagMismatch { index });
        }
    }
    Ok(())
}

/// Read the record back into `out`, returning the number of pulses
pub fn decode(stored: &[u8], out: &mut [Pulse]) -> Result<usize, RecordError> {
    let count = usize::from(*stored.first().ok_or(RecordError::Truncated)?);
    if out.len() < count {
        return Err(RecordError::TooManyPulses);
    }
    for (index, slot) in out.iter_mut().take(count).enumerate() {
        *slot = decode_pulse(stored, index)?;
    }
    Ok(count)
}

fn decode_pulse(stored: &[u8], index: usize) -> Result<Pulse, RecordError> {
    let start = 1 + index * PULSE_BYTES;
    let bytes = stored
        .get(start..start + PULSE_BYTES)
        .ok_or(RecordError::Truncated)?;
    Ok(Pulse {
        length: u16::from_be_bytes([bytes[0], bytes[1]]),
        on: bytes[2] != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEN: usize = encoded_len(DEFAULT_PULSES.len());

    fn default_record() -> [u8; LEN] {
        let mut out = [0u8; LEN];
        encode(&DEFAULT_PULSES, &mut out).unwrap();
        out
    }

    #[test]
    fn test_layout() {
        let record = default_record();
        assert_eq!(LEN, 22);
        assert_eq!(&record[..7], &[7, 0x07, 0xD0, 1, 0x6C, 0xB6, 0]);
        assert_eq!(&record[19..], &[0x01, 0x90, 1]);
    }

    #[test]
    fn test_verify_accepts_written_record() {
        assert_eq!(verify(&DEFAULT_PULSES, &default_record()), Ok(()));
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let mut record = default_record();
        record[0] = 6;
        assert_eq!(
            verify(&DEFAULT_PULSES, &record),
            Err(RecordError::CountMismatch {
                expected: 7,
                stored: 6
            })
        );

        let mut record = default_record();
        record[1 + 3 * PULSE_BYTES + 1] ^= 0x01;
        record[1 + 5 * PULSE_BYTES + 2] ^= 0x01;
        assert_eq!(
            verify(&DEFAULT_PULSES, &record),
            Err(RecordError::LengthMismatch { index: 3 })
        );

        let mut record = default_record();
        record[1 + 5 * PULSE_BYTES + 2] = 2;
        assert_eq!(
            verify(&DEFAULT_PULSES, &record),
            Err(RecordError::FlagMismatch { index: 5 })
        );
    }

    #[test]
    fn test_erased_storage_fails() {
        let erased = [0xFFu8; LEN];
        assert!(matches!(
            verify(&DEFAULT_PULSES, &erased),
            Err(RecordError::CountMismatch { stored: 0xFF, .. })
        ));
        assert_eq!(verify(&DEFAULT_PULSES, &[]), Err(RecordError::Truncated));
        assert_eq!(verify(&DEFAULT_PULSES, &default_record()[..10]), Err(RecordError::Truncated));
    }

    #[test]
    fn test_encode_needs_room() {
        let mut small = [0u8; 4];
        assert_eq!(encode(&DEFAULT_PULSES, &mut small), Err(RecordError::Truncated));
    }

    #[test]
    fn test_decode() {
        let mut pulses = [Pulse::new(0, false); 8];
        let count = decode(&default_record(), &mut pulses).unwrap();
        assert_eq!(count, 7);
        assert_eq!(&pulses[..7], &DEFAULT_PULSES);

        let mut too_few = [Pulse::new(0, false); 2];
        assert_eq!(decode(&default_record(), &mut too_few), Err(RecordError::TooManyPulses));
    }
}
