//! DRAM Command Signals.
//!
//! The device is driven by four active-low control lines sampled once per
//! tick. This module defines the signal vector and the exhaustive decode of
//! the line levels into commands.

use crate::common::{Addr, Word};

/// Logic level of a single control line.
///
/// Lines are active-low: `Low` asserts them. Decoding works on the literal
/// levels rather than on an asserted/deasserted abstraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Level {
    Low,
    #[default]
    High,
}

impl From<u8> for Level {
    /// Any non-zero bit is `High`.
    fn from(bit: u8) -> Self {
        if bit == 0 {
            Level::Low
        } else {
            Level::High
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

/// Inputs sampled by the device on one tick.
///
/// The default vector has every control line `High`, which deselects the
/// device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SignalVector {
    /// Chip select.
    pub cs_n: Level,
    /// Row address strobe.
    pub ras_n: Level,
    /// Column address strobe.
    pub cas_n: Level,
    /// Write enable.
    pub we_n: Level,
    pub addr: Addr,
    pub wdata: Word,
}

impl SignalVector {
    /// Builds a vector from raw `(cs_n, ras_n, cas_n, we_n)` bits.
    pub fn from_bits(cs_n: u8, ras_n: u8, cas_n: u8, we_n: u8, addr: Addr, wdata: Word) -> Self {
        Self {
            cs_n: cs_n.into(),
            ras_n: ras_n.into(),
            cas_n: cas_n.into(),
            we_n: we_n.into(),
            addr,
            wdata,
        }
    }

    /// The vector that deselects the device.
    pub fn deselect() -> Self {
        Self::default()
    }

    pub fn refresh() -> Self {
        Self::from_bits(0, 0, 0, 1, 0, 0)
    }

    pub fn activate(addr: Addr) -> Self {
        Self::from_bits(0, 0, 1, 1, addr, 0)
    }

    pub fn read(addr: Addr) -> Self {
        Self::from_bits(0, 1, 0, 1, addr, 0)
    }

    pub fn write(addr: Addr, wdata: Word) -> Self {
        Self::from_bits(0, 1, 0, 0, addr, wdata)
    }

    pub fn precharge() -> Self {
        Self::from_bits(0, 0, 1, 0, 0, 0)
    }

    /// Decodes the control lines into a command.
    pub fn decode(&self) -> DramCommand {
        DramCommand::decode(self.cs_n, self.ras_n, self.cas_n, self.we_n)
    }
}

/// Command selected by a combination of control line levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DramCommand {
    /// Chip select is high; the device is not addressed.
    Deselect,
    Refresh,
    /// Open a row.
    Activate,
    /// Column read; requires an open row.
    Read,
    /// Column write; requires an open row.
    Write,
    /// Close the open row.
    Precharge,
    /// Selected, but no recognized command.
    Nop,
}

impl DramCommand {
    /// Decodes `(cs_n, ras_n, cas_n, we_n)`.
    ///
    /// | cs ras cas we | command   |
    /// |---------------|-----------|
    /// | 1  x   x   x  | Deselect  |
    /// | 0  0   0   1  | Refresh   |
    /// | 0  0   1   1  | Activate  |
    /// | 0  1   0   1  | Read      |
    /// | 0  1   0   0  | Write     |
    /// | 0  0   1   0  | Precharge |
    /// | 0  0   0   0  | Nop       |
    /// | 0  1   1   x  | Nop       |
    pub fn decode(cs_n: Level, ras_n: Level, cas_n: Level, we_n: Level) -> Self {
        use Level::{High, Low};

        match (cs_n, ras_n, cas_n, we_n) {
            (High, _, _, _) => DramCommand::Deselect,
            (Low, Low, Low, High) => DramCommand::Refresh,
            (Low, Low, High, High) => DramCommand::Activate,
            (Low, High, Low, High) => DramCommand::Read,
            (Low, High, Low, Low) => DramCommand::Write,
            (Low, Low, High, Low) => DramCommand::Precharge,
            (Low, Low, Low, Low) | (Low, High, High, _) => DramCommand::Nop,
        }
    }

    /// Returns `true` for column reads and writes.
    pub fn is_column_access(self) -> bool {
        matches!(self, DramCommand::Read | DramCommand::Write)
    }
}
