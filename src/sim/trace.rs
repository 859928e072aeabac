//! Trace Replay.
//!
//! A trace is an ordered list of timestamped operations, one per line:
//!
//! ```text
//! 0x10 WRITE 0
//! 0x10 READ  5
//! ```
//!
//! Write values are not part of the format; they are synthesized from an
//! RNG when the trace is loaded and kept in the entry for later checks.

use crate::common::{Addr, OpKind, Tick, TraceError, Word};
use rand::Rng;
use std::iter::Peekable;
use std::vec;

/// One operation of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub addr: Addr,
    pub kind: OpKind,
    /// Earliest tick at which the entry may be issued.
    pub tick: Tick,
    /// Value to write; zero for reads.
    pub wdata: Word,
}

impl TraceEntry {
    pub fn read(addr: Addr, tick: Tick) -> Self {
        Self {
            addr,
            kind: OpKind::Read,
            tick,
            wdata: 0,
        }
    }

    pub fn write(addr: Addr, tick: Tick, wdata: Word) -> Self {
        Self {
            addr,
            kind: OpKind::Write,
            tick,
            wdata,
        }
    }
}

/// Parses one trace line.
///
/// Blank lines and lines starting with `#` yield `Ok(None)`.
///
/// # Arguments
///
/// * `line` - The text of the line.
/// * `line_no` - One-based line number used in error messages.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<(Addr, OpKind, Tick)>, TraceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let malformed = |reason: String| TraceError::Malformed {
        line: line_no,
        reason,
    };

    let mut fields = line.split_whitespace();
    let (Some(addr), Some(op), Some(tick)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(malformed(format!("expected '<addr> <READ|WRITE> <tick>', got '{}'", line)));
    };
    if let Some(extra) = fields.next() {
        return Err(malformed(format!("unexpected trailing field '{}'", extra)));
    }

    let digits = addr.trim_start_matches("0x").trim_start_matches("0X");
    let addr = Addr::from_str_radix(digits, 16)
        .map_err(|e| malformed(format!("bad address '{}': {}", addr, e)))?;
    let kind = op.parse::<OpKind>().map_err(malformed)?;
    let tick = tick
        .parse::<Tick>()
        .map_err(|e| malformed(format!("bad tick '{}': {}", tick, e)))?;

    Ok(Some((addr, kind, tick)))
}

/// Parses a whole trace, drawing a write value from `rng` for each write.
pub fn parse_trace<R: Rng>(text: &str, rng: &mut R) -> Result<Vec<TraceEntry>, TraceError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some((addr, kind, tick)) = parse_line(line, idx + 1)? else {
            continue;
        };
        entries.push(match kind {
            OpKind::Read => TraceEntry::read(addr, tick),
            OpKind::Write => TraceEntry::write(addr, tick, rng.random()),
        });
    }
    Ok(entries)
}

/// Generates write-then-read pairs.
///
/// Pair `i` writes a random value to a random address below `addr_space`
/// at tick `2 * i * gap` and reads it back at tick `(2 * i + 1) * gap`.
pub fn random_pairs<R: Rng>(
    pairs: usize,
    addr_space: Addr,
    gap: Tick,
    rng: &mut R,
) -> Vec<TraceEntry> {
    let mut entries = Vec::with_capacity(pairs * 2);
    for i in 0..pairs as Tick {
        let addr = rng.random_range(0..addr_space.max(1));
        entries.push(TraceEntry::write(addr, 2 * i * gap, rng.random()));
        entries.push(TraceEntry::read(addr, (2 * i + 1) * gap));
    }
    entries
}

/// Releases trace entries in order once their tick has arrived.
///
/// The sequence is finite and cannot be restarted.
pub struct TraceReplay {
    entries: Peekable<vec::IntoIter<TraceEntry>>,
    total: usize,
    released: usize,
}

impl TraceReplay {
    pub fn new(entries: Vec<TraceEntry>) -> Self {
        let total = entries.len();
        Self {
            entries: entries.into_iter().peekable(),
            total,
            released: 0,
        }
    }

    /// Takes the next entry if its scheduled tick is not after `now`.
    ///
    /// Entries are never reordered: a later entry with an earlier tick waits
    /// behind the head of the trace.
    pub fn next_ready(&mut self, now: Tick) -> Option<TraceEntry> {
        let entry = self.entries.next_if(|entry| entry.tick <= now)?;
        self.released += 1;
        Some(entry)
    }

    /// Scheduled tick of the next entry.
    pub fn peek_tick(&mut self) -> Option<Tick> {
        self.entries.peek().map(|entry| entry.tick)
    }

    pub fn is_exhausted(&self) -> bool {
        self.released == self.total
    }

    /// Entries not yet released.
    pub fn remaining(&self) -> usize {
        self.total - self.released
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
