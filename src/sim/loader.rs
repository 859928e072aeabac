//! Trace Loading.
//!
//! Reads trace files from disk and builds the RNG used to synthesize write
//! values, seeded for reproducible runs.

use super::trace::{parse_trace, random_pairs, TraceEntry, TraceReplay};
use crate::common::{Addr, Tick, TraceError};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

/// Address range used by generated write/read pairs.
pub const RANDOM_ADDR_SPACE: Addr = 0x1_0000;

/// Creates the write-value RNG.
///
/// A missing seed draws one from the OS so that every run differs; the
/// chosen seed is logged so the run can be repeated.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    info!("[Loader] write values seeded with {}", seed);
    StdRng::seed_from_u64(seed)
}

/// Loads a trace file, synthesizing write values from `rng`.
pub fn load_trace_file<P: AsRef<Path>>(
    path: P,
    rng: &mut StdRng,
) -> Result<Vec<TraceEntry>, TraceError> {
    let text = fs::read_to_string(path.as_ref())?;
    let entries = parse_trace(&text, rng)?;
    info!(
        "[Loader] {} trace entries from {}",
        entries.len(),
        path.as_ref().display()
    );
    Ok(entries)
}

/// Builds a replay of `pairs` generated write-then-read pairs.
pub fn random_replay(pairs: usize, gap: Tick, rng: &mut StdRng) -> TraceReplay {
    TraceReplay::new(random_pairs(pairs, RANDOM_ADDR_SPACE, gap, rng))
}
