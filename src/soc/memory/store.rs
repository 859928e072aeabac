//! Sparse Memory Store.
//!
//! Backing state of the DRAM model. Only addresses that have been written
//! occupy space; everything else reads as the store's default value.

use crate::common::{Addr, Word};
use std::collections::HashMap;

/// Value every stored word decays to when a refresh deadline is missed.
pub const CORRUPTION_SENTINEL: Word = 0xFFFF_FFFF;

/// Sparse address to value map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    cells: HashMap<Addr, Word>,
    default_value: Word,
}

impl MemoryStore {
    /// Creates an empty store whose absent addresses read as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose absent addresses read as `default_value`.
    pub fn with_default(default_value: Word) -> Self {
        Self {
            cells: HashMap::new(),
            default_value,
        }
    }

    /// Reads the value at `addr`, or the default if it was never written.
    pub fn read(&self, addr: Addr) -> Word {
        self.cells.get(&addr).copied().unwrap_or(self.default_value)
    }

    /// Stores `value` at `addr`.
    pub fn write(&mut self, addr: Addr, value: Word) {
        self.cells.insert(addr, value);
    }

    /// Returns the stored value without falling back to the default.
    pub fn get(&self, addr: Addr) -> Option<Word> {
        self.cells.get(&addr).copied()
    }

    /// Overwrites every stored value with `value`.
    ///
    /// Addresses that were never written stay absent.
    pub fn corrupt_all(&mut self, value: Word) {
        self.cells.values_mut().for_each(|cell| *cell = value);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn default_value(&self) -> Word {
        self.default_value
    }
}
