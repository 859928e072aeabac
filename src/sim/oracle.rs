//! Golden Oracle.
//!
//! The harness's own record of the last value committed to each address.
//! It is updated when a write is accepted by the device and consulted when
//! a read response is validated, independently of what the device stores.

use crate::common::{Addr, Word};
use std::collections::HashMap;

/// Address to last committed write value.
#[derive(Clone, Debug, Default)]
pub struct GoldenRecord {
    values: HashMap<Addr, Word>,
}

impl GoldenRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` as the latest write to `addr`.
    pub fn commit(&mut self, addr: Addr, value: Word) {
        self.values.insert(addr, value);
    }

    /// Value a read of `addr` must return, if the address was ever written.
    pub fn expected(&self, addr: Addr) -> Option<Word> {
        self.values.get(&addr).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
