//! DRAM Protocol Engine.
//!
//! Couples a `Protocol` state machine with the `MemoryStore` it mutates and
//! exposes the device's per-tick contract: one input in, one completion
//! flag and result out.

use super::protocol::{Completion, Protocol, Timing};
use super::simple::CommandProtocol;
use super::store::MemoryStore;
use super::timed::SignalProtocol;
use crate::common::{Addr, Word};

/// Engine running the signal-level timed protocol.
pub type TimedEngine = DramEngine<SignalProtocol>;

/// Engine running the simplified opcode protocol.
pub type SimpleEngine = DramEngine<CommandProtocol>;

/// A DRAM device model.
///
/// The protocol is the timing profile; the memory semantics are shared by
/// every profile.
#[derive(Clone, Debug)]
pub struct DramEngine<P: Protocol> {
    protocol: P,
    store: MemoryStore,
    ticks: u64,
    completions: u64,
}

impl<P: Protocol> DramEngine<P> {
    /// Creates an engine with an empty store.
    ///
    /// # Arguments
    ///
    /// * `protocol` - The timing profile to run.
    /// * `store` - Backing memory, usually empty.
    pub fn new(protocol: P, store: MemoryStore) -> Self {
        Self {
            protocol,
            store,
            ticks: 0,
            completions: 0,
        }
    }

    /// Advances the device by one tick.
    ///
    /// # Arguments
    ///
    /// * `input` - The inputs sampled on this tick.
    ///
    /// # Returns
    ///
    /// The completion flag and result for this tick.
    pub fn tick(&mut self, input: &P::Input) -> Completion {
        self.ticks += 1;
        let out = self.protocol.step(&mut self.store, input);
        if out.complete {
            self.completions += 1;
        }
        out
    }

    /// Seeds a memory location without going through the protocol.
    pub fn preload(&mut self, addr: Addr, value: Word) {
        self.store.write(addr, value);
    }

    /// Resets the protocol state. Stored data is kept.
    pub fn reset(&mut self) {
        self.protocol.reset();
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Number of ticks stepped since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of ticks on which completion was asserted.
    pub fn completions(&self) -> u64 {
        self.completions
    }
}

impl DramEngine<SignalProtocol> {
    /// Creates a timed engine whose absent addresses read as zero.
    pub fn timed(timing: Timing) -> Self {
        Self::new(SignalProtocol::new(timing), MemoryStore::new())
    }
}

impl DramEngine<CommandProtocol> {
    /// Creates a simplified engine whose absent addresses read as zero.
    pub fn simple(response_delay: u32) -> Self {
        Self::new(CommandProtocol::new(response_delay), MemoryStore::new())
    }
}
