//! Device Protocol Interface.
//!
//! A protocol is the per-tick state machine that sits between a device's
//! input port and its memory store. The same `DramEngine` runs either the
//! signal-level timed protocol or the simplified opcode protocol; the
//! channel controller uses the protocol to expand a transaction into the
//! inputs it must hold on the device port.

use super::store::MemoryStore;
use crate::common::{Addr, OpKind, Word};
use std::fmt;

/// Device outputs for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Completion {
    /// Asserted on the tick an operation finishes.
    pub complete: bool,
    /// Result of the finished operation; zero when `complete` is low.
    pub result: Word,
}

impl Completion {
    /// Outputs of a tick on which nothing finished.
    pub fn none() -> Self {
        Self::default()
    }

    /// Outputs of a tick on which an operation finished with `result`.
    pub fn done(result: Word) -> Self {
        Self {
            complete: true,
            result,
        }
    }
}

/// Role of a phase within a controller plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseRole {
    /// Row management around the access; completion carries no data.
    Setup,
    /// The data access; its completion result is the transaction's response.
    Access,
    /// A refresh command; its completion restarts the refresh interval.
    Refresh,
}

/// One device input held until the device signals completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase<I> {
    pub input: I,
    pub role: PhaseRole,
}

impl<I> Phase<I> {
    pub fn new(input: I, role: PhaseRole) -> Self {
        Self { input, role }
    }
}

/// Per-tick device state machine.
pub trait Protocol {
    /// Inputs sampled on each tick.
    ///
    /// `Default` must be the idle input that starts nothing.
    type Input: Clone + Default + fmt::Debug;

    /// Returns the user-friendly name of the protocol.
    fn name(&self) -> &str;

    /// Advances the state machine by one tick.
    ///
    /// # Arguments
    ///
    /// * `store` - The memory store backing the device.
    /// * `input` - The inputs sampled on this tick.
    ///
    /// # Returns
    ///
    /// The completion flag and result value for this tick.
    fn step(&mut self, store: &mut MemoryStore, input: &Self::Input) -> Completion;

    /// Returns the state machine to its power-on state. Stored data is kept.
    fn reset(&mut self);

    /// Expands a transaction into the phases that perform it.
    ///
    /// Exactly one phase of the plan has role `PhaseRole::Access`.
    fn plan(&self, kind: OpKind, addr: Addr, wdata: Word) -> Vec<Phase<Self::Input>>;

    /// The phase that refreshes the device, if the protocol needs refresh.
    fn refresh_phase(&self) -> Option<Phase<Self::Input>> {
        None
    }

    /// Returns `false` when an access phase would currently be ignored and
    /// the plan must be restarted from its first phase.
    fn accepts_access(&self) -> bool {
        true
    }
}

/// Timing constants of the signal-level protocol, in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Row to column delay (ACTIVATE).
    pub t_rcd: u32,
    /// CAS latency (column READ/WRITE).
    pub t_cl: u32,
    /// Precharge delay.
    pub t_pre: u32,
    /// Refresh command latency.
    pub t_refresh: u32,
    /// Ticks without a completed refresh after which data decays.
    /// Zero disables decay.
    pub refresh_period: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            t_rcd: 5,
            t_cl: 5,
            t_pre: 10,
            t_refresh: 10,
            refresh_period: 200,
        }
    }
}
