//! Signal-Level Timed Protocol.
//!
//! Models a DRAM device driven by `cs_n`/`ras_n`/`cas_n`/`we_n`. Each command
//! counts down its latency while the same command is held on the lines. A
//! row must be activated before a column access, and the device must be
//! refreshed before its refresh period elapses or every stored value decays.

use super::protocol::{Completion, Phase, PhaseRole, Protocol, Timing};
use super::signals::{DramCommand, SignalVector};
use super::store::{MemoryStore, CORRUPTION_SENTINEL};
use crate::common::{Addr, OpKind, Word};
use log::{debug, warn};

/// Operation with a latency window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimedOp {
    Refresh,
    Activate,
    /// Read or write; write-enable is sampled on the completion tick.
    ColumnAccess,
    Precharge,
}

/// Whether a timed operation is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Idle,
    Busy {
        op: TimedOp,
        /// Ticks left before the completing tick.
        remaining: u32,
    },
}

/// The timed DRAM state machine.
#[derive(Clone, Debug)]
pub struct SignalProtocol {
    timing: Timing,
    state: DeviceState,
    activated: bool,
    refresh_counter: u64,
    decays: u64,
}

impl SignalProtocol {
    /// Creates a protocol in the idle, deactivated state.
    ///
    /// # Arguments
    ///
    /// * `timing` - Latencies and refresh period.
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            state: DeviceState::Idle,
            activated: false,
            refresh_counter: 0,
            decays: 0,
        }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Returns `true` while a row is open.
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Ticks since the last completed refresh or decay.
    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// Number of times the refresh deadline has been missed.
    pub fn decay_count(&self) -> u64 {
        self.decays
    }

    fn latency(&self, op: TimedOp) -> u32 {
        match op {
            TimedOp::Refresh => self.timing.t_refresh,
            TimedOp::Activate => self.timing.t_rcd,
            TimedOp::ColumnAccess => self.timing.t_cl,
            TimedOp::Precharge => self.timing.t_pre,
        }
    }

    /// Counts one tick toward the refresh deadline and decays the store
    /// when it is reached.
    fn advance_refresh_timer(&mut self, store: &mut MemoryStore) {
        if self.timing.refresh_period == 0 {
            return;
        }
        self.refresh_counter += 1;
        if self.refresh_counter >= self.timing.refresh_period {
            self.refresh_counter = 0;
            self.activated = false;
            self.decays += 1;
            store.corrupt_all(CORRUPTION_SENTINEL);
            warn!(
                "[DRAM] refresh deadline of {} ticks missed, {} cells corrupted",
                self.timing.refresh_period,
                store.len()
            );
        }
    }

    fn finish(
        &mut self,
        op: TimedOp,
        command: DramCommand,
        input: &SignalVector,
        store: &mut MemoryStore,
    ) -> Completion {
        match op {
            TimedOp::Refresh => {
                self.refresh_counter = 0;
                self.activated = false;
                Completion::done(0)
            }
            TimedOp::Activate => {
                self.activated = true;
                Completion::done(0)
            }
            TimedOp::Precharge => {
                self.activated = false;
                Completion::done(0)
            }
            TimedOp::ColumnAccess if command == DramCommand::Write => {
                store.write(input.addr, input.wdata);
                debug!(
                    "[DRAM] Writing {:#x} to address {:#x}",
                    input.wdata, input.addr
                );
                Completion::done(input.wdata)
            }
            TimedOp::ColumnAccess => {
                let value = store.read(input.addr);
                debug!("[DRAM] Reading {:#x} from address {:#x}", value, input.addr);
                Completion::done(value)
            }
        }
    }
}

impl Default for SignalProtocol {
    fn default() -> Self {
        Self::new(Timing::default())
    }
}

impl Protocol for SignalProtocol {
    type Input = SignalVector;

    fn name(&self) -> &str {
        "timed"
    }

    /// Runs the refresh timer, then decodes and advances the command.
    ///
    /// A command of latency N first seen on tick t completes on tick t + N.
    /// Switching to a different operation restarts the countdown; deselect
    /// abandons any operation in flight.
    fn step(&mut self, store: &mut MemoryStore, input: &SignalVector) -> Completion {
        self.advance_refresh_timer(store);

        let command = input.decode();
        #[cfg(feature = "always-trace")]
        log::trace!("[DRAM] {:?} state={:?} activated={}", command, self.state, self.activated);

        let op = match command {
            DramCommand::Deselect => {
                self.state = DeviceState::Idle;
                return Completion::none();
            }
            DramCommand::Nop => return Completion::none(),
            DramCommand::Read | DramCommand::Write if !self.activated => {
                return Completion::none();
            }
            DramCommand::Read | DramCommand::Write => TimedOp::ColumnAccess,
            DramCommand::Refresh => TimedOp::Refresh,
            DramCommand::Activate => TimedOp::Activate,
            DramCommand::Precharge => TimedOp::Precharge,
        };

        let remaining = match self.state {
            DeviceState::Busy { op: busy, remaining } if busy == op => remaining,
            _ => self.latency(op),
        };

        if remaining > 0 {
            self.state = DeviceState::Busy {
                op,
                remaining: remaining - 1,
            };
            return Completion::none();
        }

        self.state = DeviceState::Idle;
        self.finish(op, command, input, store)
    }

    fn reset(&mut self) {
        self.state = DeviceState::Idle;
        self.activated = false;
        self.refresh_counter = 0;
    }

    /// Closed-page plan: ACTIVATE, column access, PRECHARGE.
    fn plan(&self, kind: OpKind, addr: Addr, wdata: Word) -> Vec<Phase<SignalVector>> {
        let access = match kind {
            OpKind::Read => SignalVector::read(addr),
            OpKind::Write => SignalVector::write(addr, wdata),
        };
        vec![
            Phase::new(SignalVector::activate(addr), PhaseRole::Setup),
            Phase::new(access, PhaseRole::Access),
            Phase::new(SignalVector::precharge(), PhaseRole::Setup),
        ]
    }

    fn refresh_phase(&self) -> Option<Phase<SignalVector>> {
        Some(Phase::new(SignalVector::refresh(), PhaseRole::Refresh))
    }

    fn accepts_access(&self) -> bool {
        self.activated
    }
}
