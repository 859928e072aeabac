//! Simplified Opcode Protocol.
//!
//! A two-state device: it captures a READ or WRITE opcode while idle, waits
//! a fixed response delay, then performs the captured access. There is no
//! row management and no refresh decay.

use super::protocol::{Completion, Phase, PhaseRole, Protocol};
use super::store::MemoryStore;
use crate::common::{Addr, OpKind, Word};
use log::debug;

/// Opcode sampled by the simplified device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Opcode {
    #[default]
    None,
    Read,
    Write,
}

/// Inputs of the simplified device for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MemCommand {
    pub op: Opcode,
    pub addr: Addr,
    pub data: Word,
}

impl MemCommand {
    pub fn read(addr: Addr) -> Self {
        Self {
            op: Opcode::Read,
            addr,
            data: 0,
        }
    }

    pub fn write(addr: Addr, data: Word) -> Self {
        Self {
            op: Opcode::Write,
            addr,
            data,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SimpleState {
    #[default]
    Idle,
    Waiting { command: MemCommand, remaining: u32 },
}

/// The simplified fixed-delay state machine.
#[derive(Clone, Debug)]
pub struct CommandProtocol {
    response_delay: u32,
    state: SimpleState,
}

impl CommandProtocol {
    /// Creates an idle protocol.
    ///
    /// # Arguments
    ///
    /// * `response_delay` - Ticks between capturing a command and completing it.
    pub fn new(response_delay: u32) -> Self {
        Self {
            response_delay,
            state: SimpleState::Idle,
        }
    }

    pub fn state(&self) -> SimpleState {
        self.state
    }

    pub fn response_delay(&self) -> u32 {
        self.response_delay
    }
}

impl Default for CommandProtocol {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Protocol for CommandProtocol {
    type Input = MemCommand;

    fn name(&self) -> &str {
        "simple"
    }

    /// Captures a command while idle and completes it `response_delay`
    /// ticks later. Inputs are ignored while waiting.
    fn step(&mut self, store: &mut MemoryStore, input: &MemCommand) -> Completion {
        if self.state == SimpleState::Idle {
            if input.op == Opcode::None {
                return Completion::none();
            }
            self.state = SimpleState::Waiting {
                command: *input,
                remaining: self.response_delay,
            };
        }

        let SimpleState::Waiting { command, remaining } = self.state else {
            return Completion::none();
        };

        if remaining > 0 {
            self.state = SimpleState::Waiting {
                command,
                remaining: remaining - 1,
            };
            return Completion::none();
        }

        self.state = SimpleState::Idle;
        match command.op {
            Opcode::Read => {
                let value = store.read(command.addr);
                debug!("[DRAM] Reading {:#x} from address {:#x}", value, command.addr);
                Completion::done(value)
            }
            Opcode::Write => {
                store.write(command.addr, command.data);
                debug!(
                    "[DRAM] Writing {:#x} to address {:#x}",
                    command.data, command.addr
                );
                Completion::done(command.data)
            }
            Opcode::None => Completion::none(),
        }
    }

    fn reset(&mut self) {
        self.state = SimpleState::Idle;
    }

    fn plan(&self, kind: OpKind, addr: Addr, wdata: Word) -> Vec<Phase<MemCommand>> {
        let command = match kind {
            OpKind::Read => MemCommand::read(addr),
            OpKind::Write => MemCommand::write(addr, wdata),
        };
        vec![Phase::new(command, PhaseRole::Access)]
    }
}
