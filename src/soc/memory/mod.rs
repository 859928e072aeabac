//! DRAM device model and its channel controller.

/// Valid/ready front end that drives an engine.
pub mod controller;

/// Generic engine coupling a protocol with a store.
pub mod engine;

/// Protocol trait, completion outputs and timing constants.
pub mod protocol;

/// Control line levels and command decode.
pub mod signals;

/// Simplified fixed-delay opcode protocol.
pub mod simple;

/// Sparse backing store.
pub mod store;

/// Signal-level protocol with activation, timing and refresh decay.
pub mod timed;

pub use controller::ChannelController;
pub use engine::{DramEngine, SimpleEngine, TimedEngine};
pub use protocol::{Completion, Phase, PhaseRole, Protocol, Timing};
pub use signals::{DramCommand, Level, SignalVector};
pub use simple::{CommandProtocol, MemCommand, Opcode, SimpleState};
pub use store::{MemoryStore, CORRUPTION_SENTINEL};
pub use timed::{DeviceState, SignalProtocol, TimedOp};
