//! Simulation Context.
//!
//! The single owner of simulated time and of the transaction logs. It is
//! created by the orchestration loop and threaded through the issuer and
//! the matcher; nothing else advances the clock.

use crate::common::{Addr, OpKind, Tick, Word};
use crate::soc::Dut;
use serde::Serialize;

/// A request accepted by the device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnqueueRecord {
    /// Tick of the clock edge on which the request transferred.
    pub tick: Tick,
    pub addr: Addr,
    pub kind: OpKind,
    /// Sent value; `None` for reads.
    pub data: Option<Word>,
}

/// A response consumed from the device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    /// Tick of the clock edge on which the response transferred.
    pub tick: Tick,
    pub addr: Addr,
    /// Kind of the matched request, or of the response bits when unmatched.
    pub kind: Option<OpKind>,
    pub data: Word,
    /// Ticks between request acceptance and response; `None` when unmatched.
    pub latency: Option<Tick>,
}

/// Simulated clock and transaction logs of one run.
#[derive(Debug, Default)]
pub struct SimContext {
    tick: Tick,
    enqueue_log: Vec<EnqueueRecord>,
    response_log: Vec<ResponseRecord>,
}

impl SimContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated tick.
    pub fn now(&self) -> Tick {
        self.tick
    }

    /// Applies one clock edge to `dut` and advances time.
    pub fn advance(&mut self, dut: &mut dyn Dut) {
        dut.tick();
        self.tick += 1;
    }

    pub fn log_enqueue(&mut self, record: EnqueueRecord) {
        self.enqueue_log.push(record);
    }

    pub fn log_response(&mut self, record: ResponseRecord) {
        self.response_log.push(record);
    }

    pub fn enqueue_log(&self) -> &[EnqueueRecord] {
        &self.enqueue_log
    }

    pub fn response_log(&self) -> &[ResponseRecord] {
        &self.response_log
    }

    /// Consumes the context, returning the final tick and both logs.
    pub fn into_parts(self) -> (Tick, Vec<EnqueueRecord>, Vec<ResponseRecord>) {
        (self.tick, self.enqueue_log, self.response_log)
    }
}
