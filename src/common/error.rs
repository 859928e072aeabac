//! Error Types.
//!
//! `HarnessError` is the failure taxonomy of a verification run. Every
//! variant is recorded in the run report; only the run-level variant ends
//! the run unless fail-fast is requested. `ConfigError` and `TraceError`
//! cover loading the run's inputs.

use super::{Addr, OpKind, Tick, Word};
use serde::Serialize;
use thiserror::Error;

/// Failures observed while driving a device under test.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum HarnessError {
    /// The request channel never asserted ready within the enqueue budget.
    #[error("EnqueueTimeout: {kind} addr={addr:#x} not accepted after {waited} ticks (tick {tick})")]
    EnqueueTimeout {
        addr: Addr,
        kind: OpKind,
        tick: Tick,
        waited: Tick,
    },

    /// An accepted request saw no response within the response budget.
    #[error("ResponseTimeout: {kind} addr={addr:#x} issued at tick {issued_at}, expired at tick {tick}")]
    ResponseTimeout {
        addr: Addr,
        kind: OpKind,
        issued_at: Tick,
        tick: Tick,
    },

    /// Returned data differs from the sent value or the golden record.
    #[error("DataIntegrityViolation: {kind} addr={addr:#x} expected={expected:#x} actual={actual:#x} (tick {tick})")]
    DataIntegrityViolation {
        addr: Addr,
        kind: OpKind,
        expected: Word,
        actual: Word,
        tick: Tick,
    },

    /// A response arrived for an address with no pending request.
    #[error("UnmatchedResponse: addr={addr:#x} data={data:#x} (tick {tick})")]
    UnmatchedResponse { addr: Addr, data: Word, tick: Tick },

    /// The run exhausted its global tick budget with work outstanding.
    #[error("GlobalTickBudgetExceeded: max {max_ticks} ticks reached with {pending} pending and {remaining} unissued")]
    GlobalTickBudgetExceeded {
        max_ticks: Tick,
        pending: usize,
        remaining: usize,
    },
}

impl HarnessError {
    /// Returns `true` for run-level failures that always end the run.
    pub fn is_run_level(&self) -> bool {
        matches!(self, HarnessError::GlobalTickBudgetExceeded { .. })
    }

    /// Returns `true` for failures that are warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, HarnessError::UnmatchedResponse { .. })
    }
}

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for this schema.
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    /// A value is out of its legal range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while loading a trace.
#[derive(Error, Debug)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A line does not follow `<hex-address> <READ|WRITE> <tick>`.
    #[error("trace line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
