//! Verification harness.
//!
//! Replays timestamped traces against a device under test over the
//! valid/ready channels and checks every response.

/// Simulated clock and transaction logs.
pub mod context;

/// Orchestration loop.
pub mod harness;

/// Request channel driver.
pub mod issuer;

/// Trace file loading and RNG seeding.
pub mod loader;

/// Response channel consumer and pending request table.
pub mod matcher;

/// Golden record of committed writes.
pub mod oracle;

/// Trace entries, parsing and replay.
pub mod trace;

pub use context::SimContext;
pub use harness::Harness;
pub use issuer::{Issued, TransactionIssuer};
pub use matcher::{DrainOutcome, PendingRequest, PendingTable, ResponseMatcher};
pub use oracle::GoldenRecord;
pub use trace::{TraceEntry, TraceReplay};
