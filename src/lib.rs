//! DRAM Protocol Model and Trace Verification Harness.
//!
//! This crate implements a cycle-accurate behavioral model of a DRAM device
//! driven by active-low command signals, and a harness that replays
//! timestamped read/write traces against a valid/ready request/response
//! interface while checking every response against a golden record.
//!
//! # Architecture
//!
//! * **Device**: a generic `DramEngine` running either the signal-level
//!   timed protocol (activate, CAS latency, precharge, refresh decay) or a
//!   simplified fixed-delay protocol, fronted by a channel controller.
//! * **Harness**: trace replay, transaction issuer, response matcher and
//!   golden oracle, driven tick by tick by the orchestration loop.
//!
//! # Modules
//!
//! * `common`: Shared types and error handling.
//! * `config`: Configuration loading and parsing.
//! * `sim`: Verification harness.
//! * `soc`: Device model, controller and channel interface.
//! * `stats`: Run report collection and printing.

/// Shared types and error definitions.
///
/// Provides the operation kinds and the error taxonomy used by both the
/// device side and the harness.
pub mod common;

/// Configuration for the engine, controller and harness.
///
/// Loads and validates TOML configuration files; every field has a default.
pub mod config;

/// Trace replay, request issuing, response matching and orchestration.
pub mod sim;

/// DRAM engine, protocols, channel controller and the `Dut` contract.
pub mod soc;

/// Run statistics and reporting.
pub mod stats;
