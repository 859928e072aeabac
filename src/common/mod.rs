//! Common types shared by the DRAM model and the verification harness.
//!
//! This module provides the operation kinds carried on the request and
//! response channels and the error types reported by every layer of the
//! crate.

/// Operation kind definitions.
pub mod data;

/// Error types for the harness, configuration and trace layers.
pub mod error;

pub use data::OpKind;
pub use error::{ConfigError, HarnessError, TraceError};

/// Memory address as seen on the device and channel interfaces.
pub type Addr = u32;

/// Data word stored at an address.
pub type Word = u32;

/// Simulation time in clock ticks.
pub type Tick = u64;
