//! Device side of the verification setup.
//!
//! Holds the DRAM protocol engine, the channel controller that exposes it as
//! a device under test, the channel definitions and the `Dut` contract.

/// Builds the configured device under test.
pub mod builder;

/// Request/response channel payloads and the port bundle.
pub mod interconnect;

/// DRAM engine, protocols and controller.
pub mod memory;

/// The `Dut` trait.
pub mod traits;

pub use builder::build_dut;
pub use interconnect::{Io, Request, Response};
pub use traits::Dut;
