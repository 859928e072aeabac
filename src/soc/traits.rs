//! Device Under Test Interface.
//!
//! Defines the per-tick contract between the verification harness and a
//! clock-driven device. The harness writes the inputs of the `Io` bundle,
//! reads its outputs, and calls `tick` once per rising clock edge.

use super::interconnect::Io;

/// Trait for clock-driven devices exercised by the harness.
///
/// After `tick` returns, the device's output lines (`in_ready`, `out_valid`,
/// `out_bits`) must describe the state the harness sees before the next
/// edge. Input lines are left untouched by the device.
pub trait Dut {
    /// Returns the user-friendly name of the device.
    ///
    /// Used for logging and in the run report.
    fn name(&self) -> &str;

    /// Returns the port bundle.
    fn io(&self) -> &Io;

    /// Returns the port bundle for driving inputs.
    fn io_mut(&mut self) -> &mut Io;

    /// Advances the device by one rising clock edge.
    ///
    /// Channel transfers are taken from the line values present when the
    /// edge occurs.
    fn tick(&mut self);
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn io(&self) -> &Io {
        (**self).io()
    }

    fn io_mut(&mut self) -> &mut Io {
        (**self).io_mut()
    }

    fn tick(&mut self) {
        (**self).tick()
    }
}
