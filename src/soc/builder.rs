//! Device Under Test Builder.
//!
//! Wires a DRAM engine of the configured profile behind a channel
//! controller and returns it as a boxed `Dut`.

use crate::config::{Config, EngineProfile};
use crate::soc::memory::{
    ChannelController, CommandProtocol, DramEngine, MemoryStore, SignalProtocol,
};
use crate::soc::traits::Dut;
use log::info;

/// Builds the device under test described by `config`.
///
/// # Arguments
///
/// * `config` - Engine profile, timing constants and controller settings.
///
/// # Returns
///
/// A `ChannelController` driving a timed or simple engine.
pub fn build_dut(config: &Config) -> Box<dyn Dut> {
    let store = MemoryStore::with_default(config.engine.default_value);

    let dut: Box<dyn Dut> = match config.engine.profile {
        EngineProfile::Timed => {
            let engine = DramEngine::new(SignalProtocol::new(config.engine.timing()), store);
            Box::new(ChannelController::new(engine, &config.controller))
        }
        EngineProfile::Simple => {
            let engine =
                DramEngine::new(CommandProtocol::new(config.engine.response_delay), store);
            Box::new(ChannelController::new(engine, &config.controller))
        }
    };

    info!("[Builder] device under test: {}", dut.name());
    dut
}
