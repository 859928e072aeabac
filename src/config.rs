use crate::common::{ConfigError, Word};
use crate::soc::memory::Timing;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const T_RCD: u32 = 5;
const T_CL: u32 = 5;
const T_PRE: u32 = 10;
const T_REFRESH: u32 = 10;
const REFRESH_PERIOD: u64 = 200;
const RESPONSE_DELAY: u32 = 2;

const QUEUE_DEPTH: usize = 8;
const REFRESH_INTERVAL: u64 = 150;

const MAX_TICKS: u64 = 100_000;
const ENQUEUE_TIMEOUT: u64 = 100_000;
const RESPONSE_TIMEOUT: u64 = 10_000;
const RESET_TICKS: u64 = 5;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
}

impl Config {
    /// Reads and validates a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine, controller or harness cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.request_queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "controller.request_queue_depth must be at least 1".into(),
            ));
        }
        if self.controller.response_queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "controller.response_queue_depth must be at least 1".into(),
            ));
        }
        if self.harness.max_ticks == 0 {
            return Err(ConfigError::Invalid(
                "harness.max_ticks must be at least 1".into(),
            ));
        }
        let period = self.engine.refresh_period;
        let interval = self.controller.refresh_interval;
        let overhead = self.engine.refresh_overhead();
        if self.engine.profile == EngineProfile::Timed
            && period > 0
            && interval > 0
            && interval.saturating_add(overhead) >= period
        {
            return Err(ConfigError::Invalid(format!(
                "controller.refresh_interval ({}) plus {} ticks of plan and refresh \
                 latency must be below engine.refresh_period ({})",
                interval, overhead, period
            )));
        }
        Ok(())
    }
}

/// Timing profile run by the DRAM engine.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineProfile {
    /// Signal-level protocol with activation, latencies and refresh decay.
    #[default]
    Timed,
    /// Fixed-delay opcode protocol.
    Simple,
}

impl std::str::FromStr for EngineProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timed" => Ok(EngineProfile::Timed),
            "simple" => Ok(EngineProfile::Simple),
            other => Err(format!("unknown engine profile '{}'", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub profile: EngineProfile,

    #[serde(default = "default_t_rcd")]
    pub t_rcd: u32,

    #[serde(default = "default_t_cl")]
    pub t_cl: u32,

    #[serde(default = "default_t_pre")]
    pub t_pre: u32,

    #[serde(default = "default_t_refresh")]
    pub t_refresh: u32,

    /// Zero disables refresh decay.
    #[serde(default = "default_refresh_period")]
    pub refresh_period: u64,

    /// Delay of the simple profile.
    #[serde(default = "default_response_delay")]
    pub response_delay: u32,

    /// Value read from addresses that were never written.
    #[serde(default)]
    pub default_value: Word,
}

impl EngineConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            t_rcd: self.t_rcd,
            t_cl: self.t_cl,
            t_pre: self.t_pre,
            t_refresh: self.t_refresh,
            refresh_period: self.refresh_period,
        }
    }

    /// Ticks from the start of the longest request plan to the completion
    /// of the refresh queued behind it.
    pub fn refresh_overhead(&self) -> u64 {
        let edges = |latency: u32| u64::from(latency) + 1;
        edges(self.t_rcd) + edges(self.t_cl) + edges(self.t_pre) + edges(self.t_refresh)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: EngineProfile::default(),
            t_rcd: T_RCD,
            t_cl: T_CL,
            t_pre: T_PRE,
            t_refresh: T_REFRESH,
            refresh_period: REFRESH_PERIOD,
            response_delay: RESPONSE_DELAY,
            default_value: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_queue_depth")]
    pub request_queue_depth: usize,

    #[serde(default = "default_queue_depth")]
    pub response_queue_depth: usize,

    /// Zero disables refresh scheduling.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            request_queue_depth: QUEUE_DEPTH,
            response_queue_depth: QUEUE_DEPTH,
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarnessConfig {
    /// Global tick budget of a run.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Ticks a request may wait for the request channel to become ready.
    #[serde(default = "default_enqueue_timeout")]
    pub enqueue_timeout: u64,

    /// Ticks an accepted request may wait for its response.
    #[serde(default = "default_response_timeout")]
    pub response_timeout: u64,

    /// Ticks the device is held in reset before the trace starts.
    #[serde(default = "default_reset_ticks")]
    pub reset_ticks: u64,

    /// End the run on the first per-transaction failure.
    #[serde(default)]
    pub fail_fast: bool,

    /// Seed for synthesized write values; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_ticks: MAX_TICKS,
            enqueue_timeout: ENQUEUE_TIMEOUT,
            response_timeout: RESPONSE_TIMEOUT,
            reset_ticks: RESET_TICKS,
            fail_fast: false,
            seed: None,
        }
    }
}

fn default_t_rcd() -> u32 {
    T_RCD
}

fn default_t_cl() -> u32 {
    T_CL
}

fn default_t_pre() -> u32 {
    T_PRE
}

fn default_t_refresh() -> u32 {
    T_REFRESH
}

fn default_refresh_period() -> u64 {
    REFRESH_PERIOD
}

fn default_response_delay() -> u32 {
    RESPONSE_DELAY
}

fn default_queue_depth() -> usize {
    QUEUE_DEPTH
}

fn default_refresh_interval() -> u64 {
    REFRESH_INTERVAL
}

fn default_max_ticks() -> u64 {
    MAX_TICKS
}

fn default_enqueue_timeout() -> u64 {
    ENQUEUE_TIMEOUT
}

fn default_response_timeout() -> u64 {
    RESPONSE_TIMEOUT
}

fn default_reset_ticks() -> u64 {
    RESET_TICKS
}
