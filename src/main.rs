//! DRAM Trace Verification CLI.
//!
//! The main executable. It parses command-line arguments, loads the
//! configuration, builds the device under test and replays a trace against
//! it.
//!
//! # Usage
//!
//! The harness can run in two modes:
//! 1. **Trace Mode**: Replays a `<hex-address> <READ|WRITE> <tick>` trace file.
//! 2. **Random Mode**: Generates write-then-read pairs to random addresses.

use clap::Parser;
use log::{error, info};
use std::{fs, process};

use dram_harness::config::{Config, EngineProfile};
use dram_harness::sim::loader;
use dram_harness::sim::{Harness, TraceReplay};
use dram_harness::soc::build_dut;

/// Command-line arguments for the verification harness.
///
/// Every run parameter of the configuration file can be overridden here.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle-accurate DRAM trace verification harness")]
struct Args {
    /// TOML configuration file; defaults are used when absent.
    #[arg(short, long)]
    config: Option<String>,

    /// Trace file to replay.
    #[arg(short, long)]
    trace: Option<String>,

    /// Generate this many write-then-read pairs instead of reading a trace.
    #[arg(long, conflicts_with = "trace")]
    random: Option<usize>,

    /// Ticks between generated operations.
    #[arg(long, default_value_t = 50)]
    gap: u64,

    /// Engine profile: timed or simple.
    #[arg(long)]
    profile: Option<EngineProfile>,

    #[arg(short = 'm', long)]
    max_ticks: Option<u64>,

    #[arg(long)]
    enqueue_timeout: Option<u64>,

    #[arg(long)]
    response_timeout: Option<u64>,

    #[arg(long)]
    refresh_period: Option<u64>,

    #[arg(long)]
    refresh_interval: Option<u64>,

    #[arg(long)]
    t_rcd: Option<u32>,

    #[arg(long)]
    t_cl: Option<u32>,

    #[arg(long)]
    t_pre: Option<u32>,

    #[arg(long)]
    t_refresh: Option<u32>,

    #[arg(long)]
    response_delay: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop at the first per-transaction failure.
    #[arg(long)]
    fail_fast: bool,

    /// Write the full run report as JSON to this path.
    #[arg(long)]
    report: Option<String>,
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        let engine = &mut config.engine;
        if let Some(profile) = self.profile {
            engine.profile = profile;
        }
        if let Some(v) = self.refresh_period {
            engine.refresh_period = v;
        }
        if let Some(v) = self.t_rcd {
            engine.t_rcd = v;
        }
        if let Some(v) = self.t_cl {
            engine.t_cl = v;
        }
        if let Some(v) = self.t_pre {
            engine.t_pre = v;
        }
        if let Some(v) = self.t_refresh {
            engine.t_refresh = v;
        }
        if let Some(v) = self.response_delay {
            engine.response_delay = v;
        }

        if let Some(v) = self.refresh_interval {
            config.controller.refresh_interval = v;
        }

        let harness = &mut config.harness;
        if let Some(v) = self.max_ticks {
            harness.max_ticks = v;
        }
        if let Some(v) = self.enqueue_timeout {
            harness.enqueue_timeout = v;
        }
        if let Some(v) = self.response_timeout {
            harness.response_timeout = v;
        }
        if self.seed.is_some() {
            harness.seed = self.seed;
        }
        if self.fail_fast {
            harness.fail_fast = true;
        }
    }
}

/// Main entry point for the verification harness.
///
/// # Behavior
///
/// 1. **Configuration**: Loads the TOML file (or defaults) and applies overrides.
/// 2. **Initialization**: Builds the device under test for the engine profile.
/// 3. **Stimulus**: Loads the trace file or generates random pairs.
/// 4. **Simulation Loop**: Replays the trace until completion or a terminal failure.
/// 5. **Teardown**: Prints the summary, writes the JSON report and exits 0
///    only for a clean run.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            error!("could not load config '{}': {}", path, e);
            process::exit(1);
        }),
        None => Config::default(),
    };
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(1);
    }

    info!("Engine:");
    info!("  Profile:            {:?}", config.engine.profile);
    info!(
        "  tRCD/tCL/tPRE/tREF: {}/{}/{}/{}",
        config.engine.t_rcd, config.engine.t_cl, config.engine.t_pre, config.engine.t_refresh
    );
    info!("  Refresh Period:     {}", config.engine.refresh_period);
    info!("Harness:");
    info!("  Max Ticks:          {}", config.harness.max_ticks);
    info!("  Enqueue Timeout:    {}", config.harness.enqueue_timeout);
    info!("  Response Timeout:   {}", config.harness.response_timeout);

    let mut rng = loader::seeded_rng(config.harness.seed);
    let mut trace = if let Some(path) = &args.trace {
        let entries = loader::load_trace_file(path, &mut rng).unwrap_or_else(|e| {
            error!("could not load trace '{}': {}", path, e);
            process::exit(1);
        });
        TraceReplay::new(entries)
    } else if let Some(pairs) = args.random {
        loader::random_replay(pairs, args.gap, &mut rng)
    } else {
        eprintln!("Error: No stimulus specified.");
        eprintln!("Usage:");
        eprintln!("  Trace mode:   --trace <file.trace>");
        eprintln!("  Random mode:  --random <pairs> [--gap <ticks>]");
        process::exit(1);
    };

    let mut dut = build_dut(&config);
    let mut harness = Harness::new(&config.harness);
    let report = harness.run(&mut trace, dut.as_mut());

    report.print();

    if let Some(path) = &args.report {
        let written = report
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            error!("could not write report '{}': {}", path, e);
        }
    }

    process::exit(if report.is_clean() { 0 } else { 1 });
}
