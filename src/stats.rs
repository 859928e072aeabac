//! Run statistics collection and reporting.
//!
//! Tracks transaction counts, recorded failures, the transaction logs and
//! the latencies observed during one verification run.

use crate::common::{HarnessError, OpKind, Tick};
use crate::sim::context::{EnqueueRecord, ResponseRecord};
use serde::Serialize;
use std::time::Instant;

/// Latency figures for one kind of transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: u64,
    pub mean: f64,
    pub min: Tick,
    pub max: Tick,
}

/// Outcome of a verification run.
///
/// Per-transaction failures accumulate in `failures`; a failure that ended
/// the run is stored in `terminal` as well.
#[derive(Debug, Serialize)]
pub struct RunReport {
    #[serde(skip)]
    start_time: Instant,
    pub dut: String,
    pub ticks: Tick,
    pub issued_reads: u64,
    pub issued_writes: u64,
    pub responses: u64,
    pub verified: u64,
    pub unchecked_reads: u64,
    pub failures: Vec<HarnessError>,
    pub terminal: Option<HarnessError>,
    pub enqueue_log: Vec<EnqueueRecord>,
    pub response_log: Vec<ResponseRecord>,
}

impl RunReport {
    pub fn new(dut: &str) -> Self {
        Self {
            start_time: Instant::now(),
            dut: dut.to_string(),
            ticks: 0,
            issued_reads: 0,
            issued_writes: 0,
            responses: 0,
            verified: 0,
            unchecked_reads: 0,
            failures: Vec::new(),
            terminal: None,
            enqueue_log: Vec::new(),
            response_log: Vec::new(),
        }
    }

    pub fn record_issue(&mut self, kind: OpKind) {
        match kind {
            OpKind::Read => self.issued_reads += 1,
            OpKind::Write => self.issued_writes += 1,
        }
    }

    /// Returns `true` if nothing failed and the run was not cut short.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.terminal.is_none()
    }

    /// Counts recorded failures matching `pred`.
    pub fn count_failures<F: Fn(&HarnessError) -> bool>(&self, pred: F) -> usize {
        self.failures.iter().filter(|failure| pred(failure)).count()
    }

    pub fn integrity_violations(&self) -> usize {
        self.count_failures(|f| matches!(f, HarnessError::DataIntegrityViolation { .. }))
    }

    pub fn enqueue_timeouts(&self) -> usize {
        self.count_failures(|f| matches!(f, HarnessError::EnqueueTimeout { .. }))
    }

    pub fn response_timeouts(&self) -> usize {
        self.count_failures(|f| matches!(f, HarnessError::ResponseTimeout { .. }))
    }

    pub fn unmatched_responses(&self) -> usize {
        self.count_failures(HarnessError::is_warning)
    }

    /// Latency summary over matched responses of `kind`.
    pub fn latency(&self, kind: OpKind) -> LatencySummary {
        let latencies: Vec<Tick> = self
            .response_log
            .iter()
            .filter(|record| record.kind == Some(kind))
            .filter_map(|record| record.latency)
            .collect();

        if latencies.is_empty() {
            return LatencySummary::default();
        }

        let sum: Tick = latencies.iter().sum();
        LatencySummary {
            count: latencies.len() as u64,
            mean: sum as f64 / latencies.len() as f64,
            min: latencies.iter().copied().min().unwrap_or(0),
            max: latencies.iter().copied().max().unwrap_or(0),
        }
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let khz = if seconds > 0.0 {
            (self.ticks as f64 / seconds) / 1000.0
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("DRAM TRACE VERIFICATION SUMMARY");
        println!("==========================================================");
        println!("dut                      {}", self.dut);
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_ticks                {}", self.ticks);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("----------------------------------------------------------");
        println!("TRANSACTIONS");
        println!("  issued.read            {}", self.issued_reads);
        println!("  issued.write           {}", self.issued_writes);
        println!("  responses              {}", self.responses);
        println!("  verified               {}", self.verified);
        println!("  unchecked.read         {}", self.unchecked_reads);
        println!("----------------------------------------------------------");
        println!("LATENCY (ticks)");
        let print_latency = |name: &str, summary: LatencySummary| {
            println!(
                "  {:<6} count: {:<8} | mean: {:<8.2} | min: {:<6} | max: {}",
                name, summary.count, summary.mean, summary.min, summary.max
            );
        };
        print_latency("READ", self.latency(OpKind::Read));
        print_latency("WRITE", self.latency(OpKind::Write));
        println!("----------------------------------------------------------");
        println!("FAILURES");
        println!("  integrity.violations   {}", self.integrity_violations());
        println!("  enqueue.timeouts       {}", self.enqueue_timeouts());
        println!("  response.timeouts      {}", self.response_timeouts());
        println!("  unmatched.responses    {}", self.unmatched_responses());
        match &self.terminal {
            Some(err) => println!("  terminal               {}", err),
            None => println!("  terminal               none"),
        }
        println!("==========================================================");
    }
}
