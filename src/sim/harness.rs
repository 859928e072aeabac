//! Orchestration Loop.
//!
//! Replays a trace against a device under test one tick at a time. Each
//! iteration first expires requests whose responses are overdue, then
//! either issues the next due trace entry, drains one response, or simply
//! advances the clock. Responses keep draining while an issue waits on the
//! request channel. The run ends when the trace is exhausted and nothing is
//! pending, or when the global tick budget runs out.

use super::context::SimContext;
use super::issuer::{Issued, TransactionIssuer};
use super::matcher::{DrainOutcome, PendingTable, ResponseMatcher};
use super::oracle::GoldenRecord;
use super::trace::TraceReplay;
use crate::common::HarnessError;
use crate::config::HarnessConfig;
use crate::soc::Dut;
use crate::stats::RunReport;
use log::{error, info};

/// Trace-driven verification harness.
pub struct Harness {
    config: HarnessConfig,
    issuer: TransactionIssuer,
    matcher: ResponseMatcher,
    golden: GoldenRecord,
    pending: PendingTable,
}

impl Harness {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            config: config.clone(),
            issuer: TransactionIssuer::new(config.enqueue_timeout),
            matcher: ResponseMatcher::new(),
            golden: GoldenRecord::new(),
            pending: PendingTable::new(),
        }
    }

    pub fn golden(&self) -> &GoldenRecord {
        &self.golden
    }

    pub fn pending(&self) -> &PendingTable {
        &self.pending
    }

    /// Runs `trace` against `dut` until completion or a terminal failure.
    ///
    /// The device is first held in reset for `reset_ticks` ticks followed by
    /// one release tick. All failures are recorded in the returned report;
    /// none is propagated as a panic or hidden.
    pub fn run(&mut self, trace: &mut TraceReplay, dut: &mut dyn Dut) -> RunReport {
        let mut ctx = SimContext::new();
        let mut report = RunReport::new(dut.name());

        self.reset_dut(&mut ctx, dut);
        dut.io_mut().out_ready = false;

        info!(
            "[Harness] replaying {} entries against {}",
            trace.len(),
            dut.name()
        );

        let mut unissued = 0;
        'run: while (!trace.is_exhausted() || !self.pending.is_empty())
            && ctx.now() < self.config.max_ticks
        {
            let now = ctx.now();
            for request in self.pending.expire(now, self.config.response_timeout) {
                let err = HarnessError::ResponseTimeout {
                    addr: request.addr,
                    kind: request.kind,
                    issued_at: request.issued_at,
                    tick: now,
                };
                error!("{}", err);
                if self.record(&mut report, err) {
                    break 'run;
                }
            }
            if trace.is_exhausted() && self.pending.is_empty() {
                break 'run;
            }

            if let Some(entry) = trace.next_ready(ctx.now()) {
                let matcher = &mut self.matcher;
                let mut drained = Vec::new();
                let issued = self.issuer.issue(
                    &mut ctx,
                    dut,
                    &entry,
                    &mut self.pending,
                    &mut self.golden,
                    self.config.max_ticks,
                    |ctx, dut, pending, golden| match matcher.drain(ctx, dut, pending, golden) {
                        DrainOutcome::Empty => ctx.advance(dut),
                        outcome => drained.push(outcome),
                    },
                );

                let failure = match issued {
                    Ok(Issued::Accepted) => {
                        report.record_issue(entry.kind);
                        None
                    }
                    Ok(Issued::OutOfTime) => {
                        unissued += 1;
                        None
                    }
                    Err(err) => Some(err),
                };
                for outcome in drained {
                    if self.settle(&mut report, outcome) {
                        break 'run;
                    }
                }
                if let Some(err) = failure {
                    if self.record(&mut report, err) {
                        break 'run;
                    }
                }
                continue;
            }

            match self
                .matcher
                .drain(&mut ctx, dut, &mut self.pending, &self.golden)
            {
                DrainOutcome::Empty => ctx.advance(dut),
                outcome => {
                    if self.settle(&mut report, outcome) {
                        break 'run;
                    }
                }
            }
        }

        let remaining = trace.remaining() + unissued;
        let unfinished = remaining > 0 || !self.pending.is_empty();
        if report.terminal.is_none() && unfinished && ctx.now() >= self.config.max_ticks {
            let err = HarnessError::GlobalTickBudgetExceeded {
                max_ticks: self.config.max_ticks,
                pending: self.pending.len(),
                remaining,
            };
            error!("{}", err);
            report.terminal = Some(err);
        }

        let (ticks, enqueue_log, response_log) = ctx.into_parts();
        report.ticks = ticks;
        report.enqueue_log = enqueue_log;
        report.response_log = response_log;
        report.unchecked_reads = self.matcher.unchecked_reads();

        if report.terminal.is_none() {
            info!("[Harness] simulation completed in {} ticks", ticks);
        }
        report
    }

    /// Holds the reset line for the configured number of ticks, then
    /// clocks one tick with reset released.
    fn reset_dut(&self, ctx: &mut SimContext, dut: &mut dyn Dut) {
        if self.config.reset_ticks == 0 {
            return;
        }
        dut.io_mut().reset = true;
        for _ in 0..self.config.reset_ticks {
            ctx.advance(dut);
        }
        dut.io_mut().reset = false;
        ctx.advance(dut);
    }

    /// Counts a consumed response and records its failure, if any.
    ///
    /// # Returns
    ///
    /// `true` if the failure ends the run under fail-fast.
    fn settle(&self, report: &mut RunReport, outcome: DrainOutcome) -> bool {
        match outcome {
            DrainOutcome::Empty => false,
            DrainOutcome::Verified => {
                report.responses += 1;
                report.verified += 1;
                false
            }
            DrainOutcome::Failed(err) => {
                report.responses += 1;
                self.record(report, err)
            }
        }
    }

    /// Records a per-transaction failure.
    ///
    /// # Returns
    ///
    /// `true` if the failure ends the run under fail-fast.
    fn record(&self, report: &mut RunReport, err: HarnessError) -> bool {
        let stop = self.config.fail_fast && !err.is_warning();
        if stop {
            report.terminal = Some(err.clone());
        }
        report.failures.push(err);
        stop
    }
}
