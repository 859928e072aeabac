//! Transaction Issuer.
//!
//! Drives the request channel: presents a trace entry with `in_valid` high
//! and waits, one tick at a time, for the device to assert `in_ready`.
//! The waiting ticks are handed back to the caller so the response channel
//! keeps draining.

use super::context::{EnqueueRecord, SimContext};
use super::matcher::{PendingRequest, PendingTable};
use super::oracle::GoldenRecord;
use super::trace::TraceEntry;
use crate::common::{HarnessError, Tick};
use crate::soc::{Dut, Request};
use log::{error, warn};

/// How an issue attempt ended without a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Issued {
    /// The device took the request on the transfer edge.
    Accepted,
    /// The global tick budget ran out while waiting for `in_ready`. The
    /// entry was not issued.
    OutOfTime,
}

/// Producer side of the request channel.
#[derive(Debug, Clone)]
pub struct TransactionIssuer {
    enqueue_timeout: Tick,
}

impl TransactionIssuer {
    /// Creates an issuer.
    ///
    /// # Arguments
    ///
    /// * `enqueue_timeout` - Ticks to wait for `in_ready` before giving up.
    pub fn new(enqueue_timeout: Tick) -> Self {
        Self { enqueue_timeout }
    }

    pub fn enqueue_timeout(&self) -> Tick {
        self.enqueue_timeout
    }

    /// Issues one trace entry.
    ///
    /// Each tick spent waiting for `in_ready` is taken by `wait`, which must
    /// advance the clock by exactly one tick. The harness uses it to keep
    /// draining responses so a device with full queues can make progress.
    ///
    /// On acceptance the transfer edge is clocked, `in_valid` is dropped,
    /// the request becomes pending and a write's value is committed to the
    /// golden record.
    ///
    /// # Arguments
    ///
    /// * `deadline` - Global tick budget; waiting stops when it is reached.
    ///
    /// # Returns
    ///
    /// `HarnessError::EnqueueTimeout` if `in_ready` stayed low for exactly
    /// `enqueue_timeout` ticks, `Issued::OutOfTime` if the budget ran out
    /// first. `in_valid` is dropped in both cases.
    pub fn issue<W>(
        &self,
        ctx: &mut SimContext,
        dut: &mut dyn Dut,
        entry: &TraceEntry,
        pending: &mut PendingTable,
        golden: &mut GoldenRecord,
        deadline: Tick,
        mut wait: W,
    ) -> Result<Issued, HarnessError>
    where
        W: FnMut(&mut SimContext, &mut dyn Dut, &mut PendingTable, &GoldenRecord),
    {
        {
            let io = dut.io_mut();
            io.in_valid = true;
            io.in_bits = Request::new(entry.kind, entry.addr, entry.wdata);
        }

        let mut waited = 0;
        loop {
            if dut.io().in_ready && ctx.now() < deadline {
                break;
            }
            if waited >= self.enqueue_timeout {
                dut.io_mut().in_valid = false;
                let err = HarnessError::EnqueueTimeout {
                    addr: entry.addr,
                    kind: entry.kind,
                    tick: ctx.now(),
                    waited,
                };
                error!("{}", err);
                return Err(err);
            }
            if ctx.now() >= deadline {
                dut.io_mut().in_valid = false;
                warn!(
                    "{} to {:#x} still waiting for in_ready at the tick budget",
                    entry.kind, entry.addr
                );
                return Ok(Issued::OutOfTime);
            }
            wait(ctx, &mut *dut, &mut *pending, &*golden);
            waited += 1;
        }

        if pending.contains(entry.addr) {
            warn!(
                "{} to {:#x} issued while an earlier request to the same address is pending; \
                 responses are matched oldest first",
                entry.kind, entry.addr
            );
        }

        let accepted_at = ctx.now();
        ctx.advance(dut);
        dut.io_mut().in_valid = false;

        pending.insert(PendingRequest {
            addr: entry.addr,
            kind: entry.kind,
            data: entry.wdata,
            issued_at: accepted_at,
        });
        if entry.kind.is_write() {
            golden.commit(entry.addr, entry.wdata);
        }
        ctx.log_enqueue(EnqueueRecord {
            tick: accepted_at,
            addr: entry.addr,
            kind: entry.kind,
            data: entry.kind.is_write().then_some(entry.wdata),
        });

        Ok(Issued::Accepted)
    }
}
