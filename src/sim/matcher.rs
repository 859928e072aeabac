//! Response Matcher.
//!
//! Drains the response channel, pairs each response with a pending request
//! and validates its payload: write responses against the value sent, read
//! responses against the golden record.
//!
//! Responses carry no request tag, so pairing is by address only. Requests
//! to the same address are kept oldest first and the oldest is matched,
//! which is correct only if the device answers same-address requests in
//! order. The issuer logs a warning whenever it creates such an alias.

use super::context::{ResponseRecord, SimContext};
use super::oracle::GoldenRecord;
use crate::common::{Addr, HarnessError, OpKind, Tick, Word};
use crate::soc::Dut;
use log::{debug, error, warn};
use std::collections::{HashMap, VecDeque};

/// An accepted request awaiting its response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub addr: Addr,
    pub kind: OpKind,
    /// Value sent with a write; zero for reads.
    pub data: Word,
    /// Tick of the clock edge on which the request was accepted.
    pub issued_at: Tick,
}

/// Pending requests keyed by address.
#[derive(Debug, Default)]
pub struct PendingTable {
    by_addr: HashMap<Addr, VecDeque<PendingRequest>>,
    len: usize,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request: PendingRequest) {
        self.by_addr.entry(request.addr).or_default().push_back(request);
        self.len += 1;
    }

    /// Removes and returns the oldest pending request for `addr`.
    pub fn take(&mut self, addr: Addr) -> Option<PendingRequest> {
        let queue = self.by_addr.get_mut(&addr)?;
        let request = queue.pop_front()?;
        if queue.is_empty() {
            self.by_addr.remove(&addr);
        }
        self.len -= 1;
        Some(request)
    }

    pub fn contains(&self, addr: Addr) -> bool {
        self.by_addr.contains_key(&addr)
    }

    /// Removes every request that has waited more than `timeout` ticks.
    ///
    /// A timeout of zero never expires anything.
    pub fn expire(&mut self, now: Tick, timeout: Tick) -> Vec<PendingRequest> {
        if timeout == 0 {
            return Vec::new();
        }
        let mut expired = Vec::new();
        for queue in self.by_addr.values_mut() {
            while let Some(front) = queue.front() {
                if now.saturating_sub(front.issued_at) <= timeout {
                    break;
                }
                expired.extend(queue.pop_front());
            }
        }
        self.by_addr.retain(|_, queue| !queue.is_empty());
        self.len -= expired.len();
        expired.sort_by_key(|request| request.issued_at);
        expired
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Result of one drain attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// No response was valid; the clock was not advanced.
    Empty,
    /// A response was consumed and matched its expectation.
    Verified,
    /// A response was consumed but could not be verified.
    Failed(HarnessError),
}

/// Consumer side of the response channel.
#[derive(Debug, Default)]
pub struct ResponseMatcher {
    unchecked_reads: u64,
}

impl ResponseMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads whose address had no golden value and so could not be checked.
    pub fn unchecked_reads(&self) -> u64 {
        self.unchecked_reads
    }

    /// Consumes one response if the device offers one.
    ///
    /// The matched pending request is removed whatever the outcome. When a
    /// response is consumed the clock advances by one tick with `out_ready`
    /// asserted; `out_ready` is low otherwise.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Simulation clock and logs.
    /// * `dut` - Device whose response channel is drained.
    /// * `pending` - Requests awaiting responses.
    /// * `golden` - Expected values for reads.
    pub fn drain(
        &mut self,
        ctx: &mut SimContext,
        dut: &mut dyn Dut,
        pending: &mut PendingTable,
        golden: &GoldenRecord,
    ) -> DrainOutcome {
        if !dut.io().out_valid {
            return DrainOutcome::Empty;
        }

        let response = dut.io().out_bits;
        let now = ctx.now();
        let matched = pending.take(response.addr);

        ctx.log_response(ResponseRecord {
            tick: now,
            addr: response.addr,
            kind: matched.map(|request| request.kind).or(response.kind()),
            data: response.data,
            latency: matched.map(|request| now - request.issued_at),
        });

        let outcome = match matched {
            None => {
                let err = HarnessError::UnmatchedResponse {
                    addr: response.addr,
                    data: response.data,
                    tick: now,
                };
                warn!("{}", err);
                DrainOutcome::Failed(err)
            }
            Some(request) => {
                debug!(
                    "[RESP] tick {} {}_RESP addr={:#x} data={:#x}",
                    now, request.kind, response.addr, response.data
                );
                if response.kind().is_some_and(|kind| kind != request.kind) {
                    warn!(
                        "response for {:#x} flagged {:?}, pending request is {}",
                        response.addr,
                        response.kind(),
                        request.kind
                    );
                }
                self.check(&request, response.data, golden, now)
            }
        };

        dut.io_mut().out_ready = true;
        ctx.advance(dut);
        dut.io_mut().out_ready = false;

        outcome
    }

    fn check(
        &mut self,
        request: &PendingRequest,
        actual: Word,
        golden: &GoldenRecord,
        now: Tick,
    ) -> DrainOutcome {
        let expected = match request.kind {
            OpKind::Write => Some(request.data),
            OpKind::Read => golden.expected(request.addr),
        };

        let Some(expected) = expected else {
            self.unchecked_reads += 1;
            return DrainOutcome::Verified;
        };

        if expected == actual {
            return DrainOutcome::Verified;
        }

        let err = HarnessError::DataIntegrityViolation {
            addr: request.addr,
            kind: request.kind,
            expected,
            actual,
            tick: now,
        };
        error!("{}", err);
        DrainOutcome::Failed(err)
    }
}
