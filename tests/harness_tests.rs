//! Integration tests for the verification harness.
//!
//! Runs traces against the real controller and against scripted stub
//! devices that misbehave in controlled ways.

use dram_harness::common::{HarnessError, OpKind, Tick, Word};
use dram_harness::config::{Config, EngineProfile, HarnessConfig};
use dram_harness::sim::trace::random_pairs;
use dram_harness::sim::{
    GoldenRecord, Harness, Issued, PendingRequest, PendingTable, SimContext, TraceEntry,
    TraceReplay, TransactionIssuer,
};
use dram_harness::soc::{build_dut, Dut, Io, Request, Response};
use dram_harness::stats::RunReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

type Responder = Box<dyn FnMut(Request) -> Option<(Response, Tick)>>;

/// Stub device answering each accepted request through a closure.
///
/// The closure returns the response and its delay in ticks, or `None` to
/// never answer. Pending responses are presented in due order.
struct ScriptedDut {
    io: Io,
    accepting: bool,
    respond: Responder,
    now: Tick,
    queue: Vec<(Tick, Response)>,
}

impl ScriptedDut {
    fn new<F>(accepting: bool, respond: F) -> Self
    where
        F: FnMut(Request) -> Option<(Response, Tick)> + 'static,
    {
        let mut dut = Self {
            io: Io::default(),
            accepting,
            respond: Box::new(respond),
            now: 0,
            queue: Vec::new(),
        };
        dut.update();
        dut
    }

    fn update(&mut self) {
        self.io.in_ready = self.accepting;
        let head = self.queue.first().filter(|(due, _)| *due <= self.now);
        self.io.out_valid = head.is_some();
        self.io.out_bits = head.map(|(_, resp)| *resp).unwrap_or_default();
    }
}

impl Dut for ScriptedDut {
    fn name(&self) -> &str {
        "ScriptedDut"
    }

    fn io(&self) -> &Io {
        &self.io
    }

    fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    fn tick(&mut self) {
        self.now += 1;
        if self.io.reset {
            self.queue.clear();
            self.update();
            return;
        }
        if self.io.response_fires() {
            self.queue.remove(0);
        }
        if self.io.request_fires() {
            if let Some((resp, delay)) = (self.respond)(self.io.in_bits) {
                let due = self.now + delay;
                let at = self.queue.partition_point(|(d, _)| *d <= due);
                self.queue.insert(at, (due, resp));
            }
        }
        self.update();
    }
}

/// Ideal memory answering after `delay` ticks, with `tamper` applied to
/// the returned data.
fn memory<T>(delay: Tick, tamper: T) -> impl FnMut(Request) -> Option<(Response, Tick)>
where
    T: Fn(OpKind, Word) -> Word + 'static,
{
    let mut cells: HashMap<u32, Word> = HashMap::new();
    move |req| {
        let kind = req.kind()?;
        let data = match kind {
            OpKind::Write => {
                cells.insert(req.addr, req.wdata);
                req.wdata
            }
            OpKind::Read => cells.get(&req.addr).copied().unwrap_or(0),
        };
        Some((Response::new(kind, req.addr, tamper(kind, data)), delay))
    }
}

fn honest(_: OpKind, data: Word) -> Word {
    data
}

fn harness_config() -> HarnessConfig {
    HarnessConfig {
        reset_ticks: 0,
        ..HarnessConfig::default()
    }
}

fn run(config: &HarnessConfig, entries: Vec<TraceEntry>, dut: &mut dyn Dut) -> RunReport {
    let mut trace = TraceReplay::new(entries);
    Harness::new(config).run(&mut trace, dut)
}

/// Tests a write followed by a read of the same address on the timed device.
#[test]
fn test_write_then_read_timed() {
    let mut config = Config::default();
    config.harness.reset_ticks = 0;
    let mut dut = build_dut(&config);

    let report = run(
        &config.harness,
        vec![
            TraceEntry::write(0x10, 0, 0xCAFE),
            TraceEntry::read(0x10, 5),
        ],
        dut.as_mut(),
    );

    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.issued_writes, 1);
    assert_eq!(report.issued_reads, 1);
    assert_eq!(report.verified, 2);

    assert_eq!(report.enqueue_log[0].tick, 0);
    assert_eq!(report.enqueue_log[1].tick, 5);
    assert_eq!(report.enqueue_log[1].data, None);

    let write = &report.response_log[0];
    assert_eq!(write.kind, Some(OpKind::Write));
    assert_eq!(write.latency, Some(12));

    let read = &report.response_log[1];
    assert_eq!(read.kind, Some(OpKind::Read));
    assert_eq!(read.data, 0xCAFE);
    // The read waits for the write's precharge before its own activate.
    assert_eq!(read.latency, Some(30));
}

/// Tests the same trace on the simplified device.
#[test]
fn test_write_then_read_simple() {
    let mut config = Config::default();
    config.engine.profile = EngineProfile::Simple;
    config.harness.reset_ticks = 0;
    let mut dut = build_dut(&config);

    let report = run(
        &config.harness,
        vec![
            TraceEntry::write(0x10, 0, 0xBEEF),
            TraceEntry::read(0x10, 5),
        ],
        dut.as_mut(),
    );

    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.response_log[0].latency, Some(3));
    assert_eq!(report.response_log[1].data, 0xBEEF);
}

/// Tests generated write-then-read pairs never violate data integrity.
#[test]
fn test_random_pairs_golden_consistency() {
    let config = Config::default();
    let mut dut = build_dut(&config);
    let entries = random_pairs(25, 0x40, 60, &mut StdRng::seed_from_u64(42));

    let report = run(&config.harness, entries, dut.as_mut());

    assert_eq!(report.integrity_violations(), 0);
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.verified, 50);
}

/// Tests the first request is issued after the reset sequence.
#[test]
fn test_reset_sequence_precedes_trace() {
    let config = Config::default();
    let mut dut = build_dut(&config);

    let report = run(
        &config.harness,
        vec![TraceEntry::write(0x10, 0, 0x1)],
        dut.as_mut(),
    );

    assert!(report.is_clean());
    assert_eq!(report.enqueue_log[0].tick, config.harness.reset_ticks + 1);
}

/// Tests data decays end to end when the controller never refreshes.
#[test]
fn test_missed_refresh_detected() {
    let mut config = Config::default();
    config.harness.reset_ticks = 0;
    config.engine.refresh_period = 100;
    config.controller.refresh_interval = 0;
    let mut dut = build_dut(&config);

    let report = run(
        &config.harness,
        vec![
            TraceEntry::write(0x20, 0, 0x1234),
            TraceEntry::read(0x20, 250),
        ],
        dut.as_mut(),
    );

    assert_eq!(report.integrity_violations(), 1);
    assert!(matches!(
        report.failures[0],
        HarnessError::DataIntegrityViolation {
            addr: 0x20,
            kind: OpKind::Read,
            expected: 0x1234,
            actual: 0xFFFF_FFFF,
            ..
        }
    ));
    assert!(report.terminal.is_none());
}

/// Tests a never-ready device fails after exactly the enqueue timeout.
#[test]
fn test_enqueue_timeout_exact() {
    let config = HarnessConfig {
        enqueue_timeout: 7,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(false, |_| None);

    let report = run(&config, vec![TraceEntry::read(0x10, 0)], &mut dut);

    assert_eq!(
        report.failures,
        vec![HarnessError::EnqueueTimeout {
            addr: 0x10,
            kind: OpKind::Read,
            tick: 7,
            waited: 7,
        }]
    );
    assert_eq!(report.ticks, 7);
    assert_eq!(report.issued_reads, 0);
    assert!(report.terminal.is_none());
    assert!(!dut.io().in_valid);
}

/// Tests an enqueue timeout does not stop later entries from running.
#[test]
fn test_enqueue_timeout_continues() {
    let config = HarnessConfig {
        enqueue_timeout: 5,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(false, |_| None);

    let report = run(
        &config,
        vec![TraceEntry::read(0x1, 0), TraceEntry::read(0x2, 0)],
        &mut dut,
    );

    assert_eq!(report.enqueue_timeouts(), 2);
    assert_eq!(report.ticks, 10);
}

/// Tests a response for an unknown address is a warning and the orphaned
/// request times out.
#[test]
fn test_unmatched_response_and_timeout() {
    let config = HarnessConfig {
        response_timeout: 20,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(true, |req: Request| {
        Some((Response::new(OpKind::Write, 0x99, req.wdata), 1))
    });

    let report = run(&config, vec![TraceEntry::write(0x10, 0, 0x5)], &mut dut);

    assert_eq!(report.unmatched_responses(), 1);
    assert_eq!(report.response_timeouts(), 1);
    assert!(report.failures.contains(&HarnessError::ResponseTimeout {
        addr: 0x10,
        kind: OpKind::Write,
        issued_at: 0,
        tick: 21,
    }));
    assert!(report.terminal.is_none());
    assert!(!report.is_clean());
    assert_eq!(report.response_log[0].latency, None);
}

/// Tests a write echo that differs from the sent value is flagged.
#[test]
fn test_write_echo_mismatch() {
    let mut dut = ScriptedDut::new(true, memory(1, |_, data| data ^ 1));

    let report = run(
        &harness_config(),
        vec![
            TraceEntry::write(0x1, 0, 0x10),
            TraceEntry::write(0x2, 10, 0x20),
            TraceEntry::write(0x3, 20, 0x30),
        ],
        &mut dut,
    );

    assert_eq!(report.integrity_violations(), 3);
    assert_eq!(report.responses, 3);
    assert_eq!(report.verified, 0);
    assert!(report.terminal.is_none());
}

/// Tests a read returning something other than the golden value is flagged.
#[test]
fn test_read_mismatch() {
    let tamper = |kind: OpKind, data: Word| match kind {
        OpKind::Read => 0,
        OpKind::Write => data,
    };
    let mut dut = ScriptedDut::new(true, memory(2, tamper));

    let report = run(
        &harness_config(),
        vec![
            TraceEntry::write(0x10, 0, 0xAB),
            TraceEntry::read(0x10, 20),
        ],
        &mut dut,
    );

    assert_eq!(report.verified, 1);
    assert!(matches!(
        report.failures.as_slice(),
        [HarnessError::DataIntegrityViolation {
            addr: 0x10,
            kind: OpKind::Read,
            expected: 0xAB,
            actual: 0,
            ..
        }]
    ));
}

/// Tests fail-fast ends the run at the first failure.
#[test]
fn test_fail_fast() {
    let config = HarnessConfig {
        fail_fast: true,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(true, memory(1, |_, data| data ^ 1));

    let report = run(
        &config,
        vec![
            TraceEntry::write(0x1, 0, 0x10),
            TraceEntry::write(0x2, 10, 0x20),
        ],
        &mut dut,
    );

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.terminal,
        Some(HarnessError::DataIntegrityViolation { addr: 0x1, .. })
    ));
    assert_eq!(report.issued_writes, 1);
}

/// Tests fail-fast does not stop on unmatched-response warnings.
#[test]
fn test_fail_fast_ignores_warnings() {
    let config = HarnessConfig {
        fail_fast: true,
        response_timeout: 10,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(true, |req: Request| {
        Some((Response::new(OpKind::Read, req.addr + 1, 0), 1))
    });

    let report = run(&config, vec![TraceEntry::read(0x10, 0)], &mut dut);

    assert_eq!(report.unmatched_responses(), 1);
    assert!(matches!(
        report.terminal,
        Some(HarnessError::ResponseTimeout { addr: 0x10, .. })
    ));
}

/// Tests reads of never-written addresses pass unchecked.
#[test]
fn test_unchecked_read() {
    let mut dut = ScriptedDut::new(true, memory(1, honest));

    let report = run(&harness_config(), vec![TraceEntry::read(0x70, 0)], &mut dut);

    assert!(report.is_clean());
    assert_eq!(report.verified, 1);
    assert_eq!(report.unchecked_reads, 1);
}

/// Tests the run ends with a terminal failure when the tick budget runs out.
#[test]
fn test_global_tick_budget() {
    let config = HarnessConfig {
        max_ticks: 50,
        response_timeout: 0,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(true, |_| None);

    let report = run(
        &config,
        vec![TraceEntry::write(0x10, 0, 0x1), TraceEntry::read(0x20, 100)],
        &mut dut,
    );

    assert_eq!(report.ticks, 50);
    assert_eq!(
        report.terminal,
        Some(HarnessError::GlobalTickBudgetExceeded {
            max_ticks: 50,
            pending: 1,
            remaining: 1,
        })
    );
    assert!(report.failures.is_empty());
    assert!(!report.is_clean());
}

/// Tests an entry stuck on the request channel at the tick budget ends the
/// run with the budget failure rather than an enqueue timeout.
#[test]
fn test_tick_budget_while_enqueuing() {
    let config = HarnessConfig {
        max_ticks: 50,
        enqueue_timeout: 1_000,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(false, |_| None);

    let report = run(&config, vec![TraceEntry::read(0x10, 0)], &mut dut);

    assert_eq!(report.ticks, 50);
    assert_eq!(report.issued_reads, 0);
    assert_eq!(report.enqueue_timeouts(), 0);
    assert_eq!(
        report.terminal,
        Some(HarnessError::GlobalTickBudgetExceeded {
            max_ticks: 50,
            pending: 0,
            remaining: 1,
        })
    );
    assert!(!dut.io().in_valid);
}

/// Tests overdue requests expire on time while back-to-back issues keep
/// the loop busy.
#[test]
fn test_response_timeouts_during_issue_burst() {
    let config = HarnessConfig {
        response_timeout: 5,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(true, |_| None);
    let entries = (0..20u32)
        .map(|i| TraceEntry::write(0x100 + i, Tick::from(i), i))
        .collect();

    let report = run(&config, entries, &mut dut);

    assert_eq!(report.issued_writes, 20);
    assert_eq!(report.response_timeouts(), 20);
    for (i, failure) in report.failures.iter().enumerate() {
        let i = i as u32;
        assert_eq!(
            *failure,
            HarnessError::ResponseTimeout {
                addr: 0x100 + i,
                kind: OpKind::Write,
                issued_at: Tick::from(i),
                tick: Tick::from(i) + 6,
            }
        );
    }
    assert_eq!(report.ticks, 25);
}

/// Tests a burst larger than both controller queues completes.
#[test]
fn test_burst_exceeding_queue_depth() {
    let config = Config::default();
    let mut dut = build_dut(&config);
    let mut entries: Vec<TraceEntry> = (0..20u32)
        .map(|i| TraceEntry::write(0x10 + i, 0, 0x1000 + i))
        .collect();
    entries.extend((0..20u32).map(|i| TraceEntry::read(0x10 + i, 0)));

    let report = run(&config.harness, entries, dut.as_mut());

    assert!(report.is_clean(), "{:?} {:?}", report.terminal, report.failures);
    assert_eq!(report.issued_writes, 20);
    assert_eq!(report.issued_reads, 20);
    assert_eq!(report.verified, 40);
    assert!(report.ticks < config.harness.max_ticks);
    let reads = &report.response_log[20..];
    for (i, read) in reads.iter().enumerate() {
        assert_eq!(read.data, 0x1000 + i as u32);
    }
}

/// Tests a refresh interval at the validated limit never lets data decay.
#[test]
fn test_refresh_interval_at_limit() {
    let mut config = Config::default();
    config.controller.refresh_interval = 165;
    assert!(config.validate().is_ok());
    let mut dut = build_dut(&config);
    let entries = random_pairs(50, 0x40, 20, &mut StdRng::seed_from_u64(9));

    let report = run(&config.harness, entries, dut.as_mut());

    assert_eq!(report.integrity_violations(), 0);
    assert!(report.is_clean(), "{:?} {:?}", report.terminal, report.failures);
    assert_eq!(report.verified, 100);
}

/// Tests responses are matched by address regardless of arrival order.
#[test]
fn test_out_of_order_responses() {
    let mut delays = vec![2, 20].into_iter();
    let mut inner = memory(0, honest);
    let mut dut = ScriptedDut::new(true, move |req| {
        let (resp, _) = inner(req)?;
        Some((resp, delays.next_back().unwrap_or(1)))
    });

    let report = run(
        &harness_config(),
        vec![
            TraceEntry::write(0x1, 0, 0x11),
            TraceEntry::write(0x2, 1, 0x22),
        ],
        &mut dut,
    );

    assert!(report.is_clean(), "{:?}", report.failures);
    let order: Vec<u32> = report.response_log.iter().map(|r| r.addr).collect();
    assert_eq!(order, vec![0x2, 0x1]);
}

/// Tests same-address requests are matched oldest first.
#[test]
fn test_same_address_matched_in_order() {
    let mut dut = ScriptedDut::new(true, memory(5, honest));

    let report = run(
        &harness_config(),
        vec![
            TraceEntry::write(0x5, 0, 0xA),
            TraceEntry::write(0x5, 1, 0xB),
            TraceEntry::read(0x5, 30),
        ],
        &mut dut,
    );

    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.verified, 3);
    assert_eq!(report.response_log[2].data, 0xB);
}

/// Tests the issuer gives up after exactly the enqueue timeout.
#[test]
fn test_issuer_timeout() {
    let issuer = TransactionIssuer::new(3);
    let mut ctx = SimContext::new();
    let mut dut = ScriptedDut::new(false, |_| None);
    let mut pending = PendingTable::new();
    let mut golden = GoldenRecord::new();

    let result = issuer.issue(
        &mut ctx,
        &mut dut,
        &TraceEntry::write(0x8, 0, 0x9),
        &mut pending,
        &mut golden,
        Tick::MAX,
        |ctx, dut, _, _| ctx.advance(dut),
    );

    assert!(matches!(
        result,
        Err(HarnessError::EnqueueTimeout { waited: 3, tick: 3, .. })
    ));
    assert_eq!(ctx.now(), 3);
    assert!(pending.is_empty());
    assert!(golden.is_empty());
    assert!(!dut.io().in_valid);
}

/// Tests an accepted write is pending and committed to the golden record.
#[test]
fn test_issuer_accepts() {
    let issuer = TransactionIssuer::new(3);
    let mut ctx = SimContext::new();
    let mut dut = ScriptedDut::new(true, |_| None);
    let mut pending = PendingTable::new();
    let mut golden = GoldenRecord::new();

    let issued = issuer
        .issue(
            &mut ctx,
            &mut dut,
            &TraceEntry::write(0x8, 0, 0x9),
            &mut pending,
            &mut golden,
            Tick::MAX,
            |_, _, _, _| panic!("ready device must not wait"),
        )
        .unwrap();

    assert_eq!(issued, Issued::Accepted);
    assert_eq!(ctx.now(), 1);
    assert!(pending.contains(0x8));
    assert_eq!(golden.expected(0x8), Some(0x9));
    assert_eq!(ctx.enqueue_log()[0].data, Some(0x9));
    assert!(!dut.io().in_valid);
}

/// Tests the issuer stops waiting at the tick budget without failing.
#[test]
fn test_issuer_stops_at_deadline() {
    let issuer = TransactionIssuer::new(10);
    let mut ctx = SimContext::new();
    let mut dut = ScriptedDut::new(false, |_| None);
    let mut pending = PendingTable::new();
    let mut golden = GoldenRecord::new();
    let mut waits = 0;

    let issued = issuer
        .issue(
            &mut ctx,
            &mut dut,
            &TraceEntry::read(0x8, 0),
            &mut pending,
            &mut golden,
            4,
            |ctx, dut, _, _| {
                waits += 1;
                ctx.advance(dut);
            },
        )
        .unwrap();

    assert_eq!(issued, Issued::OutOfTime);
    assert_eq!(waits, 4);
    assert_eq!(ctx.now(), 4);
    assert!(pending.is_empty());
    assert!(ctx.enqueue_log().is_empty());
    assert!(!dut.io().in_valid);
}

/// Tests pending requests expire strictly after the response timeout.
#[test]
fn test_pending_table_expiry() {
    let mut table = PendingTable::new();
    let request = |addr, issued_at| PendingRequest {
        addr,
        kind: OpKind::Read,
        data: 0,
        issued_at,
    };
    table.insert(request(0x1, 0));
    table.insert(request(0x1, 5));
    table.insert(request(0x2, 3));

    assert!(table.expire(100, 0).is_empty());
    assert!(table.expire(10, 10).is_empty());

    let expired = table.expire(14, 10);
    assert_eq!(expired, vec![request(0x1, 0), request(0x2, 3)]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.take(0x1), Some(request(0x1, 5)));
    assert!(table.is_empty());
    assert_eq!(table.take(0x1), None);
}

/// Tests the JSON report carries failures with their type tag.
#[test]
fn test_report_json() {
    let config = HarnessConfig {
        enqueue_timeout: 2,
        ..harness_config()
    };
    let mut dut = ScriptedDut::new(false, |_| None);
    let report = run(&config, vec![TraceEntry::read(0x10, 0)], &mut dut);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["dut"], "ScriptedDut");
    assert_eq!(json["failures"][0]["type"], "EnqueueTimeout");
    assert_eq!(json["failures"][0]["kind"], "READ");
}
