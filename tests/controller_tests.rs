//! Unit tests for the channel controller in front of the DRAM engine.

use dram_harness::common::OpKind;
use dram_harness::config::ControllerConfig;
use dram_harness::soc::memory::*;
use dram_harness::soc::{Dut, Request, Response};

fn controller_config(depth: usize, refresh_interval: u64) -> ControllerConfig {
    ControllerConfig {
        request_queue_depth: depth,
        response_queue_depth: depth,
        refresh_interval,
    }
}

fn timed_controller(refresh_period: u64, refresh_interval: u64) -> ChannelController<SignalProtocol> {
    let timing = Timing {
        refresh_period,
        ..Timing::default()
    };
    ChannelController::new(TimedEngine::timed(timing), &controller_config(8, refresh_interval))
}

/// Presents `request` for one edge, then waits for and consumes its response.
///
/// Returns the response and the number of edges until `out_valid` rose.
fn transact<D: Dut>(dut: &mut D, request: Request) -> (Response, u64) {
    assert!(dut.io().in_ready);
    dut.io_mut().in_valid = true;
    dut.io_mut().in_bits = request;
    dut.tick();
    dut.io_mut().in_valid = false;

    let mut edges = 1;
    while !dut.io().out_valid {
        dut.tick();
        edges += 1;
        assert!(edges < 1000, "no response for {:?}", request);
    }

    let response = dut.io().out_bits;
    dut.io_mut().out_ready = true;
    dut.tick();
    dut.io_mut().out_ready = false;
    (response, edges)
}

fn idle<D: Dut>(dut: &mut D, ticks: u64) {
    for _ in 0..ticks {
        dut.tick();
    }
}

/// Tests the power-on channel state.
#[test]
fn test_initial_io() {
    let dut = timed_controller(200, 150);
    assert!(dut.io().in_ready);
    assert!(!dut.io().out_valid);
    assert!(!dut.is_busy());
    assert_eq!(dut.name(), "ChannelController(timed)");
}

/// Tests a write and a read through the timed device.
#[test]
fn test_timed_write_then_read() {
    let mut dut = timed_controller(200, 150);

    let (resp, edges) = transact(&mut dut, Request::new(OpKind::Write, 0x10, 0xCAFE));
    assert_eq!(resp, Response::new(OpKind::Write, 0x10, 0xCAFE));
    // ACTIVATE completes on edge 1 + tRCD, the column write tCL + 1 edges later.
    assert_eq!(edges, 12);
    assert!(!dut.io().out_valid);

    idle(&mut dut, 20);
    let (resp, _) = transact(&mut dut, Request::new(OpKind::Read, 0x10, 0));
    assert_eq!(resp, Response::new(OpKind::Read, 0x10, 0xCAFE));
    assert_eq!(dut.engine().store().read(0x10), 0xCAFE);
    assert_eq!(dut.stats().accepted, 2);
    assert_eq!(dut.stats().responded, 2);
}

/// Tests a write and a read through the simplified device.
#[test]
fn test_simple_write_then_read() {
    let mut dut = ChannelController::new(SimpleEngine::simple(2), &controller_config(8, 150));
    assert_eq!(dut.name(), "ChannelController(simple)");

    let (resp, edges) = transact(&mut dut, Request::new(OpKind::Write, 0x44, 0x1234));
    assert_eq!(resp.data, 0x1234);
    assert_eq!(edges, 3);

    let (resp, _) = transact(&mut dut, Request::new(OpKind::Read, 0x44, 0));
    assert_eq!(resp.data, 0x1234);
    assert_eq!(resp.kind(), Some(OpKind::Read));
    assert_eq!(dut.stats().refreshes, 0);
}

/// Tests in_ready drops once the request queue is full.
#[test]
fn test_backpressure_when_queue_full() {
    let engine = TimedEngine::timed(Timing::default());
    let mut dut = ChannelController::new(engine, &controller_config(1, 150));

    dut.io_mut().in_valid = true;
    dut.io_mut().in_bits = Request::new(OpKind::Write, 0x1, 0x1);
    dut.tick();
    // The first request went straight into a plan.
    assert!(dut.is_busy());
    assert!(dut.io().in_ready);

    dut.io_mut().in_bits = Request::new(OpKind::Write, 0x2, 0x2);
    dut.tick();
    dut.io_mut().in_valid = false;
    assert_eq!(dut.queued_requests(), 1);
    assert!(!dut.io().in_ready);
}

/// Tests requests to different addresses are answered in order.
#[test]
fn test_queued_requests_answered_in_order() {
    let mut dut = timed_controller(200, 150);

    for addr in [0x1, 0x2, 0x3] {
        dut.io_mut().in_valid = true;
        dut.io_mut().in_bits = Request::new(OpKind::Write, addr, addr * 10);
        dut.tick();
    }
    dut.io_mut().in_valid = false;
    dut.io_mut().out_ready = true;

    let mut seen = Vec::new();
    for _ in 0..200 {
        if dut.io().out_valid {
            seen.push(dut.io().out_bits.addr);
        }
        dut.tick();
    }
    assert_eq!(seen, vec![0x1, 0x2, 0x3]);
}

/// Tests responses wait on the channel until the harness is ready.
#[test]
fn test_response_held_until_ready() {
    let mut dut = timed_controller(0, 0);
    dut.io_mut().in_valid = true;
    dut.io_mut().in_bits = Request::new(OpKind::Write, 0x8, 0x9);
    dut.tick();
    dut.io_mut().in_valid = false;

    idle(&mut dut, 100);
    assert!(dut.io().out_valid);
    assert_eq!(dut.io().out_bits.addr, 0x8);
    assert_eq!(dut.queued_responses(), 1);

    dut.io_mut().out_ready = true;
    dut.tick();
    assert!(!dut.io().out_valid);
}

/// Tests scheduled refresh keeps written data alive.
#[test]
fn test_refresh_preserves_data() {
    let mut dut = timed_controller(200, 150);

    transact(&mut dut, Request::new(OpKind::Write, 0x20, 0x5555));
    idle(&mut dut, 1000);
    let (resp, _) = transact(&mut dut, Request::new(OpKind::Read, 0x20, 0));

    assert_eq!(resp.data, 0x5555);
    assert!(dut.stats().refreshes >= 5);
    assert_eq!(dut.engine().protocol().decay_count(), 0);
}

/// Tests that without refresh the device decays to the sentinel.
#[test]
fn test_missing_refresh_decays() {
    let mut dut = timed_controller(200, 0);

    transact(&mut dut, Request::new(OpKind::Write, 0x20, 0x5555));
    idle(&mut dut, 300);
    let (resp, _) = transact(&mut dut, Request::new(OpKind::Read, 0x20, 0));

    assert_eq!(resp.data, CORRUPTION_SENTINEL);
    assert_eq!(dut.stats().refreshes, 0);
    assert!(dut.engine().protocol().decay_count() >= 1);
}

/// Tests a request with neither enable set is dropped.
#[test]
fn test_request_without_enables_dropped() {
    let mut dut = timed_controller(200, 150);
    dut.io_mut().in_valid = true;
    dut.io_mut().in_bits = Request {
        wr_en: false,
        rd_en: false,
        addr: 0x30,
        wdata: 0,
    };
    dut.tick();
    dut.io_mut().in_valid = false;

    idle(&mut dut, 50);
    assert!(!dut.io().out_valid);
    assert_eq!(dut.stats().dropped, 1);
    assert_eq!(dut.stats().accepted, 0);
}

/// Tests reset clears the channels but keeps stored data.
#[test]
fn test_reset_clears_queues() {
    let mut dut = timed_controller(200, 150);
    transact(&mut dut, Request::new(OpKind::Write, 0x40, 0x77));

    dut.io_mut().in_valid = true;
    dut.io_mut().in_bits = Request::new(OpKind::Read, 0x40, 0);
    dut.tick();
    dut.io_mut().in_valid = false;
    assert!(dut.is_busy());

    dut.io_mut().reset = true;
    dut.tick();
    dut.io_mut().reset = false;

    assert!(!dut.is_busy());
    assert_eq!(dut.queued_requests(), 0);
    assert!(!dut.io().out_valid);
    assert!(dut.io().in_ready);
    assert_eq!(dut.engine().store().read(0x40), 0x77);
}

/// Tests a controller boxed as a trait object.
#[test]
fn test_boxed_dut() {
    let mut dut: Box<dyn Dut> = Box::new(timed_controller(200, 150));
    let (resp, _) = transact(&mut dut, Request::new(OpKind::Write, 0x50, 0x1));
    assert_eq!(resp.data, 0x1);
}
