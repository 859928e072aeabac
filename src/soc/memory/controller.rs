//! Channel Memory Controller.
//!
//! This module defines the `ChannelController`, the device under test that
//! fronts a `DramEngine` with the valid/ready request and response channels.
//! Requests are queued, expanded by the engine's protocol into phase plans,
//! and the data access of each plan produces one response. The controller
//! also schedules refresh commands so the timed device does not decay.

use super::engine::DramEngine;
use super::protocol::{Phase, PhaseRole, Protocol};
use crate::common::{Addr, OpKind};
use crate::config::ControllerConfig;
use crate::soc::interconnect::{Io, Request, Response};
use crate::soc::traits::Dut;
use log::{debug, warn};
use std::collections::VecDeque;

/// Counters kept by the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Requests taken from the request channel.
    pub accepted: u64,
    /// Responses produced by completed accesses.
    pub responded: u64,
    /// Refresh commands completed.
    pub refreshes: u64,
    /// Plans restarted because the row was lost before the access.
    pub reopened: u64,
    /// Requests dropped because neither enable line was set.
    pub dropped: u64,
}

/// Phases being executed and the transaction they belong to.
struct Plan<I> {
    phases: Vec<Phase<I>>,
    index: usize,
    /// `None` for maintenance plans such as refresh.
    request: Option<(OpKind, Addr)>,
}

/// Valid/ready front end driving a DRAM engine.
pub struct ChannelController<P: Protocol> {
    name: String,
    engine: DramEngine<P>,
    io: Io,
    requests: VecDeque<Request>,
    responses: VecDeque<Response>,
    request_depth: usize,
    response_depth: usize,
    /// Ticks between refreshes; zero disables refresh scheduling.
    refresh_interval: u64,
    since_refresh: u64,
    plan: Option<Plan<P::Input>>,
    stats: ControllerStats,
}

impl<P: Protocol> ChannelController<P> {
    /// Creates a controller with empty queues.
    ///
    /// # Arguments
    ///
    /// * `engine` - The DRAM engine to drive.
    /// * `config` - Queue depths and refresh interval.
    pub fn new(engine: DramEngine<P>, config: &ControllerConfig) -> Self {
        let name = format!("ChannelController({})", engine.protocol().name());
        let mut controller = Self {
            name,
            engine,
            io: Io::default(),
            requests: VecDeque::with_capacity(config.request_queue_depth),
            responses: VecDeque::with_capacity(config.response_queue_depth),
            request_depth: config.request_queue_depth,
            response_depth: config.response_queue_depth,
            refresh_interval: config.refresh_interval,
            since_refresh: 0,
            plan: None,
            stats: ControllerStats::default(),
        };
        controller.update_outputs();
        controller
    }

    pub fn engine(&self) -> &DramEngine<P> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DramEngine<P> {
        &mut self.engine
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// Requests accepted but not yet started.
    pub fn queued_requests(&self) -> usize {
        self.requests.len()
    }

    /// Responses waiting on the response channel.
    pub fn queued_responses(&self) -> usize {
        self.responses.len()
    }

    /// Returns `true` while a plan is executing.
    pub fn is_busy(&self) -> bool {
        self.plan.is_some()
    }

    fn accept(&mut self, request: Request) {
        if request.kind().is_none() {
            warn!(
                "[{}] dropping request to {:#x} with neither wr_en nor rd_en",
                self.name, request.addr
            );
            self.stats.dropped += 1;
            return;
        }
        self.stats.accepted += 1;
        self.requests.push_back(request);
    }

    /// Chooses the next plan: a due refresh first, then the oldest request.
    fn next_plan(&mut self) -> Option<Plan<P::Input>> {
        if self.refresh_interval > 0 && self.since_refresh >= self.refresh_interval {
            if let Some(phase) = self.engine.protocol().refresh_phase() {
                return Some(Plan {
                    phases: vec![phase],
                    index: 0,
                    request: None,
                });
            }
        }

        if self.responses.len() >= self.response_depth {
            return None;
        }

        let request = self.requests.pop_front()?;
        let kind = request.kind()?;
        Some(Plan {
            phases: self.engine.protocol().plan(kind, request.addr, request.wdata),
            index: 0,
            request: Some((kind, request.addr)),
        })
    }

    fn step_engine(&mut self) {
        let Some(plan) = self.plan.as_mut() else {
            self.engine.tick(&P::Input::default());
            return;
        };

        if plan.phases[plan.index].role == PhaseRole::Access
            && !self.engine.protocol().accepts_access()
        {
            debug!("[{}] row lost before column access, reopening", self.name);
            plan.index = 0;
            self.stats.reopened += 1;
        }

        let role = plan.phases[plan.index].role;
        let out = self.engine.tick(&plan.phases[plan.index].input);
        if !out.complete {
            return;
        }

        match role {
            PhaseRole::Access => {
                if let Some((kind, addr)) = plan.request {
                    self.responses.push_back(Response::new(kind, addr, out.result));
                    self.stats.responded += 1;
                }
            }
            PhaseRole::Refresh => {
                self.since_refresh = 0;
                self.stats.refreshes += 1;
            }
            PhaseRole::Setup => {}
        }

        plan.index += 1;
        if plan.index == plan.phases.len() {
            self.plan = None;
        }
    }

    fn update_outputs(&mut self) {
        self.io.in_ready = self.requests.len() < self.request_depth;
        self.io.out_valid = !self.responses.is_empty();
        self.io.out_bits = self.responses.front().copied().unwrap_or_default();
    }
}

impl<P: Protocol> Dut for ChannelController<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn io(&self) -> &Io {
        &self.io
    }

    fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    /// One clock edge: reset, channel transfers, then one engine step.
    fn tick(&mut self) {
        if self.io.reset {
            self.requests.clear();
            self.responses.clear();
            self.plan = None;
            self.since_refresh = 0;
            self.engine.reset();
            self.update_outputs();
            return;
        }

        if self.io.request_fires() {
            self.accept(self.io.in_bits);
        }
        if self.io.response_fires() {
            self.responses.pop_front();
        }

        self.since_refresh += 1;
        if self.plan.is_none() {
            self.plan = self.next_plan();
        }
        self.step_engine();
        self.update_outputs();
    }
}
