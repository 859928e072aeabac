//! Request/Response Channel Interconnect.
//!
//! The harness and a device under test talk over two decoupled valid/ready
//! channels. A transfer happens on the clock edge of a tick where both the
//! channel's valid and ready lines are asserted.

use crate::common::{Addr, OpKind, Word};
use serde::Serialize;

/// Payload of the request channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Request {
    pub wr_en: bool,
    pub rd_en: bool,
    pub addr: Addr,
    pub wdata: Word,
}

impl Request {
    /// Builds the request payload for a transaction.
    pub fn new(kind: OpKind, addr: Addr, wdata: Word) -> Self {
        let (wr_en, rd_en) = kind.enables();
        Self {
            wr_en,
            rd_en,
            addr,
            wdata,
        }
    }

    /// Kind encoded by the enable lines, if any is asserted.
    pub fn kind(&self) -> Option<OpKind> {
        OpKind::from_enables(self.wr_en, self.rd_en)
    }
}

/// Payload of the response channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    pub addr: Addr,
    pub wr_en: bool,
    pub rd_en: bool,
    pub data: Word,
}

impl Response {
    pub fn new(kind: OpKind, addr: Addr, data: Word) -> Self {
        let (wr_en, rd_en) = kind.enables();
        Self {
            addr,
            wr_en,
            rd_en,
            data,
        }
    }

    pub fn kind(&self) -> Option<OpKind> {
        OpKind::from_enables(self.wr_en, self.rd_en)
    }
}

/// Port bundle of a device under test.
///
/// `in_*` is the request channel (harness drives valid and bits, device
/// drives ready); `out_*` is the response channel (device drives valid and
/// bits, harness drives ready).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Io {
    pub reset: bool,

    pub in_valid: bool,
    pub in_ready: bool,
    pub in_bits: Request,

    pub out_valid: bool,
    pub out_ready: bool,
    pub out_bits: Response,
}

impl Io {
    /// Returns `true` if the request channel transfers on the next edge.
    pub fn request_fires(&self) -> bool {
        self.in_valid && self.in_ready
    }

    /// Returns `true` if the response channel transfers on the next edge.
    pub fn response_fires(&self) -> bool {
        self.out_valid && self.out_ready
    }
}
