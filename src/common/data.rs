//! Operation Kinds.
//!
//! This module defines the classification of transactions used throughout
//! the harness. The same kind is carried by trace entries, pending requests
//! and the `wr_en`/`rd_en` pair of the channel payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of memory transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    /// Data read access.
    ///
    /// Returns the value stored at the address. Validated against the
    /// golden record when the address has been written before.
    Read,

    /// Data write access.
    ///
    /// Stores a value at the address. The device echoes the written value
    /// back in its response.
    Write,
}

impl OpKind {
    /// Returns `true` for writes.
    pub fn is_write(self) -> bool {
        self == OpKind::Write
    }

    /// Builds the kind from a channel's `wr_en`/`rd_en` pair.
    ///
    /// Write-enable wins if both lines are asserted; `None` is returned
    /// when neither is.
    pub fn from_enables(wr_en: bool, rd_en: bool) -> Option<Self> {
        match (wr_en, rd_en) {
            (true, _) => Some(OpKind::Write),
            (false, true) => Some(OpKind::Read),
            (false, false) => None,
        }
    }

    /// Returns the `(wr_en, rd_en)` pair driven for this kind.
    pub fn enables(self) -> (bool, bool) {
        match self {
            OpKind::Read => (false, true),
            OpKind::Write => (true, false),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Read => write!(f, "READ"),
            OpKind::Write => write!(f, "WRITE"),
        }
    }
}

impl FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(OpKind::Read),
            "WRITE" => Ok(OpKind::Write),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}
