//! telemetry/counters.rs
//! Byte and call counts collected by an encoder session.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::compression::Operation;

/// Deterministic counters collected during one session.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub pushes: u64,
    pub pulls: u64,
    pub flushes: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl SessionCounters {
    /// Record one push and how much input the engine consumed.
    pub fn add_push(&mut self, op: Operation, consumed: usize) {
        self.pushes += 1;
        if op == Operation::Flush {
            self.flushes += 1;
        }
        self.bytes_in += consumed as u64;
    }

    /// Record one pulled output region.
    pub fn add_pull(&mut self, len: usize) {
        self.pulls += 1;
        self.bytes_out += len as u64;
    }

    /// `bytes_out / bytes_in`; 0.0 before any input.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        self.bytes_out as f64 / self.bytes_in as f64
    }

    pub fn merge(&mut self, other: &SessionCounters) {
        self.pushes += other.pushes;
        self.pulls += other.pulls;
        self.flushes += other.flushes;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl AddAssign for SessionCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
