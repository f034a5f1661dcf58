//! Futures produced by LIR `fork`.
//!
//! A [`FutureCell`] is the only state shared between concurrent tasks. It
//! moves from pending to resolved or rejected exactly once; every joiner
//! observes the same outcome.

use std::fmt;

use parking_lot::{Condvar, Mutex};

use super::{ErrorValue, Value};
use crate::Heap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FutureStatus {
    Pending,
    Resolved,
    Rejected,
}

impl FutureStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            FutureStatus::Pending => "pending",
            FutureStatus::Resolved => "resolved",
            FutureStatus::Rejected => "rejected",
        }
    }
}

enum FutureState {
    Pending,
    Resolved(Value),
    Rejected(ErrorValue),
}

/// Single-transition result cell with blocking wait.
pub struct FutureCell {
    state: Mutex<FutureState>,
    settled: Condvar,
}

impl FutureCell {
    pub fn new() -> Self {
        FutureCell {
            state: Mutex::new(FutureState::Pending),
            settled: Condvar::new(),
        }
    }

    /// Settle with a value. Returns `false` if already settled.
    pub fn resolve(&self, value: Value) -> bool {
        self.settle(FutureState::Resolved(value))
    }

    /// Settle with an error. Returns `false` if already settled.
    pub fn reject(&self, error: ErrorValue) -> bool {
        self.settle(FutureState::Rejected(error))
    }

    fn settle(&self, outcome: FutureState) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, FutureState::Pending) {
            return false;
        }
        *state = outcome;
        self.settled.notify_all();
        true
    }

    pub fn status(&self) -> FutureStatus {
        match *self.state.lock() {
            FutureState::Pending => FutureStatus::Pending,
            FutureState::Resolved(_) => FutureStatus::Resolved,
            FutureState::Rejected(_) => FutureStatus::Rejected,
        }
    }

    /// The outcome, if settled.
    pub fn try_get(&self) -> Option<Result<Value, ErrorValue>> {
        match &*self.state.lock() {
            FutureState::Pending => None,
            FutureState::Resolved(v) => Some(Ok(v.clone())),
            FutureState::Rejected(e) => Some(Err(e.clone())),
        }
    }

    /// Block until settled, then return the outcome.
    ///
    /// Settled cells return immediately with the cached outcome.
    pub fn wait(&self) -> Result<Value, ErrorValue> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                FutureState::Pending => self.settled.wait(&mut state),
                FutureState::Resolved(v) => return Ok(v.clone()),
                FutureState::Rejected(e) => return Err(e.clone()),
            }
        }
    }
}

impl Default for FutureCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FutureCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureCell")
            .field("status", &self.status())
            .finish()
    }
}

/// Handle to a forked task's eventual result.
#[derive(Clone, Debug)]
pub struct FutureValue {
    /// Task id. Unique per evaluation, never serialized.
    pub task: u64,
    pub cell: Heap<FutureCell>,
}

impl FutureValue {
    /// A fresh pending future for `task`.
    pub fn pending(task: u64) -> Self {
        FutureValue {
            task,
            cell: Heap::new(FutureCell::new()),
        }
    }

    pub fn status(&self) -> FutureStatus {
        self.cell.status()
    }
}
