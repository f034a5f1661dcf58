//! Concurrent LIR evaluation.
//!
//! Every `fork` starts a scoped thread running the body block against a
//! snapshot of the forking task's registers; the two tasks never share a
//! register frame afterwards. The only state they share is the future's
//! cell, which settles exactly once and wakes every joiner.
//!
//! The whole evaluation runs inside one `std::thread::scope`, so the call
//! returns only after every forked task has finished, including tasks
//! whose futures were never joined.
//!
//! At most `EvalConfig::max_tasks` forked tasks run at once. A `fork` past
//! that limit, or one the OS refuses a thread for, fails the forking task
//! with `TaskSpawnFailed` instead of bringing the host down.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

use spiral_ir::{Block, Cfg, LirDocument, Terminator};
use spiral_value::{
    invalid_control_flow, task_spawn_failed, type_mismatch, Environment, EvalError, EvalResult, FutureCell,
    FutureValue, Heap, Value,
};

use super::{block, execute_block, read, step, write, LirContext, Step};
use crate::interpreter::raise_if_error;

/// State shared read-only by every task of one run.
struct Shared<'d> {
    cx: LirContext<'d>,
    cfg: Cfg<'d>,
    /// Task id 0 is the entry task.
    next_task: AtomicU64,
    /// Forked tasks currently running.
    live: AtomicUsize,
}

/// Record a finished task's outcome on its future.
///
/// A task that returns an `error` value rejects its future just like a
/// task that fails.
fn settle(cell: &FutureCell, outcome: EvalResult) {
    match outcome {
        Ok(Value::Error(error)) => cell.reject((*error).clone()),
        Ok(value) => cell.resolve(value),
        Err(err) => cell.reject(err.to_error_value()),
    };
}

impl<'d> Shared<'d> {
    /// Reserve a slot for one more forked task.
    fn acquire_slot(&self) -> Result<(), EvalError> {
        let max = self.cx.config.max_tasks();
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                if live < max {
                    live.checked_add(1)
                } else {
                    None
                }
            })
            .map(drop)
            .map_err(|_| task_spawn_failed(&format!("{max} forked tasks already running")))
    }

    fn release_slot(&self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }

    fn run_task<'scope, 'env>(
        &'env self,
        scope: &'scope thread::Scope<'scope, 'env>,
        task: u64,
        entry: &'d Block,
        regs: Environment,
    ) -> EvalResult {
        let mut interp = self.cx.interpreter();
        let mut current = entry;
        loop {
            execute_block(&mut interp, &regs, current)?;
            match &current.terminator {
                Terminator::Fork {
                    body,
                    continuation,
                    future,
                } => {
                    let body_block = block(&self.cfg, body)?;
                    let next = block(&self.cfg, continuation)?;
                    let child = self.next_task.fetch_add(1, Ordering::Relaxed);
                    let handle = FutureValue::pending(child);
                    let cell: Heap<FutureCell> = handle.cell.clone();
                    let snapshot = regs.snapshot();

                    self.acquire_slot()?;
                    tracing::debug!(task, child, body = %body, "fork");
                    let spawned = thread::Builder::new()
                        .name(format!("spiral-task-{child}"))
                        .spawn_scoped(scope, move || {
                            let outcome = self.run_task(scope, child, body_block, snapshot);
                            tracing::debug!(task = child, ok = outcome.is_ok(), "task finished");
                            // Free the slot first so a woken joiner can fork again.
                            self.release_slot();
                            settle(&cell, outcome);
                        });
                    if let Err(err) = spawned {
                        self.release_slot();
                        tracing::debug!(task, child, error = %err, "fork failed");
                        return Err(task_spawn_failed(&err.to_string()));
                    }

                    write(&regs, future, Value::future(handle));
                    current = next;
                }
                Terminator::Join { future, target, to } => {
                    let next = block(&self.cfg, to)?;
                    let handle = match read(&regs, future)? {
                        Value::Future(handle) => handle,
                        other => {
                            raise_if_error(&other)?;
                            return Err(type_mismatch("future", other.type_name()));
                        }
                    };

                    tracing::debug!(task, awaiting = handle.task, "join");
                    let value = handle.cell.wait().map_err(EvalError::from)?;
                    if let Some(target) = target {
                        write(&regs, target, value);
                    }
                    current = next;
                }
                terminator => match step(&self.cfg, &regs, terminator)? {
                    Step::Goto(next) => current = next,
                    Step::Return(value) => return Ok(value),
                    Step::Concurrent => {
                        return Err(invalid_control_flow(&format!(
                            "unhandled `{}` in block `{}`",
                            terminator.name(),
                            current.id
                        )))
                    }
                },
            }
        }
    }
}

/// Run `doc` from its entry block, with fork/join support.
pub(crate) fn run(doc: &LirDocument, cx: LirContext<'_>) -> EvalResult {
    let shared = Shared {
        cx,
        cfg: doc.cfg()?,
        next_task: AtomicU64::new(1),
        live: AtomicUsize::new(0),
    };
    let regs = cx.registers();
    let entry = shared.cfg.entry();
    thread::scope(|scope| shared.run_task(scope, 0, entry, regs))
}
