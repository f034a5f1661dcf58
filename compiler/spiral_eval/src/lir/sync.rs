//! Sequential LIR evaluation.

use spiral_ir::LirDocument;
use spiral_value::{invalid_control_flow, EvalError, EvalResult};

use super::{execute_block, step, LirContext, Step};

fn concurrent_terminator(doc: &LirDocument) -> Option<EvalError> {
    doc.blocks
        .iter()
        .find(|b| b.terminator.is_concurrent())
        .map(|b| {
            invalid_control_flow(&format!(
                "`{}` in block `{}` requires the concurrent evaluator",
                b.terminator.name(),
                b.id
            ))
        })
}

/// Run `doc` to its first `return`. Documents with `fork` or `join`
/// terminators are rejected before any block runs.
pub(crate) fn run(doc: &LirDocument, cx: LirContext<'_>) -> EvalResult {
    if let Some(err) = concurrent_terminator(doc) {
        return Err(err);
    }
    let cfg = doc.cfg()?;
    let regs = cx.registers();
    let mut interp = cx.interpreter();

    let mut current = cfg.entry();
    loop {
        execute_block(&mut interp, &regs, current)?;
        match step(&cfg, &regs, &current.terminator)? {
            Step::Goto(next) => current = next,
            Step::Return(value) => return Ok(value),
            Step::Concurrent => {
                return Err(invalid_control_flow(&format!(
                    "unexpected `{}` in block `{}`",
                    current.terminator.name(),
                    current.id
                )))
            }
        }
    }
}
