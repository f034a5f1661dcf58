//! Control-flow graph evaluators.
//!
//! Both evaluators run blocks the same way: instructions in order over one
//! mutable register frame, then the terminator picks the next block.
//! They differ only in `fork`/`join`:
//!
//! - [`sync`]: rejects them before running anything
//! - [`concurrent`]: runs each fork as a scoped thread with a copy of the
//!   registers, and blocks a task at `join` until the future settles

pub(crate) mod concurrent;
pub(crate) mod sync;

use spiral_ir::{Block, Cfg, CoreOp, Instruction, Layer, Terminator};
use spiral_value::{
    invalid_control_flow, type_mismatch, unbound_name, unknown_effect, unknown_operator,
    Environment, EvalError, EvalResult, Mutability, Value,
};

use crate::config::EvalConfig;
use crate::defs::{Defs, Inputs};
use crate::domains::DomainRegistry;
use crate::effects::EffectRegistry;
use crate::interpreter::{raise_first_error, raise_if_error, Interpreter, InterpreterBuilder};
use crate::operators::evaluate_core;

/// Everything a LIR task borrows from the caller.
#[derive(Clone, Copy)]
pub(crate) struct LirContext<'d> {
    pub domains: &'d DomainRegistry,
    pub effects: Option<&'d EffectRegistry>,
    pub defs: &'d Defs,
    pub inputs: &'d Inputs,
    pub config: &'d EvalConfig,
}

impl<'d> LirContext<'d> {
    /// A fresh interpreter for one task.
    pub(crate) fn interpreter(&self) -> Interpreter<'d> {
        let builder = InterpreterBuilder::new(self.domains, self.config)
            .defs(self.defs)
            .inputs(self.inputs)
            .layer(Layer::Lir);
        match self.effects {
            Some(effects) => builder.effects(effects).build(),
            None => builder.build(),
        }
    }

    /// The entry task's register frame, seeded with the inputs.
    pub(crate) fn registers(&self) -> Environment {
        let regs = Environment::new();
        for (name, value) in self.inputs {
            regs.define(name.as_str(), value.clone(), Mutability::Mutable);
        }
        regs
    }
}

/// Where control goes after a block.
pub(crate) enum Step<'d> {
    Goto(&'d Block),
    Return(Value),
    /// `fork` or `join`; handled by the caller.
    Concurrent,
}

pub(crate) fn block<'d>(cfg: &Cfg<'d>, label: &str) -> Result<&'d Block, EvalError> {
    cfg.block(label)
        .ok_or_else(|| invalid_control_flow(&format!("unknown label `{label}`")))
}

pub(crate) fn read(regs: &Environment, name: &str) -> EvalResult {
    regs.lookup(name).ok_or_else(|| unbound_name(name))
}

fn read_all(regs: &Environment, names: &[String]) -> Result<Vec<Value>, EvalError> {
    names.iter().map(|name| read(regs, name)).collect()
}

pub(crate) fn write(regs: &Environment, name: &str, value: Value) {
    regs.define(name, value, Mutability::Mutable);
}

/// Run a block's instructions.
pub(crate) fn execute_block(
    interp: &mut Interpreter<'_>,
    regs: &Environment,
    block: &Block,
) -> Result<(), EvalError> {
    tracing::trace!(block = %block.id, "enter block");
    for instruction in &block.instructions {
        execute_instruction(interp, regs, instruction)?;
    }
    Ok(())
}

fn execute_instruction(
    interp: &mut Interpreter<'_>,
    regs: &Environment,
    instruction: &Instruction,
) -> Result<(), EvalError> {
    match instruction {
        Instruction::Assign { target, value } => {
            let value = interp.eval_arg(value, regs)?;
            write(regs, target, value);
        }
        Instruction::Op {
            target,
            ns,
            name,
            args,
        } => {
            let values = read_all(regs, args)?;
            let value = match ns.as_deref() {
                Some(ns) if !CoreOp::is_core_namespace(Some(ns)) => {
                    let domain = interp.domains().get(ns)?;
                    raise_first_error(&values)?;
                    domain.call(name, &values)?
                }
                _ => {
                    let op = CoreOp::from_name(name)
                        .ok_or_else(|| unknown_operator(CoreOp::NAMESPACE, name))?;
                    evaluate_core(op, &values)?
                }
            };
            write(regs, target, value);
        }
        Instruction::Call {
            target,
            callee,
            args,
        } => {
            let callee = read(regs, callee)?;
            let values = read_all(regs, args)?;
            let value = interp.apply(&callee, values)?;
            write(regs, target, value);
        }
        Instruction::Effect { target, op, args } => {
            let effects = interp.effects().ok_or_else(|| unknown_effect(op))?;
            let handler = effects.get(op)?;
            let values = read_all(regs, args)?;
            raise_first_error(&values)?;
            tracing::debug!(effect = %op, args = values.len(), "invoke effect");
            let value = handler(&values)?;
            if let Some(target) = target {
                write(regs, target, value);
            }
        }
    }
    Ok(())
}

/// Follow a sequential terminator.
pub(crate) fn step<'d>(
    cfg: &Cfg<'d>,
    regs: &Environment,
    terminator: &Terminator,
) -> Result<Step<'d>, EvalError> {
    match terminator {
        Terminator::Jump { to } => Ok(Step::Goto(block(cfg, to)?)),
        Terminator::Branch {
            cond,
            then,
            otherwise,
        } => {
            let cond = read(regs, cond)?;
            raise_if_error(&cond)?;
            match cond {
                Value::Bool(true) => Ok(Step::Goto(block(cfg, then)?)),
                Value::Bool(false) => Ok(Step::Goto(block(cfg, otherwise)?)),
                other => Err(type_mismatch("bool", other.type_name())),
            }
        }
        Terminator::Return { value } => match value {
            Some(reg) => Ok(Step::Return(read(regs, reg)?)),
            None => Ok(Step::Return(Value::Void)),
        },
        Terminator::Fork { .. } | Terminator::Join { .. } => Ok(Step::Concurrent),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
