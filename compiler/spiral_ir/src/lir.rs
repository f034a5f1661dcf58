//! Control-flow graph documents (LIR).
//!
//! A document is a set of labelled basic blocks. Each block runs its
//! instructions in order, then exactly one terminator picks what runs next.
//! Operands of instructions and terminators are register names.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{AirDef, Arg, IrError};

/// A complete LIR program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LirDocument {
    #[serde(default)]
    pub version: String,
    pub entry: String,
    #[serde(default)]
    pub air_defs: Vec<AirDef>,
    pub blocks: Vec<Block>,
}

impl LirDocument {
    /// Whether any block ends in a fork or join.
    ///
    /// Callers route on this to pick the concurrent evaluator.
    pub fn has_fork(&self) -> bool {
        self.blocks.iter().any(|b| b.terminator.is_concurrent())
    }

    /// Index and validate the block graph.
    pub fn cfg(&self) -> Result<Cfg<'_>, IrError> {
        Cfg::build(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
}

/// Straight-line operation inside a block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Instruction {
    /// `target = value`, where the value may be any expression form.
    Assign { target: String, value: Arg },
    /// Core operator (no `ns`, or `core`) or domain operation.
    Op {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ns: Option<String>,
        name: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Apply the closure held in `callee`.
    Call {
        target: String,
        callee: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Effect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        op: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Terminator {
    Jump {
        to: String,
    },
    Branch {
        cond: String,
        then: String,
        #[serde(rename = "else")]
        otherwise: String,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Start `body` as a new task, continue at `continuation` with the
    /// task's future bound to `future`.
    Fork {
        body: String,
        continuation: String,
        future: String,
    },
    /// Wait for `future`, bind its value to `target`, continue at `to`.
    Join {
        future: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        to: String,
    },
}

impl Terminator {
    /// Labels this terminator can transfer control to.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            Terminator::Jump { to } | Terminator::Join { to, .. } => vec![to.as_str()],
            Terminator::Branch {
                then, otherwise, ..
            } => vec![then.as_str(), otherwise.as_str()],
            Terminator::Return { .. } => Vec::new(),
            Terminator::Fork {
                body, continuation, ..
            } => vec![body.as_str(), continuation.as_str()],
        }
    }

    pub const fn is_concurrent(&self) -> bool {
        matches!(self, Terminator::Fork { .. } | Terminator::Join { .. })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Terminator::Jump { .. } => "jump",
            Terminator::Branch { .. } => "branch",
            Terminator::Return { .. } => "return",
            Terminator::Fork { .. } => "fork",
            Terminator::Join { .. } => "join",
        }
    }
}

/// Validated label index over a [`LirDocument`].
///
/// Every label reachable through a terminator is guaranteed to exist, so
/// evaluators never see a dangling jump target. Blocks nothing jumps to are
/// allowed.
#[derive(Debug)]
pub struct Cfg<'a> {
    entry: &'a Block,
    blocks: FxHashMap<&'a str, &'a Block>,
}

impl<'a> Cfg<'a> {
    fn build(doc: &'a LirDocument) -> Result<Self, IrError> {
        let mut blocks = FxHashMap::default();
        blocks.reserve(doc.blocks.len());
        for block in &doc.blocks {
            if blocks.insert(block.id.as_str(), block).is_some() {
                return Err(IrError::DuplicateBlock(block.id.clone()));
            }
        }

        for block in &doc.blocks {
            for to in block.terminator.successors() {
                if !blocks.contains_key(to) {
                    return Err(IrError::UnknownLabel {
                        from: block.id.clone(),
                        to: to.to_owned(),
                    });
                }
            }
        }

        let entry = blocks
            .get(doc.entry.as_str())
            .copied()
            .ok_or_else(|| IrError::MissingEntry(doc.entry.clone()))?;

        Ok(Cfg { entry, blocks })
    }

    pub fn entry(&self) -> &'a Block {
        self.entry
    }

    pub fn block(&self, label: &str) -> Option<&'a Block> {
        self.blocks.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
